//! Macros for ergonomic machine construction.

/// Build a [`Variables`](crate::core::Variables) store from name/value pairs.
///
/// # Example
///
/// ```
/// use tandem::variables;
///
/// let vars = variables! {
///     "counter" => 0,
///     "greetings" => "hello",
/// };
///
/// assert_eq!(vars.int_value_for("counter").unwrap(), 0);
/// assert_eq!(vars.string_value_for("greetings").unwrap(), "hello");
/// ```
#[macro_export]
macro_rules! variables {
    () => {
        $crate::core::Variables::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::core::Variables::new()
            $(.with($name, $value))+
    };
}

/// Build a list of unguarded transitions from `(origin, symbol, destination)`
/// triples, in order.
///
/// # Example
///
/// ```
/// use tandem::{transitions, Machine};
///
/// let machine = Machine::new("1", transitions! {
///     ("1", "a", "2"),
///     ("2", "d", "3"),
///     ("3", "c", "1"),
/// });
/// assert_eq!(machine.transitions().len(), 3);
/// ```
#[macro_export]
macro_rules! transitions {
    ($(($origin:expr, $symbol:expr, $destination:expr)),* $(,)?) => {
        vec![$($crate::runtime::Transition::new($origin, $symbol, $destination)),*]
    };
}
