//! Line-level parsing of TGF documents.

use crate::core::{Comparator, Condition, Symbol};
use crate::tgf::error::TgfError;
use crate::tgf::{StateDef, TransitionDef};

/// Line separating state declarations from transitions.
pub(crate) const SEPARATOR: &str = "#";

pub(crate) enum Line {
    State(StateDef),
    Transition(TransitionDef),
}

/// `id name [ timer op integer ]`. The name may contain spaces and defaults
/// to the id when absent.
pub(crate) fn state_line(line: usize, text: &str) -> Result<StateDef, TgfError> {
    let malformed = || TgfError::MalformedState { line };
    let (rest, condition) = take_delimited(text, '[', ']').ok_or_else(malformed)?;
    let (id, name) = split_word(&rest).ok_or_else(malformed)?;
    let name = if name.is_empty() { id } else { name };
    let condition = condition
        .map(|text| timer_condition(line, &text))
        .transpose()?;

    Ok(StateDef {
        id: id.to_string(),
        name: name.to_string(),
        condition,
        line,
    })
}

/// `origin destination sym1, sym2 [ guard ] { resets }`.
pub(crate) fn transition_line(line: usize, text: &str) -> Result<TransitionDef, TgfError> {
    let malformed = || TgfError::MalformedTransition { line };
    let (rest, action) = take_delimited(text, '{', '}').ok_or_else(malformed)?;
    let (rest, guard) = take_delimited(&rest, '[', ']').ok_or_else(malformed)?;
    let (origin, rest) = split_word(&rest).ok_or_else(malformed)?;
    let (destination, symbols) = split_word(rest).ok_or_else(malformed)?;

    let symbols: Vec<Symbol> = symbols
        .split(',')
        .map(str::trim)
        .filter(|symbol| !symbol.is_empty())
        .map(Symbol::from)
        .collect();
    if symbols.is_empty() {
        return Err(malformed());
    }

    let guard = guard.map(|text| timer_condition(line, &text)).transpose()?;
    let resets = match action {
        Some(text) => timer_resets(line, &text)?,
        None => Vec::new(),
    };

    Ok(TransitionDef {
        origin: origin.to_string(),
        destination: destination.to_string(),
        symbols,
        guard,
        resets,
        line,
    })
}

fn timer_condition(line: usize, text: &str) -> Result<Condition, TgfError> {
    let invalid = || TgfError::InvalidCondition {
        line,
        text: text.to_string(),
    };
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [name, op, threshold] = tokens.as_slice() else {
        return Err(invalid());
    };
    let comparator = comparator(op).ok_or_else(invalid)?;
    let threshold: i64 = threshold.parse().map_err(|_| invalid())?;
    Ok(Condition::timer(*name, comparator, threshold))
}

/// `t = 0`, several separated by `;`.
fn timer_resets(line: usize, text: &str) -> Result<Vec<String>, TgfError> {
    text.split(';')
        .map(str::trim)
        .filter(|assignment| !assignment.is_empty())
        .map(|assignment| {
            let tokens: Vec<&str> = assignment.split_whitespace().collect();
            match tokens.as_slice() {
                [name, "=", "0"] => Ok(name.to_string()),
                _ => Err(TgfError::InvalidAction {
                    line,
                    text: assignment.to_string(),
                }),
            }
        })
        .collect()
}

fn comparator(op: &str) -> Option<Comparator> {
    match op {
        "<" => Some(Comparator::Lt),
        "<=" => Some(Comparator::Le),
        "=" | "==" => Some(Comparator::Eq),
        "!=" => Some(Comparator::Ne),
        ">=" => Some(Comparator::Ge),
        ">" => Some(Comparator::Gt),
        _ => None,
    }
}

/// Split `text` into what lies outside an `open ... close` group and the
/// trimmed group contents. `None` when the group is unbalanced.
fn take_delimited(text: &str, open: char, close: char) -> Option<(String, Option<String>)> {
    let Some(start) = text.find(open) else {
        if text.contains(close) {
            return None;
        }
        return Some((text.trim().to_string(), None));
    };
    let end = start + text[start..].find(close)?;
    let inner = text[start + open.len_utf8()..end].trim().to_string();
    let outside = format!("{} {}", &text[..start], &text[end + close.len_utf8()..]);
    Some((outside.trim().to_string(), Some(inner)))
}

fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    })
}
