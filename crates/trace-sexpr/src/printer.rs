//! Printing statements back to text.
//!
//! Layout rule: a nested statement with more than one argument starts on a
//! new line, anything smaller stays inline. The root statement never gets a
//! leading newline. The output reparses to the same tree, except that `"`
//! inside quoted text is written as `'`.

use crate::{Arg, Atom, Statement};

/// Print a statement tree.
pub fn print(stmt: &Statement) -> String {
    let mut out = String::new();
    write_statement(stmt, &mut out, false);
    out
}

fn write_statement(stmt: &Statement, out: &mut String, nested: bool) {
    if nested && stmt.args.len() > 1 {
        out.push('\n');
    }
    out.push('(');
    out.push_str(&stmt.keyword);
    for arg in &stmt.args {
        out.push(' ');
        match arg {
            Arg::Atom(atom) => write_atom(atom, out),
            Arg::Statement(child) => write_statement(child, out, true),
        }
    }
    out.push(')');
}

fn write_atom(atom: &Atom, out: &mut String) {
    match atom {
        Atom::Symbol(s) if !needs_quotes(s) => out.push_str(s),
        Atom::Symbol(s) | Atom::String(s) => out.push_str(&quote_string(s)),
        Atom::Number { raw, .. } => out.push_str(raw),
    }
}

pub(crate) fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"'))
}

/// Quote text for output. Embedded double quotes become single quotes.
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push('\''),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

pub(crate) fn trim_float(mut s: String) -> String {
    if !s.contains('.') {
        return s;
    }

    while let Some(stripped) = s.strip_suffix('0') {
        s = stripped.to_string();
    }
    if let Some(stripped) = s.strip_suffix('.') {
        s = stripped.to_string();
    }

    if s.is_empty() { "0".to_string() } else { s }
}
