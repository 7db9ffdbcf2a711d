use std::collections::BTreeMap;

use winnow::ModalResult;
use winnow::prelude::*;
use winnow::token::{rest, take_till};

use crate::ast::Statement;
use crate::error::{Error, ErrorKind, MAX_STATEMENTS, Result};

/// Terminates every statement.
pub const SEPARATOR: char = ';';

/// Stray characters tolerated at either end of a script.
const BOUNDARY: [char; 10] = ['\r', '\n', '\u{200b}', '.', '{', '}', '[', ']', '(', ')'];

/// Split a script into its raw statements, in order.
///
/// Empty fragments are dropped, so trailing or doubled separators are
/// harmless. The statement limit is enforced here, before anything is parsed.
pub fn split_script(script: &str) -> Result<Vec<&str>> {
    let stripped = script.trim_matches(BOUNDARY);
    if stripped.trim().is_empty() {
        return Err(Error::new(ErrorKind::NoCode));
    }
    if !stripped.contains(SEPARATOR) {
        return Err(Error::new(ErrorKind::MissingSeparator));
    }

    let statements: Vec<&str> = stripped
        .split(SEPARATOR)
        .filter(|s| !s.trim().is_empty())
        .collect();

    if statements.is_empty() {
        return Err(Error::new(ErrorKind::NoCode));
    }
    if statements.len() > MAX_STATEMENTS {
        return Err(Error::new(ErrorKind::TooManyStatements(statements.len())));
    }
    Ok(statements)
}

/// Parse one raw statement into an operation name and its raw arguments.
pub fn parse_call(raw: &str, step: usize) -> Result<Statement> {
    if !raw.contains(['(', ')']) {
        return Err(Error::at_step(ErrorKind::MissingBrackets, step));
    }

    let trimmed = raw.trim().trim_matches([')', ' ']);
    let (name, body) = call
        .parse(trimmed)
        .map_err(|_| Error::at_step(ErrorKind::BadSyntax, step))?;

    let mut args = BTreeMap::new();
    for segment in body.split(',') {
        if segment.trim().is_empty() {
            continue;
        }
        let (key, value) = key_value
            .parse(segment)
            .map_err(|_| Error::at_step(ErrorKind::MissingKeyValueSeparator, step))?;
        args.insert(key.to_string(), value.to_string());
    }

    Ok(Statement {
        step,
        name: name.trim().to_string(),
        args,
    })
}

/// Parser for `name(body`, the trailing `)` already stripped. The body is
/// everything after the first `(` and must not contain another one.
fn call<'s>(input: &mut &'s str) -> ModalResult<(&'s str, &'s str)> {
    let name = take_till(0.., '(').parse_next(input)?;
    '('.parse_next(input)?;
    let body = take_till(0.., '(').parse_next(input)?;
    Ok((name, body))
}

/// Parser for a single `key: value` argument; splits on the first `:` only.
fn key_value<'s>(input: &mut &'s str) -> ModalResult<(&'s str, &'s str)> {
    let key = take_till(0.., ':').parse_next(input)?;
    ':'.parse_next(input)?;
    let value = rest.parse_next(input)?;
    Ok((key.trim(), value.trim()))
}
