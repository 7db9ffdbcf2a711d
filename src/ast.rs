use std::collections::BTreeMap;

use crate::error::{Error, ErrorKind, Result};

/// One operation call as written in a script, before its arguments are
/// coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based position in the script.
    pub step: usize,
    pub name: String,
    /// Raw argument values keyed by argument name. A repeated key keeps its
    /// last value.
    pub args: BTreeMap<String, String>,
}

/// A statement whose argument values are all integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCall {
    pub step: usize,
    pub name: String,
    pub args: BTreeMap<String, i64>,
}

impl Statement {
    /// Coerce every raw argument value to a base-10 integer.
    ///
    /// Fails on the first value that does not parse.
    pub fn coerce(self) -> Result<ParsedCall> {
        let step = self.step;
        let args = self
            .args
            .into_iter()
            .map(|(key, raw)| match raw.trim().parse::<i64>() {
                Ok(value) => Ok((key, value)),
                Err(_) => Err(Error::at_step(ErrorKind::NonIntegerArgument, step)),
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(ParsedCall {
            step,
            name: self.name,
            args,
        })
    }
}
