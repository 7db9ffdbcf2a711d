//! Error types for the ImageScript interpreter.

use std::fmt;

/// Maximum number of statements a single script may contain.
pub const MAX_STATEMENTS: usize = 15;

/// The kind of failure that stopped a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The script was empty or contained only separators.
    NoCode,
    /// The script has no `;` anywhere.
    MissingSeparator,
    /// More statements than allowed; carries the attempted count.
    TooManyStatements(usize),
    /// A statement has neither `(` nor `)`.
    MissingBrackets,
    /// A statement has an extra, missing or misplaced `(`.
    BadSyntax,
    /// An argument segment has no `:`.
    MissingKeyValueSeparator,
    /// An argument value is not a base-10 integer.
    NonIntegerArgument,
    /// No operation with this name is registered.
    UnknownOperation(String),
    /// The operation rejected its arguments or its input.
    InvalidArguments(String),
}

impl ErrorKind {
    /// Identifying name shown to users.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::NoCode => "NoCode",
            ErrorKind::MissingSeparator => "MissingSeparator",
            ErrorKind::TooManyStatements(_) => "TooManyStatements",
            ErrorKind::MissingBrackets => "MissingBrackets",
            ErrorKind::BadSyntax => "BadSyntax",
            ErrorKind::MissingKeyValueSeparator => "MissingKeyValueSeparator",
            ErrorKind::NonIntegerArgument => "NonIntegerArgument",
            ErrorKind::UnknownOperation(_) => "UnknownOperation",
            ErrorKind::InvalidArguments(_) => "InvalidArguments",
        }
    }

    /// Short, user-facing description of what went wrong.
    pub fn message(&self) -> String {
        match self {
            ErrorKind::NoCode => "No code to run!".to_string(),
            ErrorKind::MissingSeparator => "Missing semicolon!".to_string(),
            ErrorKind::TooManyStatements(count) => format!(
                "Only {} operations are allowed at once. You tried to do {}",
                MAX_STATEMENTS, count
            ),
            ErrorKind::MissingBrackets => "No brackets present!".to_string(),
            ErrorKind::BadSyntax => "Too many brackets for one operation!".to_string(),
            ErrorKind::MissingKeyValueSeparator => {
                "No colon to denote argument value!".to_string()
            }
            ErrorKind::NonIntegerArgument => {
                "Argument must be a number, not a word or letter!".to_string()
            }
            ErrorKind::UnknownOperation(name) => format!("Operation {} does not exist!", name),
            ErrorKind::InvalidArguments(message) => message.clone(),
        }
    }

    /// Longer explanation of how to fix this kind of error.
    pub fn hint(&self) -> &'static str {
        match self {
            ErrorKind::NoCode => "Give at least one operation, for example `blur();`.",
            ErrorKind::MissingSeparator => {
                "A semicolon is needed after each operation so that they aren't clustered together."
            }
            ErrorKind::TooManyStatements(_) => "Try doing fewer things at once!",
            ErrorKind::MissingBrackets => {
                "Brackets are needed after each operation, even if it takes no arguments: `invert();`."
            }
            ErrorKind::BadSyntax => {
                "Each operation takes exactly one pair of brackets: `name(key: value, ...)`."
            }
            ErrorKind::MissingKeyValueSeparator => {
                "Arguments are written as `key: value` pairs separated by commas."
            }
            ErrorKind::NonIntegerArgument => {
                "Argument values must be whole numbers, e.g. `blur(amount: 5);`."
            }
            ErrorKind::UnknownOperation(_) => {
                "Check your spelling! `--list` shows every available operation."
            }
            ErrorKind::InvalidArguments(_) => {
                "Double-check which arguments the operation accepts and that the image is large enough."
            }
        }
    }
}

/// Errors that can occur while running a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    /// 1-based statement index, when the failure belongs to one statement.
    pub step: Option<usize>,
}

impl Error {
    /// Create an error that is not tied to any statement.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, step: None }
    }

    /// Create an error at a statement.
    pub fn at_step(kind: ErrorKind, step: usize) -> Self {
        Self {
            kind,
            step: Some(step),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.kind.message())?;

        match self.step {
            Some(step) => write!(f, "\nThis happened during operation {}.", step),
            None => Ok(()),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for interpreter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure raised from inside an operation or the artifact encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The input or arguments break one of the operation's own constraints.
    /// The message is meant for the user.
    Rejected(String),
    /// Anything else. The message is logged but never shown to the user.
    Failed(String),
}

impl OperationError {
    pub fn rejected(message: impl Into<String>) -> Self {
        OperationError::Rejected(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        OperationError::Failed(message.into())
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationError::Rejected(message) => write!(f, "{}", message),
            OperationError::Failed(message) => write!(f, "internal failure: {}", message),
        }
    }
}

impl std::error::Error for OperationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_without_step_display() {
        let err = Error::new(ErrorKind::MissingSeparator);
        assert_eq!(err.to_string(), "MissingSeparator: Missing semicolon!");
    }

    #[test]
    fn error_with_step_display() {
        let err = Error::at_step(ErrorKind::MissingBrackets, 3);
        assert_eq!(
            err.to_string(),
            "MissingBrackets: No brackets present!\nThis happened during operation 3."
        );
    }

    #[test]
    fn too_many_statements_reports_count() {
        let kind = ErrorKind::TooManyStatements(16);
        assert_eq!(
            kind.message(),
            "Only 15 operations are allowed at once. You tried to do 16"
        );
    }

    #[test]
    fn unknown_operation_names_the_operation() {
        let kind = ErrorKind::UnknownOperation("blurr".to_string());
        assert_eq!(kind.message(), "Operation blurr does not exist!");
        assert_eq!(kind.name(), "UnknownOperation");
    }

    #[test]
    fn operation_error_display() {
        assert_eq!(
            OperationError::rejected("Image too small!").to_string(),
            "Image too small!"
        );
        assert_eq!(
            OperationError::failed("boom").to_string(),
            "internal failure: boom"
        );
    }
}
