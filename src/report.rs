//! Turns pipeline results into text for whoever delivers them.

use serde::Serialize;

use crate::error::Error;
use crate::interpreter::Completion;

/// Render an error as `Kind: message`, followed by the failing step when
/// there is one. This is the error's `Display` form.
pub fn render(error: &Error) -> String {
    error.to_string()
}

/// [`render`] plus a longer explanation of the error kind.
pub fn render_with_hint(error: &Error) -> String {
    format!("{}\n{}", render(error), error.kind.hint())
}

/// Machine-readable outcome of one run.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Report {
    Completed {
        operations: usize,
        elapsed_secs: f64,
        output: String,
        bytes: usize,
    },
    Failed {
        kind: &'static str,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<usize>,
    },
}

impl Report {
    /// Report for a completed run whose artifact was written to `output`.
    pub fn completed(completion: &Completion, output: impl Into<String>) -> Self {
        Report::Completed {
            operations: completion.operations,
            elapsed_secs: completion.elapsed.as_secs_f64(),
            output: output.into(),
            bytes: completion.artifact.data.len(),
        }
    }

    pub fn failed(error: &Error) -> Self {
        Report::Failed {
            kind: error.kind.name(),
            message: error.kind.message(),
            step: error.step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{Artifact, SaveOptions};
    use crate::error::ErrorKind;
    use std::time::Duration;

    #[test]
    fn render_with_step() {
        let err = Error::at_step(ErrorKind::UnknownOperation("gay".to_string()), 2);
        assert_eq!(
            render(&err),
            "UnknownOperation: Operation gay does not exist!\nThis happened during operation 2."
        );
    }

    #[test]
    fn render_without_step() {
        let err = Error::new(ErrorKind::TooManyStatements(16));
        assert_eq!(
            render(&err),
            "TooManyStatements: Only 15 operations are allowed at once. You tried to do 16"
        );
    }

    #[test]
    fn render_is_display() {
        let err = Error::at_step(ErrorKind::BadSyntax, 4);
        assert_eq!(render(&err), err.to_string());
    }

    #[test]
    fn render_with_hint_appends_explanation() {
        let err = Error::at_step(ErrorKind::MissingBrackets, 1);
        let text = render_with_hint(&err);
        assert!(text.starts_with(&render(&err)));
        assert!(text.ends_with(ErrorKind::MissingBrackets.hint()));
    }

    #[test]
    fn failed_report_json() {
        let err = Error::at_step(ErrorKind::NonIntegerArgument, 1);
        let json = serde_json::to_value(Report::failed(&err)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "failed",
                "kind": "NonIntegerArgument",
                "message": "Argument must be a number, not a word or letter!",
                "step": 1
            })
        );
    }

    #[test]
    fn failed_report_without_step_omits_it() {
        let err = Error::new(ErrorKind::MissingSeparator);
        let json = serde_json::to_value(Report::failed(&err)).unwrap();
        assert!(json.get("step").is_none());
    }

    #[test]
    fn completed_report_json() {
        let completion = Completion {
            artifact: Artifact::new(vec![0; 20], "blur.ppm"),
            save_options: SaveOptions::new(),
            elapsed: Duration::from_millis(500),
            operations: 2,
        };
        let json = serde_json::to_value(Report::completed(&completion, "out/blur.ppm")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "completed",
                "operations": 2,
                "elapsed_secs": 0.5,
                "output": "out/blur.ppm",
                "bytes": 20
            })
        );
    }
}
