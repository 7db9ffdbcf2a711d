//! Interpreter for ImageScript.
//!
//! A script is split into statements which are parsed, coerced, resolved
//! and run one at a time. Each operation receives the artifact produced by
//! the previous one; the first failure aborts the whole pipeline.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::artifact::{Artifact, SaveOptions};
use crate::error::{Error, ErrorKind, OperationError, Result};
use crate::parser;
use crate::pool::WorkerPool;
use crate::registry::Registry;

/// A named image transformation that can be called from a script.
pub trait Operation: Send + Sync {
    /// Name used to call the operation, e.g. `blur`.
    fn name(&self) -> &'static str;

    /// One-line description for the operation listing.
    fn description(&self) -> &'static str;

    /// Arguments the operation accepts. Anything else is rejected before
    /// `apply` is called.
    fn params(&self) -> &'static [Param] {
        &[]
    }

    /// Transform the input artifact.
    fn apply(
        &self,
        input: &Artifact,
        args: &Arguments,
    ) -> std::result::Result<Output, OperationError>;
}

/// An in-memory image that can be written out under a file extension.
pub trait Encode {
    fn encode(
        &self,
        ext: &str,
        options: &SaveOptions,
    ) -> std::result::Result<Vec<u8>, OperationError>;
}

/// Bytes that are already encoded are written as they are.
impl Encode for Vec<u8> {
    fn encode(
        &self,
        _ext: &str,
        _options: &SaveOptions,
    ) -> std::result::Result<Vec<u8>, OperationError> {
        Ok(self.clone())
    }
}

/// A declared argument of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    /// Value used when the script leaves the argument out. `None` makes the
    /// argument required.
    pub default: Option<i64>,
}

impl Param {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            default: None,
        }
    }

    pub const fn optional(name: &'static str, default: i64) -> Self {
        Self {
            name,
            default: Some(default),
        }
    }
}

/// Arguments of one call, checked against the operation's params with
/// defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arguments {
    values: BTreeMap<&'static str, i64>,
}

impl Arguments {
    /// Bind supplied values to the operation's declared params.
    ///
    /// Fails on an undeclared key or a required param with no value.
    pub fn bind(
        operation: &dyn Operation,
        supplied: &BTreeMap<String, i64>,
    ) -> std::result::Result<Self, String> {
        let params = operation.params();

        if let Some(unknown) = supplied
            .keys()
            .find(|key| !params.iter().any(|p| p.name == key.as_str()))
        {
            return Err(format!(
                "Provided arguments are not valid for operation {}: it has no argument '{}'",
                operation.name(),
                unknown
            ));
        }

        let mut values = BTreeMap::new();
        for param in params {
            let value = supplied
                .get(param.name)
                .copied()
                .or(param.default)
                .ok_or_else(|| {
                    format!(
                        "Provided arguments are not valid for operation {}: argument '{}' is required",
                        operation.name(),
                        param.name
                    )
                })?;
            values.insert(param.name, value);
        }
        Ok(Self { values })
    }

    /// Value of a declared argument.
    pub fn get(&self, name: &str) -> std::result::Result<i64, OperationError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| OperationError::failed(format!("argument '{}' was not declared", name)))
    }
}

/// What an operation hands back: the new image, the filename it should be
/// saved under and any encoder options.
pub struct Output {
    pub image: Box<dyn Encode + Send>,
    pub filename: String,
    pub save_options: SaveOptions,
}

impl Output {
    /// An output with no save options.
    pub fn new(image: impl Encode + Send + 'static, filename: impl Into<String>) -> Self {
        Self {
            image: Box::new(image),
            filename: filename.into(),
            save_options: SaveOptions::new(),
        }
    }

    pub fn with_save_options(mut self, save_options: SaveOptions) -> Self {
        self.save_options = save_options;
        self
    }

    /// Encode the image under its filename, producing the artifact for the
    /// next step.
    pub fn encode(self) -> std::result::Result<(Artifact, SaveOptions), OperationError> {
        let mut artifact = Artifact::new(Vec::new(), &self.filename);
        artifact.data = self.image.encode(&artifact.ext, &self.save_options)?;
        Ok((artifact, self.save_options))
    }
}

/// A finished pipeline.
#[derive(Debug)]
pub struct Completion {
    pub artifact: Artifact,
    pub save_options: SaveOptions,
    pub elapsed: Duration,
    /// Number of statements that ran.
    pub operations: usize,
}

impl Completion {
    pub fn summary(&self) -> String {
        format!(
            "Completed {} operation(s) in {:.2} seconds.",
            self.operations,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Runs scripts against a registry, offloading each operation to a worker
/// pool.
pub struct Interpreter<'r> {
    registry: &'r Registry,
    pool: WorkerPool,
}

impl<'r> Interpreter<'r> {
    pub fn new(registry: &'r Registry, pool: WorkerPool) -> Self {
        Self { registry, pool }
    }

    /// Run a script on an input artifact.
    ///
    /// Statements are parsed and executed one after the other, so a parse
    /// error in a late statement is only found after earlier operations ran.
    /// Their output is dropped; nothing is returned unless every statement
    /// succeeds.
    pub async fn run(&self, script: &str, input: Artifact) -> Result<Completion> {
        let statements = parser::split_script(script).inspect_err(|e| {
            warn!(kind = e.kind.name(), message = %e.kind.message(), "script rejected")
        })?;
        let operations = statements.len();
        debug!(operations, "script split");

        let started = Instant::now();
        let mut current = input;
        let mut save_options = SaveOptions::new();

        for (index, raw) in statements.into_iter().enumerate() {
            let step = index + 1;
            let (artifact, options) = self
                .run_statement(raw, step, current)
                .await
                .inspect_err(|e| {
                    warn!(step, kind = e.kind.name(), message = %e.kind.message(), "pipeline failed")
                })?;
            current = artifact;
            save_options = options;
        }

        let completion = Completion {
            artifact: current,
            save_options,
            elapsed: started.elapsed(),
            operations,
        };
        info!(
            operations,
            elapsed_ms = completion.elapsed.as_millis() as u64,
            output = %completion.artifact.filename(),
            "pipeline completed"
        );
        Ok(completion)
    }

    async fn run_statement(
        &self,
        raw: &str,
        step: usize,
        input: Artifact,
    ) -> Result<(Artifact, SaveOptions)> {
        let call = parser::parse_call(raw, step)?.coerce()?;

        let operation = self.registry.resolve(&call.name).ok_or_else(|| {
            Error::at_step(ErrorKind::UnknownOperation(call.name.clone()), step)
        })?;

        let args = Arguments::bind(operation.as_ref(), &call.args)
            .map_err(|message| Error::at_step(ErrorKind::InvalidArguments(message), step))?;

        let name = operation.name();
        debug!(step, operation = name, ?args, "running statement");

        let job = move || operation.apply(&input, &args)?.encode();
        match self.pool.run(job).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(OperationError::Rejected(message))) => {
                Err(Error::at_step(ErrorKind::InvalidArguments(message), step))
            }
            Ok(Err(OperationError::Failed(message))) => {
                error!(step, operation = name, %message, "operation failed");
                Err(internal_failure(name, step))
            }
            Err(e) => {
                error!(step, operation = name, error = %e, "worker failed");
                Err(internal_failure(name, step))
            }
        }
    }
}

fn internal_failure(name: &str, step: usize) -> Error {
    Error::at_step(
        ErrorKind::InvalidArguments(format!("Operation {} could not process this image", name)),
        step,
    )
}
