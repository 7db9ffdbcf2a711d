use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use yansi::Paint;

use imagescript::artifact::Artifact;
use imagescript::help;
use imagescript::interpreter::Interpreter;
use imagescript::operators;
use imagescript::pool::WorkerPool;
use imagescript::report::{self, Report};

#[derive(Parser)]
#[command(name = "imagescript")]
#[command(
    about = "Chain image operations over a PPM image, e.g. `blur(amount: 4); crush(levels: 4); mirror();`"
)]
struct Cli {
    /// Script to run
    #[arg(required_unless_present = "list")]
    script: Option<String>,

    /// Input PPM image (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Where to write the result; `-` for stdout. Defaults to the filename
    /// reported by the last operation.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Maximum number of operations running at once
    #[arg(short = 'w', long = "workers")]
    workers: Option<usize>,

    /// Output a JSON report
    #[arg(short = 'j', long = "json")]
    json: bool,

    /// Explain errors in more detail
    #[arg(long = "explain")]
    explain: bool,

    /// List available operations and exit
    #[arg(short = 'l', long = "list")]
    list: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    yansi::whenever(yansi::Condition::TTY_AND_COLOR);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let registry = operators::registry();

    if cli.list {
        print!(
            "{}",
            help::help_text(&registry, yansi::Condition::TTY_AND_COLOR)
        );
        return Ok(ExitCode::SUCCESS);
    }

    let script = cli.script.context("no script given")?;
    let input = read_input(cli.input.as_deref())?;
    let pool = cli
        .workers
        .map(WorkerPool::new)
        .unwrap_or_else(WorkerPool::with_available_parallelism);
    tracing::debug!(workers = pool.workers(), "worker pool ready");

    let interpreter = Interpreter::new(&registry, pool);
    match interpreter.run(&script, input).await {
        Ok(done) => {
            let output = cli
                .output
                .unwrap_or_else(|| PathBuf::from(done.artifact.filename()));
            write_output(&output, &done.artifact.data)?;

            if cli.json {
                print_json(&Report::completed(&done, output.display().to_string()))?;
            } else {
                eprintln!("{}", done.summary().green());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if cli.json {
                print_json(&Report::failed(&e))?;
            } else if cli.explain {
                eprintln!("{}", report::render_with_hint(&e).red());
            } else {
                eprintln!("{}", report::render(&e).red());
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Load the starting image. A missing image stops the run before any
/// script is parsed.
fn read_input(path: Option<&Path>) -> Result<Artifact> {
    let (data, filename) = match path {
        Some(path) => {
            let data =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "input.ppm".to_string());
            (data, filename)
        }
        None => {
            let mut data = Vec::new();
            io::stdin()
                .read_to_end(&mut data)
                .context("failed to read stdin")?;
            (data, "input.ppm".to_string())
        }
    };

    if data.is_empty() {
        bail!("no image provided");
    }
    Ok(Artifact::new(data, &filename))
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    if path == Path::new("-") {
        let mut stdout = io::stdout().lock();
        stdout.write_all(data).context("failed to write stdout")?;
        stdout.flush().context("failed to write stdout")?;
        return Ok(());
    }
    fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
}

fn print_json(report: &Report) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, report).context("JSON serialization failed")?;
    writeln!(handle).context("failed to write stdout")?;
    Ok(())
}

