use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

/// Capability surface the hosting pipeline provides to a run.
///
/// The runner only talks to the pipeline through this trait, so the
/// request/retry loop can be exercised in tests without a hosting runner.
pub trait PipelineContext {
    /// Emits an informational log line.
    fn info(&mut self, message: &str);
    /// Emits a warning log line.
    fn warning(&mut self, message: &str);
    /// Reports one named output value.
    fn set_output(&mut self, name: &str, value: &str);
    /// Marks the run failed without stopping it; outputs are still reported
    /// afterwards.
    fn set_failed(&mut self, message: &str);
}

/// Context speaking the hosting runner's stdout/file protocol.
///
/// Info lines go to stdout as-is, warnings and failures as `::warning::` /
/// `::error::` command lines, and outputs into the file named by
/// `$GITHUB_OUTPUT` (falling back to the legacy `::set-output` command when
/// the variable is unset).
#[derive(Debug, Default)]
pub struct ActionsContext {
    output_path: Option<PathBuf>,
    failed: bool,
}

impl ActionsContext {
    /// Creates a context wired to the current process environment.
    pub fn from_env() -> Self {
        Self {
            output_path: env::var_os("GITHUB_OUTPUT").map(PathBuf::from),
            failed: false,
        }
    }

    /// Creates a context writing outputs to an explicit file.
    pub fn with_output_path(path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: Some(path.into()),
            failed: false,
        }
    }

    /// Whether `set_failed` was called during the run.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    fn append_output(&self, name: &str, value: &str) -> io::Result<()> {
        let Some(path) = &self.output_path else {
            println!(
                "::set-output name={}::{}",
                escape_property(name),
                escape_data(value)
            );
            return Ok(());
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(format_output_entry(name, value).as_bytes())
    }
}

impl PipelineContext for ActionsContext {
    fn info(&mut self, message: &str) {
        println!("{message}");
    }

    fn warning(&mut self, message: &str) {
        println!("::warning::{}", escape_data(message));
    }

    fn set_output(&mut self, name: &str, value: &str) {
        if let Err(err) = self.append_output(name, value) {
            self.failed = true;
            println!(
                "::error::{}",
                escape_data(&format!("failed to write output '{name}': {err}"))
            );
        }
    }

    fn set_failed(&mut self, message: &str) {
        self.failed = true;
        println!("::error::{}", escape_data(message));
    }
}

/// Escapes message data for a workflow command line.
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escapes a command property; `:` and `,` delimit properties on the line.
fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Formats one output-file entry, using a heredoc block for values that
/// span multiple lines. The delimiter is grown until it occurs in neither
/// the name nor the value.
fn format_output_entry(name: &str, value: &str) -> String {
    if value.contains('\n') || value.contains('\r') {
        let mut delimiter = String::from("ghadelimiter");
        while value.contains(&delimiter) || name.contains(&delimiter) {
            delimiter.push('_');
        }
        format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
    } else {
        format!("{name}={value}\n")
    }
}
