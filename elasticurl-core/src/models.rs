use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// How long a run may take before it is killed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// Build tool used to launch the test entry point
pub const DEFAULT_BUILD_TOOL: &str = "mvn";

/// Fully qualified class holding the elasticurl test `main`
pub const ENTRY_POINT_CLASS: &str = "software.amazon.awssdk.crt.test.Elasticurl";

/// Settings for a single run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunnerConfig {
    pub timeout: Duration,
    pub build_tool: String,
    pub working_directory: Option<PathBuf>,
}

impl RunnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_build_tool<S: Into<String>>(mut self, program: S) -> Self {
        self.build_tool = program.into();
        self
    }

    pub fn with_working_directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_directory = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            build_tool: DEFAULT_BUILD_TOOL.to_string(),
            working_directory: None,
        }
    }
}

/// A fully assembled command, ready to be spawned.
///
/// `args` is what the OS receives. `command_line` is the human readable form
/// printed in diagnostics and carried by errors; it may quote values that
/// `args` passes bare.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    command_line: String,
}

impl Invocation {
    pub fn new<S: Into<String>>(program: S, args: Vec<String>) -> Self {
        let program = program.into();
        let command_line = std::iter::once(program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            program,
            args,
            command_line,
        }
    }

    pub fn with_command_line<S: Into<String>>(mut self, command_line: S) -> Self {
        self.command_line = command_line.into();
        self
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Program followed by its arguments
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line)
    }
}

/// Summary of a run that finished with exit code 0
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub id: Uuid,
    pub command: String,
    pub exit_code: i32,
    pub output_lines: usize,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
