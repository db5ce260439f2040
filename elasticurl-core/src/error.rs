use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Timeout happened after {secs} secs from: {command}", secs = format_secs(.timeout))]
    Timeout { timeout: Duration, command: String },

    #[error("Return code {code} from: {command}")]
    NonZeroExit { code: i32, command: String },

    #[error("Build tool `{program}` not found on PATH: {source}")]
    BuildToolNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl HarnessError {
    /// The command line the failing run was started with, if the error came from a run.
    pub fn command(&self) -> Option<&str> {
        match self {
            HarnessError::Timeout { command, .. } | HarnessError::NonZeroExit { command, .. } => {
                Some(command)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;

// Whole seconds print bare ("100"), anything finer keeps its fraction ("0.3").
fn format_secs(duration: &Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        duration.as_secs_f64().to_string()
    }
}
