// Output plumbing for a single child process: stdout and stderr share one
// pipe, read line by line on a dedicated thread.

use std::io::{self, BufRead, BufReader, PipeReader, Read};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::timeout;
use tracing::warn;

/// How long to keep collecting output once the child is gone
pub const DRAIN_GRACE: Duration = Duration::from_secs(5);

/// One pipe for both stdout and stderr of the child, like a shell `2>&1`.
///
/// The returned `Stdio` handles hold the write end. They must be dropped in
/// the parent after spawning (by dropping the `Command`), otherwise the
/// reader never sees end of file.
pub fn combined_pipe() -> io::Result<(PipeReader, Stdio, Stdio)> {
    let (reader, writer) = io::pipe()?;
    let stderr = writer.try_clone()?;
    Ok((reader, Stdio::from(writer), Stdio::from(stderr)))
}

/// Lines of the combined stream, in the order the child wrote them.
pub struct CombinedOutput {
    receiver: UnboundedReceiver<Vec<u8>>,
}

impl CombinedOutput {
    /// Start reading `stream` on a detached thread. Runtime shutdown never
    /// waits on it, even if a stray grandchild keeps the pipe open.
    pub fn spawn<R>(stream: R) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("elasticurl-output".to_string())
            .spawn(move || {
                for segment in BufReader::new(stream).split(b'\n') {
                    let Ok(mut line) = segment else { break };
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    if sender.send(line).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self { receiver })
    }

    /// Collect everything the reader produces until the stream closes or
    /// `grace` elapses, whichever comes first.
    pub async fn drain(mut self, grace: Duration) -> Vec<String> {
        let mut lines = Vec::new();
        let receiver = &mut self.receiver;
        let finished = timeout(grace, async {
            while let Some(line) = receiver.recv().await {
                lines.push(String::from_utf8_lossy(&line).into_owned());
            }
        })
        .await;

        if finished.is_err() {
            warn!(
                grace_ms = grace.as_millis() as u64,
                "Output stream still open after the child exited, dropping the rest"
            );
            // Whatever was already queued is still worth keeping.
            while let Ok(line) = self.receiver.try_recv() {
                lines.push(String::from_utf8_lossy(&line).into_owned());
            }
        }

        lines
    }
}

/// SIGKILL every process in the group led by `leader`.
#[cfg(unix)]
pub fn kill_process_group(leader: u32) -> nix::Result<()> {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    killpg(Pid::from_raw(leader as i32), Signal::SIGKILL)
}

/// Exit code of a finished child. A child ended by a signal reports the
/// negated signal number.
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}
