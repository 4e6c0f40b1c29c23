use anyhow::{anyhow, Error};
use futures::future;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Everything a finished command left behind. `error` carries the first
/// failure observed anywhere in the run; the buffers may still hold partial
/// output when it is set.
#[derive(Debug)]
pub struct CommandResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub error: Option<Error>,
}

/// Run a command to completion, capturing stdout and stderr in full.
///
/// Each stream is drained by its own task so the child can never stall on a
/// full OS pipe buffer; both drains are joined before the exit status is
/// consulted. Failures from either drain, from spawning, or from the exit
/// wait are funneled through one channel and the first one wins.
pub async fn run_command(mut cmd: Command) -> CommandResult {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    tracing::debug!("running {:?}", cmd.as_std());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return CommandResult {
                stdout: Vec::new(),
                stderr: Vec::new(),
                error: Some(Error::new(e).context("Failed to start command")),
            };
        }
    };

    let (errors, mut error_rx) = mpsc::unbounded_channel();

    let stdout_task = drain(child.stdout.take(), "stdout", errors.clone());
    let stderr_task = drain(child.stderr.take(), "stderr", errors.clone());

    let (stdout, stderr) = future::join(stdout_task, stderr_task).await;
    let stdout = stdout.unwrap_or_default();
    let stderr = stderr.unwrap_or_default();

    match child.wait().await {
        Ok(status) if !status.success() => {
            let _ = errors.send(anyhow!("Command failed: {}", status));
        }
        Err(e) => {
            let _ = errors.send(Error::new(e).context("Failed to wait for command"));
        }
        Ok(_) => {}
    }

    // All senders are gone at this point, so the receiver terminates once the
    // queued entries are consumed. First error wins; the rest are dropped.
    drop(errors);

    let mut error = None;
    while let Some(e) = error_rx.recv().await {
        if error.is_none() {
            error = Some(e);
        }
    }

    CommandResult {
        stdout,
        stderr,
        error,
    }
}

fn drain<R>(
    stream: Option<R>,
    name: &'static str,
    errors: mpsc::UnboundedSender<Error>,
) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        match stream {
            Some(mut stream) => {
                if let Err(e) = stream.read_to_end(&mut buf).await {
                    let _ = errors.send(Error::new(e).context(format!("Failed to read {}", name)));
                }
            }
            // Missing handle: report it, but keep going so the caller still
            // gets the other stream and the exit status.
            None => {
                let _ = errors.send(anyhow!("No {} handle on child process", name));
            }
        }
        buf
    })
}
