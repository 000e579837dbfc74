//! TuneInCrew launcher.
//!
//! TuneInCrew takes one positional argument, the project XML path. The child
//! runs from its own directory; its output comes back as [`ToolEvent`]s on a
//! channel so the caller keeps working while it builds.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{ProjectError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolEvent {
    Stdout(String),
    Stderr(String),
    /// Always the last event. `code` is `None` when killed by a signal.
    Exited { code: Option<i32> },
}

/// Everything a finished run printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutcome {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub code: Option<i32>,
}

impl ToolOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Handle to a running TuneInCrew process.
///
/// Dropping it does not stop the child.
#[derive(Debug)]
pub struct ToolRun {
    pub pid: Option<u32>,
    pub xml_path: PathBuf,
    events: mpsc::UnboundedReceiver<ToolEvent>,
}

impl ToolRun {
    /// Next event, or `None` once `Exited` has been delivered.
    pub async fn next_event(&mut self) -> Option<ToolEvent> {
        self.events.recv().await
    }

    /// Drain events until the process exits.
    pub async fn wait(mut self) -> ToolOutcome {
        let mut outcome = ToolOutcome::default();
        while let Some(event) = self.next_event().await {
            match event {
                ToolEvent::Stdout(line) => outcome.stdout.push(line),
                ToolEvent::Stderr(line) => outcome.stderr.push(line),
                ToolEvent::Exited { code } => {
                    outcome.code = code;
                    break;
                }
            }
        }
        outcome
    }
}

/// The tool path must name an existing file.
pub fn validate_tool_path(tool: &Path) -> Result<()> {
    if tool.as_os_str().is_empty() || !tool.is_file() {
        return Err(ProjectError::InvalidExternalToolPath(tool.to_path_buf()));
    }
    Ok(())
}

/// Start `tool <xml_path>` in the tool's directory.
///
/// Must be called from inside a Tokio runtime.
pub fn spawn(tool: &Path, xml_path: &Path) -> Result<ToolRun> {
    validate_tool_path(tool)?;

    if tokio::runtime::Handle::try_current().is_err() {
        return Err(ProjectError::ToolLaunch {
            path: tool.to_path_buf(),
            source: std::io::Error::other("no Tokio runtime available"),
        });
    }

    let mut cmd = Command::new(tool);
    cmd.arg(xml_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = tool.parent().filter(|d| !d.as_os_str().is_empty()) {
        cmd.current_dir(dir);
    }

    info!(
        "Running TuneInCrew: {} {}",
        tool.display(),
        xml_path.display()
    );

    let mut child = cmd.spawn().map_err(|source| ProjectError::ToolLaunch {
        path: tool.to_path_buf(),
        source,
    })?;
    let pid = child.id();
    debug!("TuneInCrew spawned with PID: {:?}", pid);

    let (tx, rx) = mpsc::unbounded_channel();

    let stdout_task = child
        .stdout
        .take()
        .map(|out| tokio::spawn(forward_lines(out, tx.clone(), ToolEvent::Stdout)));
    let stderr_task = child
        .stderr
        .take()
        .map(|err| tokio::spawn(forward_lines(err, tx.clone(), ToolEvent::Stderr)));

    tokio::spawn(async move {
        let status = child.wait().await;

        // Flush remaining output before reporting the exit.
        if let Some(task) = stdout_task {
            let _ = task.await;
        }
        if let Some(task) = stderr_task {
            let _ = task.await;
        }

        let code = match status {
            Ok(status) => status.code(),
            Err(e) => {
                warn!("Failed to wait for TuneInCrew: {}", e);
                None
            }
        };
        info!("TuneInCrew finished with exit code: {:?}", code);
        let _ = tx.send(ToolEvent::Exited { code });
    });

    Ok(ToolRun {
        pid,
        xml_path: xml_path.to_path_buf(),
        events: rx,
    })
}

async fn forward_lines<R>(
    reader: R,
    tx: mpsc::UnboundedSender<ToolEvent>,
    wrap: fn(String) -> ToolEvent,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let event = wrap(line);
                match &event {
                    ToolEvent::Stderr(l) => warn!("TuneInCrew stderr: {}", l),
                    ToolEvent::Stdout(l) => debug!("TuneInCrew: {}", l),
                    ToolEvent::Exited { .. } => {}
                }
                // Receiver gone: keep reading so the child never blocks on a full pipe.
                let _ = tx.send(event);
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Stopped reading TuneInCrew output: {}", e);
                break;
            }
        }
    }
}
