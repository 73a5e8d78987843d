//! Child termination for [`super::ServerSupervisor::dispose`].
//!
//! The stas server keeps a translation model loaded and may be flushing
//! its cache on exit, so on unix it is asked to stop with SIGTERM first
//! and only killed once a short window elapses. Other platforms have no
//! polite signal and kill immediately.

use std::io;
use std::process::ExitStatus;

use tokio::process::Child;

#[cfg(unix)]
const SIGTERM_WINDOW: std::time::Duration = std::time::Duration::from_secs(5);

/// Terminate the child and reap its exit status.
pub(crate) async fn shutdown_child(mut child: Child) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;
        use tokio::time::timeout;

        // `id()` is None once tokio has already reaped the child.
        if let Some(pid) = child.id() {
            match kill(Pid::from_raw(pid.cast_signed()), Signal::SIGTERM) {
                // ESRCH: exited between id() and the signal
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => return Err(io::Error::other(e)),
            }

            if let Ok(status) = timeout(SIGTERM_WINDOW, child.wait()).await {
                return status;
            }
            tracing::warn!("stas-server ignored SIGTERM, escalating to SIGKILL");
        }
    }

    child.kill().await?;
    child.wait().await
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;
    use tokio::process::Command;
    use tokio::time::{Duration, sleep};

    /// Spawn a shell script standing in for a running stas-server.
    fn spawn_script(dir: &TempDir, body: &str) -> Child {
        let script = dir.path().join("stas-server.sh");
        fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).unwrap();
        Command::new(script).spawn().unwrap()
    }

    #[tokio::test]
    async fn test_sigterm_lets_server_exit_cleanly() {
        let dir = TempDir::new().unwrap();
        let child = spawn_script(&dir, "trap 'exit 0' TERM\nwhile :; do sleep 0.05; done");

        let status = shutdown_child(child).await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_shutdown_after_server_already_exited() {
        let dir = TempDir::new().unwrap();
        let child = spawn_script(&dir, "exit 0");
        sleep(Duration::from_millis(100)).await;

        let status = shutdown_child(child).await.unwrap();
        assert!(status.success());
    }
}
