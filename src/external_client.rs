//! Running SecureCRT as a short-lived subprocess.

use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use crate::error_handling::types::ProcessError;

#[async_trait]
pub trait ClientLauncher: Send + Sync {
    /// Runs `executable` with `args` until it exits or `timeout` expires.
    /// Only a zero exit status counts as success.
    async fn launch(
        &self,
        executable: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<(), ProcessError>;
}

/// Launches the client with `tokio::process`.
pub struct ProcessLauncher;

#[async_trait]
impl ClientLauncher for ProcessLauncher {
    async fn launch(
        &self,
        executable: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<(), ProcessError> {
        info!("Launching {} {}", executable.display(), args.join(" "));

        let mut child = Command::new(executable)
            .args(args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                error!("Failed to start {}: {}", executable.display(), e);
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProcessError::NotFound(executable.to_path_buf())
                } else {
                    ProcessError::IoError(e)
                }
            })?;

        let status = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status?,
                Err(_) => {
                    warn!(
                        "{} still running after {:?}, terminating",
                        executable.display(),
                        limit
                    );
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill {}: {}", executable.display(), e);
                    }
                    return Err(ProcessError::TimedOut(limit));
                }
            },
            None => child.wait().await?,
        };

        debug!("{} exited with {}", executable.display(), status);
        if !status.success() {
            return Err(ProcessError::NonZeroExit(status.code()));
        }
        Ok(())
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_missing_executable() {
        let err = ProcessLauncher
            .launch(Path::new("/definitely/not/SecureCRT"), &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_success_and_failure_exit_codes() {
        let sh = PathBuf::from("/bin/sh");
        ProcessLauncher
            .launch(&sh, &["-c".into(), "exit 0".into()], Some(Duration::from_secs(5)))
            .await
            .unwrap();

        let err = ProcessLauncher
            .launch(&sh, &["-c".into(), "exit 3".into()], Some(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::NonZeroExit(Some(3))));
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let err = ProcessLauncher
            .launch(
                Path::new("/bin/sh"),
                &["-c".into(), "sleep 5".into()],
                Some(Duration::from_millis(100)),
            )
            .await
            .unwrap_err();
        match err {
            ProcessError::TimedOut(limit) => assert_eq!(limit, Duration::from_millis(100)),
            other => panic!("unexpected {:?}", other),
        }
    }
}
