//! Drives a full run against the shipped seed files: first-time setup, lab
//! selection and session generation.

use async_trait::async_trait;
use cml_crt_sessions::controller_api::{ApiRequest, ApiResponse, ControllerTransport};
use cml_crt_sessions::error_handling::types::{ProcessError, PromptError, TransportError};
use cml_crt_sessions::external_client::ClientLauncher;
use cml_crt_sessions::operator::Operator;
use cml_crt_sessions::provisioning::{Provisioner, ProvisioningContext, RunOutcome};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

const TILES: &str = r#"{"lab_tiles": {
    "9f1c": {"lab_title": "Lab: 1", "state": "STARTED", "id": "9f1c",
             "topology": {"nodes": [
                 {"label": "R1", "node_definition": "iosv"},
                 {"label": "SW1", "node_definition": "unmanaged_switch"},
                 {"label": "Core/1", "node_definition": "iosv"}
             ]}}
}}"#;

/// Answers login with a token and every other request with the lab tiles.
struct StubController {
    requests: Mutex<Vec<String>>,
}

#[async_trait]
impl ControllerTransport for StubController {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.url.clone());
        let body = if request.url.ends_with("/authenticate") {
            "\"token-1\"".to_string()
        } else {
            TILES.to_string()
        };
        Ok(ApiResponse { status: 200, body })
    }
}

struct NoopLauncher {
    launched: Mutex<u32>,
}

#[async_trait]
impl ClientLauncher for NoopLauncher {
    async fn launch(
        &self,
        _executable: &Path,
        _args: &[String],
        _timeout: Option<Duration>,
    ) -> Result<(), ProcessError> {
        *self.launched.lock().unwrap() += 1;
        Ok(())
    }
}

/// Replies with queued text; acknowledgements consume nothing.
struct Keyboard {
    lines: RefCell<VecDeque<&'static str>>,
}

impl Operator for Keyboard {
    fn input(&self, _prompt: &str) -> Result<String, PromptError> {
        self.lines
            .borrow_mut()
            .pop_front()
            .map(str::to_string)
            .ok_or(PromptError::Interrupted)
    }

    fn password(&self, prompt: &str) -> Result<String, PromptError> {
        self.input(prompt)
    }

    fn confirm(&self, _prompt: &str) -> Result<bool, PromptError> {
        Ok(false)
    }

    fn acknowledge(&self, _message: &str) -> Result<(), PromptError> {
        Ok(())
    }

    fn notify(&self, _message: &str) {}
}

fn context(dir: &TempDir) -> ProvisioningContext {
    let seeds = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
    let sessions = dir.path().join("Sessions");
    fs::create_dir_all(&sessions).unwrap();
    ProvisioningContext {
        client_executable: dir.path().join("SecureCRT"),
        bootstrap_launch_args: vec!["/T".into(), "/S".into(), "cml_console_server".into()],
        sessions_dir: sessions,
        seed_dir: seeds,
        config_path: dir.path().join("config.toml"),
        client_timeout: None,
        request_timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn first_run_sets_up_and_generates_sessions() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    ctx.check_seed_files().unwrap();

    let controller = StubController {
        requests: Mutex::new(Vec::new()),
    };
    let launcher = NoopLauncher {
        launched: Mutex::new(0),
    };
    let keyboard = Keyboard {
        lines: RefCell::new(
            vec!["admin", "p\"ss\\word", "p\"ss\\word", "cml.example.net", "1"].into(),
        ),
    };

    let outcome = Provisioner::new(&ctx, &controller, &launcher, &keyboard)
        .run()
        .await
        .unwrap();

    let report = match outcome {
        RunOutcome::Generated(report) => report,
        RunOutcome::Quit => panic!("run quit before generating"),
    };
    let lab_dir = ctx.sessions_dir.join("cml.example.net Labs").join("Lab_ 1");
    assert_eq!(report.lab_dir, lab_dir);
    assert_eq!(report.created, 2);
    assert!(lab_dir.join("R1.ini").is_file());
    assert!(lab_dir.join("Core_1.ini").is_file());
    assert!(!lab_dir.join("SW1.ini").exists());

    let r1 = fs::read_to_string(lab_dir.join("R1.ini")).unwrap();
    assert!(r1.contains("S:\"Hostname\"=cml.example.net"));
    assert!(r1.contains("S:\"Username\"=admin"));
    assert!(r1.contains("open /Lab: 1/R1/0"));

    let store = fs::read_to_string(&ctx.config_path).unwrap();
    assert!(store.contains("controller = \"cml.example.net\""));
    assert!(!ctx.bootstrap_session_path().exists());
    assert_eq!(*launcher.launched.lock().unwrap(), 1);

    // One login during setup, one for the run, then listing and topology.
    let requests = controller.requests.lock().unwrap();
    assert_eq!(requests.len(), 4);
    assert!(requests[0].starts_with("https://cml.example.net/api/v0/"));
}

#[tokio::test]
async fn quitting_at_lab_prompt_keeps_configuration() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let controller = StubController {
        requests: Mutex::new(Vec::new()),
    };
    let launcher = NoopLauncher {
        launched: Mutex::new(0),
    };
    let keyboard = Keyboard {
        lines: RefCell::new(vec!["admin", "pw", "pw", "10.1.1.1", "q"].into()),
    };

    let outcome = Provisioner::new(&ctx, &controller, &launcher, &keyboard)
        .run()
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::Quit);
    assert!(ctx.config_path.is_file());
    assert!(ctx
        .sessions_dir
        .join("10.1.1.1 Labs")
        .join("node_session_template")
        .is_file());
}
