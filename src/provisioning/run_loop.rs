use log::{debug, info, warn};

use crate::configuration::Credentials;
use crate::controller_api::auth_client;
use crate::controller_api::lab_catalog::LabCatalog;
use crate::controller_api::transport::ControllerTransport;
use crate::controller_api::types::{AuthSession, LabSummary};
use crate::enrollment::{EnrollmentFlow, EnrollmentOutcome};
use crate::error_handling::types::{AuthError, CatalogError, ProvisionError};
use crate::external_client::ClientLauncher;
use crate::operator::Operator;
use crate::provisioning::context::ProvisioningContext;
use crate::session_generation::{GenerationReport, SessionGenerator};

/// Steps of one provisioning run.
#[derive(Debug)]
pub enum RunStep {
    CheckConfig,
    Enroll,
    LoadConfig,
    /// Drop the stored configuration and go back through setup.
    ResetConfig { reason: String },
    Authenticate(Credentials),
    SelectLab(Credentials, AuthSession),
    Generate(Credentials, AuthSession, LabSummary),
    Finished(GenerationReport),
    Quit,
}

impl RunStep {
    pub fn name(&self) -> &'static str {
        match self {
            RunStep::CheckConfig => "check-config",
            RunStep::Enroll => "enroll",
            RunStep::LoadConfig => "load-config",
            RunStep::ResetConfig { .. } => "reset-config",
            RunStep::Authenticate(_) => "authenticate",
            RunStep::SelectLab(..) => "select-lab",
            RunStep::Generate(..) => "generate",
            RunStep::Finished(_) => "finished",
            RunStep::Quit => "quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Generated(GenerationReport),
    Quit,
}

/// Drives a run from the configuration check to generated session files.
pub struct Provisioner<'a, T: ControllerTransport + ?Sized, L: ClientLauncher + ?Sized> {
    ctx: &'a ProvisioningContext,
    transport: &'a T,
    launcher: &'a L,
    operator: &'a dyn Operator,
}

impl<'a, T: ControllerTransport + ?Sized, L: ClientLauncher + ?Sized> Provisioner<'a, T, L> {
    pub fn new(
        ctx: &'a ProvisioningContext,
        transport: &'a T,
        launcher: &'a L,
        operator: &'a dyn Operator,
    ) -> Self {
        Self {
            ctx,
            transport,
            launcher,
            operator,
        }
    }

    pub async fn run(&self) -> Result<RunOutcome, ProvisionError> {
        let mut step = RunStep::CheckConfig;
        loop {
            debug!("Run step: {}", step.name());
            step = match step {
                RunStep::Finished(report) => return Ok(RunOutcome::Generated(report)),
                RunStep::Quit => return Ok(RunOutcome::Quit),
                other => self.advance(other).await?,
            };
        }
    }

    pub async fn advance(&self, step: RunStep) -> Result<RunStep, ProvisionError> {
        match step {
            RunStep::CheckConfig => Ok(self.check_config()),
            RunStep::Enroll => self.enroll().await,
            RunStep::LoadConfig => Ok(self.load_config()),
            RunStep::ResetConfig { reason } => self.reset_config(&reason),
            RunStep::Authenticate(credentials) => Ok(self.authenticate(credentials).await),
            RunStep::SelectLab(credentials, session) => self.select_lab(credentials, session).await,
            RunStep::Generate(credentials, session, lab) => {
                self.generate(credentials, session, lab).await
            }
            terminal => Ok(terminal),
        }
    }

    fn check_config(&self) -> RunStep {
        let store = self.ctx.credential_store();
        if store.exists() {
            RunStep::LoadConfig
        } else {
            self.operator.notify(&format!(
                "{} was not found. Beginning setup",
                store.path().display()
            ));
            RunStep::Enroll
        }
    }

    async fn enroll(&self) -> Result<RunStep, ProvisionError> {
        let flow = EnrollmentFlow::new(self.ctx, self.transport, self.launcher, self.operator);
        match flow.run().await? {
            EnrollmentOutcome::Enrolled(credentials) => {
                info!("Setup complete for {}", credentials.controller);
                Ok(RunStep::CheckConfig)
            }
            EnrollmentOutcome::Cancelled => Ok(RunStep::Quit),
        }
    }

    fn load_config(&self) -> RunStep {
        let credentials = match self.ctx.credential_store().load() {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!("Stored configuration is unusable: {}", e);
                return RunStep::ResetConfig {
                    reason: format!("The stored configuration could not be read: {}", e),
                };
            }
        };

        let controller_dir = self.ctx.controller_dir(&credentials);
        if !controller_dir.is_dir() {
            warn!("{} is missing; stored configuration is stale", controller_dir.display());
            return RunStep::ResetConfig {
                reason: format!("The directory {} was not found.", controller_dir.display()),
            };
        }
        RunStep::Authenticate(credentials)
    }

    fn reset_config(&self, reason: &str) -> Result<RunStep, ProvisionError> {
        self.operator
            .acknowledge(&format!("{}\nSetup will start again.", reason))?;
        self.ctx.credential_store().delete()?;
        Ok(RunStep::Enroll)
    }

    async fn authenticate(&self, credentials: Credentials) -> RunStep {
        self.operator.notify(&format!(
            "VALIDATING ACCOUNT {} AGAINST {}",
            credentials.username, credentials.controller
        ));
        match auth_client::authenticate(
            self.transport,
            &credentials.username,
            &credentials.password,
            &credentials.controller,
        )
        .await
        {
            Ok(session) => {
                self.operator.notify("AUTHENTICATION SUCCEEDED");
                RunStep::SelectLab(credentials, session)
            }
            Err(e) => RunStep::ResetConfig {
                reason: format!("AUTHENTICATION FAILED: {}", e),
            },
        }
    }

    /// Turns catalog failures into a reset when the token was rejected.
    fn catalog_failure(&self, err: CatalogError) -> Result<RunStep, ProvisionError> {
        match err {
            CatalogError::Auth(AuthError::Unauthorized { status }) => Ok(RunStep::ResetConfig {
                reason: format!("The controller rejected the session token (HTTP {})", status),
            }),
            other => Err(other.into()),
        }
    }

    async fn select_lab(
        &self,
        credentials: Credentials,
        session: AuthSession,
    ) -> Result<RunStep, ProvisionError> {
        let labs = match LabCatalog::new(self.transport, &session).list_labs().await {
            Ok(labs) => labs,
            Err(e) => return self.catalog_failure(e),
        };
        if labs.is_empty() {
            self.operator
                .notify(&format!("No labs found on {}", credentials.controller));
            return Ok(RunStep::Quit);
        }

        self.operator.notify(&format_lab_table(&labs));
        self.operator.notify("('q' to quit.)");

        loop {
            let answer = self.operator.input(
                "Enter lab NUMBER you wish to generate sessions for from the list above",
            )?;
            match parse_lab_choice(&answer, labs.len()) {
                LabChoice::Quit => {
                    self.operator.notify("Exiting");
                    return Ok(RunStep::Quit);
                }
                LabChoice::Lab(index) => {
                    let lab = labs[index - 1].clone();
                    info!("Selected lab '{}' ({})", lab.title, lab.id);
                    return Ok(RunStep::Generate(credentials, session, lab));
                }
                LabChoice::Invalid => continue,
            }
        }
    }

    async fn generate(
        &self,
        credentials: Credentials,
        session: AuthSession,
        lab: LabSummary,
    ) -> Result<RunStep, ProvisionError> {
        let topology = match LabCatalog::new(self.transport, &session).topology(&lab.id).await {
            Ok(topology) => topology,
            Err(e) => return self.catalog_failure(e),
        };

        let controller_dir = self.ctx.controller_dir(&credentials);
        let node_template = self.ctx.node_template_path(&credentials);
        self.operator.notify("Generating session files.");
        let report = SessionGenerator::new(&controller_dir, &node_template).generate(&topology)?;

        self.operator.notify(&format!(
            "Generation of node session files for lab '{}' complete: {} created, {} skipped",
            topology.title, report.created, report.skipped
        ));
        Ok(RunStep::Finished(report))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabChoice {
    Lab(usize),
    Quit,
    Invalid,
}

/// Interprets the lab prompt answer. Anything containing `q` quits.
pub fn parse_lab_choice(answer: &str, lab_count: usize) -> LabChoice {
    let answer = answer.trim();
    if answer.to_lowercase().contains('q') {
        return LabChoice::Quit;
    }
    match answer.parse::<usize>() {
        Ok(n) if (1..=lab_count).contains(&n) => LabChoice::Lab(n),
        _ => LabChoice::Invalid,
    }
}

pub fn format_lab_table(labs: &[LabSummary]) -> String {
    let title_width = labs
        .iter()
        .map(|l| l.title.chars().count())
        .max()
        .unwrap_or(0)
        .max("LAB".len());
    let state_width = labs
        .iter()
        .map(|l| l.state.chars().count())
        .max()
        .unwrap_or(0)
        .max("STATE".len());

    let mut out = format!(
        "{:<8}{:<tw$}  {:<sw$}  {}\n",
        "NUMBER",
        "LAB",
        "STATE",
        "ID",
        tw = title_width,
        sw = state_width
    );
    for lab in labs {
        out.push_str(&format!(
            "{:<8}{:<tw$}  {:<sw$}  {}\n",
            lab.index,
            lab.title,
            lab.state,
            lab.id,
            tw = title_width,
            sw = state_width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller_api::transport::fake::FakeTransport;
    use crate::error_handling::types::TransportError;
    use crate::external_client::fake::RecordingLauncher;
    use crate::operator::scripted::{text, Answer, ScriptedOperator};
    use crate::provisioning::context::fixtures;
    use std::fs;

    const TILES: &str = r#"{"lab_tiles": {
        "lab-1": {"lab_title": "Lab: 1", "state": "STARTED", "id": "lab-1",
                  "topology": {"nodes": [
                      {"label": "R1", "node_definition": "iosv"},
                      {"label": "SW1", "node_definition": "unmanaged_switch"},
                      {"label": "Core/1", "node_definition": "iosv"}
                  ]}},
        "lab-2": {"lab_title": "Other", "state": "STOPPED", "id": "lab-2",
                  "topology": {"nodes": []}}
    }}"#;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Writes a credential store and node template as a completed setup would.
    fn enrolled(env: &fixtures::Environment) -> Credentials {
        let creds = Credentials::new("admin", "secret", "cml.lab");
        env.ctx
            .credential_store()
            .persist(&env.ctx.initial_config_seed(), &creds)
            .unwrap();
        fs::create_dir_all(env.ctx.controller_dir(&creds)).unwrap();
        fs::write(
            env.ctx.node_template_path(&creds),
            "S:\"Login Script V3\"=open /CHANGEME_LAB_TITLE/CHANGEME_NODE_LABEL/0\n",
        )
        .unwrap();
        creds
    }

    #[test]
    fn test_parse_lab_choice() {
        assert_eq!(parse_lab_choice("2", 3), LabChoice::Lab(2));
        assert_eq!(parse_lab_choice(" 1 ", 3), LabChoice::Lab(1));
        assert_eq!(parse_lab_choice("0", 3), LabChoice::Invalid);
        assert_eq!(parse_lab_choice("4", 3), LabChoice::Invalid);
        assert_eq!(parse_lab_choice("abc", 3), LabChoice::Invalid);
        assert_eq!(parse_lab_choice("", 3), LabChoice::Invalid);
        assert_eq!(parse_lab_choice("q", 3), LabChoice::Quit);
        assert_eq!(parse_lab_choice("Quit", 3), LabChoice::Quit);
    }

    #[test]
    fn test_lab_table_lists_every_lab() {
        let labs = vec![
            LabSummary { index: 1, title: "Lab: 1".into(), state: "STARTED".into(), id: "a".into() },
            LabSummary { index: 2, title: "Other".into(), state: "STOPPED".into(), id: "b".into() },
        ];
        let table = format_lab_table(&labs);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NUMBER"));
        assert!(lines[1].starts_with("1") && lines[1].contains("Lab: 1") && lines[1].ends_with("a"));
        assert!(lines[2].contains("STOPPED"));
    }

    #[tokio::test]
    async fn test_existing_config_generates_sessions() {
        init_logging();
        let env = fixtures::environment();
        let creds = enrolled(&env);
        let transport = FakeTransport::new(vec![
            FakeTransport::ok(200, "\"tok\""),
            FakeTransport::ok(200, TILES),
            FakeTransport::ok(200, TILES),
        ]);
        let launcher = RecordingLauncher::succeeding();
        let operator = ScriptedOperator::new(vec![text("7"), text("1")]);

        let outcome = Provisioner::new(&env.ctx, &transport, &launcher, &operator)
            .run()
            .await
            .unwrap();

        let report = match outcome {
            RunOutcome::Generated(report) => report,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(report.created, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.lab_dir, env.ctx.controller_dir(&creds).join("Lab_ 1"));

        let r1 = fs::read_to_string(report.lab_dir.join("R1.ini")).unwrap();
        assert!(r1.contains("open /Lab: 1/R1/0"));
        assert!(report.lab_dir.join("Core_1.ini").is_file());
        assert!(!report.lab_dir.join("SW1.ini").exists());
        assert!(launcher.launches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quit_at_lab_prompt() {
        let env = fixtures::environment();
        enrolled(&env);
        let transport = FakeTransport::new(vec![
            FakeTransport::ok(200, "\"tok\""),
            FakeTransport::ok(200, TILES),
        ]);
        let launcher = RecordingLauncher::succeeding();
        let operator = ScriptedOperator::new(vec![text("q")]);

        let outcome = Provisioner::new(&env.ctx, &transport, &launcher, &operator)
            .run()
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::Quit);
    }

    #[tokio::test]
    async fn test_missing_config_runs_setup_first() {
        init_logging();
        let env = fixtures::environment();
        let transport = FakeTransport::new(vec![
            FakeTransport::ok(200, "\"tok\""),
            FakeTransport::ok(200, "\"tok\""),
            FakeTransport::ok(200, TILES),
            FakeTransport::ok(200, TILES),
        ]);
        let launcher = RecordingLauncher::succeeding();
        let operator = ScriptedOperator::new(vec![
            text("admin"),
            text("secret"),
            text("secret"),
            text("cml.lab"),
            Answer::Ack,
            text("2"),
        ]);

        let outcome = Provisioner::new(&env.ctx, &transport, &launcher, &operator)
            .run()
            .await
            .unwrap();
        match outcome {
            RunOutcome::Generated(report) => {
                assert_eq!(report.created, 0);
                assert!(report.lab_dir.ends_with("Other"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(launcher.launches.lock().unwrap().len(), 1);
        assert!(env.ctx.credential_store().exists());
    }

    #[tokio::test]
    async fn test_auth_failure_deletes_config_and_reenrolls() {
        let env = fixtures::environment();
        enrolled(&env);
        let transport = FakeTransport::new(vec![FakeTransport::ok(403, "")]);
        let launcher = RecordingLauncher::succeeding();
        let operator = ScriptedOperator::new(vec![Answer::Ack]);

        let provisioner = Provisioner::new(&env.ctx, &transport, &launcher, &operator);
        let step = provisioner.advance(RunStep::LoadConfig).await.unwrap();
        let step = provisioner.advance(step).await.unwrap();
        assert!(matches!(step, RunStep::ResetConfig { .. }));
        let step = provisioner.advance(step).await.unwrap();
        assert!(matches!(step, RunStep::Enroll));
        assert!(!env.ctx.credential_store().exists());
        assert!(operator.said("AUTHENTICATION FAILED"));
    }

    #[tokio::test]
    async fn test_missing_controller_dir_is_stale_config() {
        let env = fixtures::environment();
        let creds = enrolled(&env);
        fs::remove_dir_all(env.ctx.controller_dir(&creds)).unwrap();
        let transport = FakeTransport::new(vec![]);
        let launcher = RecordingLauncher::succeeding();
        let operator = ScriptedOperator::new(vec![]);

        let step = Provisioner::new(&env.ctx, &transport, &launcher, &operator)
            .advance(RunStep::LoadConfig)
            .await
            .unwrap();
        match step {
            RunStep::ResetConfig { reason } => assert!(reason.contains("was not found")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(transport.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_revoked_token_during_listing_resets() {
        let env = fixtures::environment();
        let creds = enrolled(&env);
        let transport = FakeTransport::new(vec![FakeTransport::ok(401, "")]);
        let launcher = RecordingLauncher::succeeding();
        let operator = ScriptedOperator::new(vec![]);
        let session = AuthSession {
            api_base: "https://cml.lab/api/v0".into(),
            token: "tok".into(),
            issued_at: chrono::Utc::now(),
        };

        let step = Provisioner::new(&env.ctx, &transport, &launcher, &operator)
            .advance(RunStep::SelectLab(creds, session))
            .await
            .unwrap();
        assert!(matches!(step, RunStep::ResetConfig { .. }));
    }

    #[tokio::test]
    async fn test_catalog_transport_failure_is_fatal() {
        let env = fixtures::environment();
        let creds = enrolled(&env);
        let transport = FakeTransport::new(vec![Err(TransportError::ConnectTimeout)]);
        let launcher = RecordingLauncher::succeeding();
        let operator = ScriptedOperator::new(vec![]);
        let session = AuthSession {
            api_base: "https://cml.lab/api/v0".into(),
            token: "tok".into(),
            issued_at: chrono::Utc::now(),
        };

        let err = Provisioner::new(&env.ctx, &transport, &launcher, &operator)
            .advance(RunStep::SelectLab(creds, session))
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Catalog(_)));
        assert!(err.is_fatal());
    }
}
