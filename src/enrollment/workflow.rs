use log::{debug, error, info, warn};
use std::fs;

use crate::configuration::Credentials;
use crate::controller_api::auth_client;
use crate::controller_api::transport::ControllerTransport;
use crate::enrollment::state::{EnrollmentOutcome, EnrollmentStep};
use crate::error_handling::types::{AuthError, EnrollmentError, GeneratorError, TemplateError};
use crate::external_client::ClientLauncher;
use crate::operator::Operator;
use crate::provisioning::context::{ProvisioningContext, BOOTSTRAP_SESSION_NAME, DISCONNECT_COMMAND};
use crate::session_generation::session_generator::connect_command;
use crate::session_generation::template_renderer::{self, COMMAND, CONTROLLER, LAB_TITLE, NODE_LABEL, USER};

/// The setup state machine. Each step does one thing, then names the next.
pub struct EnrollmentFlow<'a, T: ControllerTransport + ?Sized, L: ClientLauncher + ?Sized> {
    ctx: &'a ProvisioningContext,
    transport: &'a T,
    launcher: &'a L,
    operator: &'a dyn Operator,
}

impl<'a, T: ControllerTransport + ?Sized, L: ClientLauncher + ?Sized> EnrollmentFlow<'a, T, L> {
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

    /// Runs from credential collection to a terminal step.
    pub async fn run(&self) -> Result<EnrollmentOutcome, EnrollmentError> {
        let mut step = EnrollmentStep::CollectCredentials;
        loop {
            debug!("Enrollment step: {}", step.name());
            step = match step {
                EnrollmentStep::Done(credentials) => {
                    return Ok(EnrollmentOutcome::Enrolled(credentials))
                }
                EnrollmentStep::Cancelled => return Ok(EnrollmentOutcome::Cancelled),
                other => self.advance(other).await?,
            };
        }
    }

    /// Executes `step` and returns its successor. Terminal steps map to themselves.
    pub async fn advance(&self, step: EnrollmentStep) -> Result<EnrollmentStep, EnrollmentError> {
        match step {
            EnrollmentStep::CollectCredentials => self.collect_credentials(),
            EnrollmentStep::Validate(credentials) => self.validate(credentials).await,
            EnrollmentStep::Retry(reason) => self.retry(&reason),
            EnrollmentStep::PersistConfig(credentials) => self.persist_config(credentials),
            EnrollmentStep::CaptureEncryptedCredential(credentials) => {
                self.capture_encrypted_credential(credentials).await
            }
            EnrollmentStep::BuildNodeTemplate(credentials) => self.build_node_template(credentials),
            EnrollmentStep::Cleanup(credentials) => self.cleanup(credentials),
            terminal => Ok(terminal),
        }
    }

    fn ask_non_empty(&self, prompt: &str) -> Result<String, EnrollmentError> {
        loop {
            let answer = self.operator.input(prompt)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
        }
    }

    fn ask_password(&self) -> Result<String, EnrollmentError> {
        loop {
            let password = self.operator.password("CML Password")?;
            if password.is_empty() {
                continue;
            }
            let confirmation = self.operator.password("Confirm Password")?;
            if password == confirmation {
                return Ok(password);
            }
            self.operator.acknowledge("Passwords did not match")?;
        }
    }

    fn collect_credentials(&self) -> Result<EnrollmentStep, EnrollmentError> {
        let username = self.ask_non_empty("CML Username")?;
        let password = self.ask_password()?;
        let controller = self.ask_non_empty("CML Name or IP Address")?;
        Ok(EnrollmentStep::Validate(Credentials {
            username,
            password,
            controller,
        }))
    }

    /// Errors new credentials could fix go to Retry; the rest end setup.
    async fn validate(&self, credentials: Credentials) -> Result<EnrollmentStep, EnrollmentError> {
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
            Ok(_) => {
                self.operator.notify("AUTHENTICATION SUCCEEDED");
                Ok(EnrollmentStep::PersistConfig(credentials))
            }
            Err(e) if e.is_recoverable() => {
                warn!("Validation of {} failed: {}", credentials.controller, e);
                Ok(EnrollmentStep::Retry(e))
            }
            Err(e) => {
                error!("Controller {} answered unexpectedly: {}", credentials.controller, e);
                Err(EnrollmentError::Auth(e))
            }
        }
    }

    fn retry(&self, reason: &AuthError) -> Result<EnrollmentStep, EnrollmentError> {
        self.operator.notify(&format!("ERROR: {}", reason));
        if self.operator.confirm("Try entering configuration settings again?")? {
            Ok(EnrollmentStep::CollectCredentials)
        } else {
            info!("Setup cancelled by operator");
            Ok(EnrollmentStep::Cancelled)
        }
    }

    fn persist_config(&self, credentials: Credentials) -> Result<EnrollmentStep, EnrollmentError> {
        let store = self.ctx.credential_store();
        self.operator.notify(&format!("Creating {}", store.path().display()));
        store.persist(&self.ctx.initial_config_seed(), &credentials)?;
        Ok(EnrollmentStep::CaptureEncryptedCredential(credentials))
    }

    async fn capture_encrypted_credential(
        &self,
        credentials: Credentials,
    ) -> Result<EnrollmentStep, EnrollmentError> {
        let bootstrap = self.ctx.bootstrap_session_path();
        template_renderer::render(
            &self.ctx.console_server_seed(),
            &bootstrap,
            &[
                (USER, credentials.username.clone()),
                (CONTROLLER, credentials.controller.clone()),
                (COMMAND, DISCONNECT_COMMAND.to_string()),
            ],
        )?;
        info!("Created bootstrap session {}", bootstrap.display());

        self.operator
            .notify(&format!("Launching SecureCRT with {} session", BOOTSTRAP_SESSION_NAME));
        self.operator.notify(&format!(
            "Log in, let SecureCRT save the password, and close SecureCRT once the {} session disconnects",
            BOOTSTRAP_SESSION_NAME
        ));
        self.launcher
            .launch(
                &self.ctx.client_executable,
                &self.ctx.bootstrap_launch_args,
                self.ctx.client_timeout,
            )
            .await
            .map_err(|e| {
                error!("SecureCRT launch failed: {}", e);
                EnrollmentError::Process(e)
            })?;
        self.operator
            .acknowledge("Confirm the console server session has disconnected")?;

        Ok(EnrollmentStep::BuildNodeTemplate(credentials))
    }

    fn build_node_template(&self, credentials: Credentials) -> Result<EnrollmentStep, EnrollmentError> {
        let controller_dir = self.ctx.controller_dir(&credentials);
        fs::create_dir_all(&controller_dir).map_err(|e| {
            error!("Directory {} could not be created: {}", controller_dir.display(), e);
            GeneratorError::DirectoryCreation(controller_dir.clone(), e)
        })?;
        info!("Directory {} ready", controller_dir.display());

        let node_template = self.ctx.node_template_path(&credentials);
        template_renderer::render(
            &self.ctx.bootstrap_session_path(),
            &node_template,
            &[(DISCONNECT_COMMAND, connect_command(LAB_TITLE, NODE_LABEL))],
        )?;
        info!("Created node session template {}", node_template.display());
        Ok(EnrollmentStep::Cleanup(credentials))
    }

    fn cleanup(&self, credentials: Credentials) -> Result<EnrollmentStep, EnrollmentError> {
        let bootstrap = self.ctx.bootstrap_session_path();
        if !bootstrap.is_file() {
            error!("{} does not exist", bootstrap.display());
            return Err(EnrollmentError::BootstrapSessionMissing(bootstrap));
        }
        fs::remove_file(&bootstrap)
            .map_err(|e| TemplateError::WriteFailed(bootstrap.clone(), e))?;
        info!("Deleted {}", bootstrap.display());
        self.operator.notify("Node session template file generation complete");
        Ok(EnrollmentStep::Done(credentials))
    }
}
