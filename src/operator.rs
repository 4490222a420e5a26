//! Everything the tool asks of, or tells, the person at the keyboard.
//!
//! The flows talk to an [`Operator`]; [`TerminalOperator`] backs it with
//! `dialoguer` prompts on the controlling terminal.

use dialoguer::console::Term;
use log::{debug, error};
use std::fmt;
use dialoguer::{Confirm, Input, Password};

use crate::error_handling::types::PromptError;

pub trait Operator {
    /// Free-text answer, trimmed. May be empty.
    fn input(&self, prompt: &str) -> Result<String, PromptError>;

    /// Hidden answer, trimmed. May be empty.
    fn password(&self, prompt: &str) -> Result<String, PromptError>;

    fn confirm(&self, prompt: &str) -> Result<bool, PromptError>;

    /// Shows `message` and waits for Enter.
    fn acknowledge(&self, message: &str) -> Result<(), PromptError>;

    fn notify(&self, message: &str);
}

/// Logs a fatal error and waits for the operator to acknowledge it.
pub fn report_fatal(operator: &dyn Operator, err: &dyn fmt::Display) {
    error!("{}", err);
    if let Err(e) = operator.acknowledge(&format!("ERROR: {}", err)) {
        debug!("Acknowledgement skipped: {}", e);
    }
}

pub struct TerminalOperator {
    term: Term,
}

impl TerminalOperator {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for TerminalOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for TerminalOperator {
    fn input(&self, prompt: &str) -> Result<String, PromptError> {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text_on(&self.term)?;
        Ok(answer.trim().to_string())
    }

    fn password(&self, prompt: &str) -> Result<String, PromptError> {
        let answer = Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact_on(&self.term)?;
        Ok(answer.trim().to_string())
    }

    fn confirm(&self, prompt: &str) -> Result<bool, PromptError> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact_on(&self.term)?)
    }

    fn acknowledge(&self, message: &str) -> Result<(), PromptError> {
        self.term.write_line(message)?;
        self.term.write_line("Press Enter to continue...")?;
        self.term.read_line()?;
        Ok(())
    }

    fn notify(&self, message: &str) {
        // Output failures on the terminal are not worth aborting a run for.
        let _ = self.term.write_line(message);
    }
}


#[cfg(test)]
mod tests {
    use super::scripted::{Answer, ScriptedOperator};
    use super::*;
    use crate::error_handling::types::PlatformError;

    #[test]
    fn test_report_fatal_waits_for_acknowledgement() {
        let operator = ScriptedOperator::new(vec![Answer::Ack]);
        report_fatal(&operator, &PlatformError::Unsupported("plan9"));
        assert!(operator.said("ERROR: Unsupported platform: plan9"));
        assert_eq!(operator.remaining(), 0);
    }

    #[test]
    fn test_report_fatal_survives_closed_terminal() {
        let operator = ScriptedOperator::new(vec![]);
        report_fatal(&operator, &PlatformError::ConfigDirUnknown);
        assert!(operator.said("SecureCRT configuration path was not found"));
    }
}
