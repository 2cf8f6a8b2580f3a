//! Commands: named units of application behavior resolved from the runtime.
//!
//! A command is a service bound under `ServiceKey::named::<dyn Command>(name)`. Exactly one
//! command runs per dispatch; its result is a [`CommandOutcome`].

mod dispatcher;
mod help;

pub use dispatcher::{CommandDispatcher, DispatchError, ResolvedCommand};
pub use help::HelpCommand;

use std::{fmt, process::ExitCode, sync::Arc};

/// An invocable command. Errors returned here never escape the dispatcher; they become a
/// failed outcome.
pub trait Command: Send + Sync {
    /// Run with the arguments left after command selection.
    ///
    /// # Errors
    /// Any failure; the dispatcher reports it as a failed [`CommandOutcome`].
    fn execute(&self, args: &[String]) -> anyhow::Result<CommandOutcome>;
}

impl<F> Command for F
where
    F: Fn(&[String]) -> anyhow::Result<CommandOutcome> + Send + Sync,
{
    fn execute(&self, args: &[String]) -> anyhow::Result<CommandOutcome> {
        self(args)
    }
}

/// Name and help text of a declared command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMetadata {
    name: Arc<str>,
    description: Option<String>,
}

impl CommandMetadata {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Exit code used for failures that carry no code of their own.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Uniform result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    success: bool,
    exit_code: i32,
    message: Option<String>,
}

impl CommandOutcome {
    #[must_use]
    pub fn succeeded() -> Self {
        Self {
            success: true,
            exit_code: 0,
            message: None,
        }
    }

    #[must_use]
    pub fn succeeded_with(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::succeeded()
        }
    }

    /// Failed outcome. A zero `exit_code` is replaced by [`FAILURE_EXIT_CODE`] so that a
    /// failure never maps to a successful process exit.
    #[must_use]
    pub fn failed(exit_code: i32, message: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: if exit_code == 0 {
                FAILURE_EXIT_CODE
            } else {
                exit_code
            },
            message: Some(message.into()),
        }
    }

    /// Failed outcome carrying the full error chain as its message.
    #[must_use]
    pub fn failed_with_error(exit_code: i32, error: &anyhow::Error) -> Self {
        Self::failed(exit_code, format!("{error:#}"))
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "success" } else { "failure" };
        match &self.message {
            Some(msg) => write!(f, "[{status}:{}] {msg}", self.exit_code),
            None => write!(f, "[{status}:{}]", self.exit_code),
        }
    }
}

impl CommandOutcome {
    /// Exit status as the OS sees it. Codes outside `1..=255` cannot be reported faithfully
    /// and fall back to [`FAILURE_EXIT_CODE`].
    #[must_use]
    pub fn process_exit_code(&self) -> u8 {
        if self.success {
            return 0;
        }
        match u8::try_from(self.exit_code) {
            Ok(code) if code != 0 => code,
            _ => 1,
        }
    }
}

impl From<&CommandOutcome> for ExitCode {
    fn from(outcome: &CommandOutcome) -> Self {
        ExitCode::from(outcome.process_exit_code())
    }
}

impl std::process::Termination for CommandOutcome {
    fn report(self) -> ExitCode {
        if !self.success
            && let Some(msg) = &self.message
        {
            eprintln!("Error: {msg}");
        }
        ExitCode::from(&self)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn failed_never_reports_zero() {
        let outcome = CommandOutcome::failed(0, "boom");
        assert!(!outcome.is_success());
        assert_eq!(outcome.exit_code(), FAILURE_EXIT_CODE);
        assert_eq!(outcome.message(), Some("boom"));
    }

    #[test]
    fn failed_with_error_keeps_context_chain() {
        let err = anyhow::anyhow!("socket closed").context("serving request");
        let outcome = CommandOutcome::failed_with_error(2, &err);
        assert_eq!(outcome.exit_code(), 2);
        assert_eq!(outcome.message(), Some("serving request: socket closed"));
    }

    #[test]
    fn display_includes_status_and_code() {
        assert_eq!(CommandOutcome::succeeded().to_string(), "[success:0]");
        assert_eq!(
            CommandOutcome::failed(4, "bad input").to_string(),
            "[failure:4] bad input"
        );
    }

    #[test]
    fn exit_code_conversion() {
        assert_eq!(CommandOutcome::succeeded().process_exit_code(), 0);
        assert_eq!(CommandOutcome::failed(7, "x").process_exit_code(), 7);
        assert_eq!(CommandOutcome::failed(1000, "x").process_exit_code(), 1);
        assert_eq!(CommandOutcome::failed(-3, "x").process_exit_code(), 1);
    }

    #[test]
    fn closures_are_commands() {
        let cmd = |args: &[String]| -> anyhow::Result<CommandOutcome> {
            Ok(CommandOutcome::succeeded_with(args.join(",")))
        };
        let outcome = cmd.execute(&["a".to_owned(), "b".to_owned()]).unwrap();
        assert_eq!(outcome.message(), Some("a,b"));
    }
}
