//! Command resolution and execution.
//!
//! Selection rule: the first `--name` (or `--name=value`) token whose `name` is a declared
//! command wins; that token is removed and the remaining arguments go to the command. With no
//! such token the default command runs with all arguments. Otherwise the dispatch fails with
//! [`DispatchError::UnknownCommand`].
//!
//! [`CommandDispatcher::dispatch`] is the containment boundary: resolution errors, provider
//! errors, command errors and command panics all become a failed [`CommandOutcome`].

use std::panic::{self, AssertUnwindSafe};

use super::{Command, CommandOutcome, FAILURE_EXIT_CODE};
use crate::arguments::Arguments;
use crate::binding::Injector;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown command{}", quoted(.requested.as_deref()))]
    UnknownCommand { requested: Option<String> },
}

fn quoted(requested: Option<&str>) -> String {
    requested.map(|r| format!(" '{r}'")).unwrap_or_default()
}

/// A selected command name and the arguments it will receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Stateless dispatcher over a frozen injector.
#[derive(Clone, Copy)]
pub struct CommandDispatcher<'a> {
    injector: &'a Injector,
}

impl<'a> CommandDispatcher<'a> {
    #[must_use]
    pub fn new(injector: &'a Injector) -> Self {
        Self { injector }
    }

    /// Pick the command for `args` without running it.
    ///
    /// # Errors
    /// `DispatchError::UnknownCommand` when no token names a declared command and there is
    /// no usable default.
    pub fn resolve(&self, args: &Arguments) -> Result<ResolvedCommand, DispatchError> {
        let tokens = args.command_args();

        let selected = tokens.iter().enumerate().find_map(|(idx, token)| {
            let name = flag_name(token)?;
            self.injector.command(name).map(|_| (idx, name))
        });

        if let Some((idx, name)) = selected {
            let args = tokens
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, t)| t.clone())
                .collect();
            return Ok(ResolvedCommand {
                name: name.to_owned(),
                args,
            });
        }

        match self.injector.default_command() {
            Some(name) if self.injector.command(name).is_some() => Ok(ResolvedCommand {
                name: name.to_owned(),
                args: tokens.to_vec(),
            }),
            _ => Err(DispatchError::UnknownCommand {
                requested: tokens.iter().find_map(|t| flag_name(t)).map(str::to_owned),
            }),
        }
    }

    /// Resolve and run exactly one command. Never panics and never returns an error.
    #[must_use]
    pub fn dispatch(&self, args: &Arguments) -> CommandOutcome {
        let resolved = match self.resolve(args) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "command dispatch failed");
                return CommandOutcome::failed(FAILURE_EXIT_CODE, e.to_string());
            }
        };

        tracing::debug!(command = %resolved.name, args = ?resolved.args, "dispatching command");

        // Construction is lazy, so the factory and its providers run inside the guard as well.
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.run_command(&resolved))) {
            Ok(outcome) => outcome,
            Err(payload) => CommandOutcome::failed(
                FAILURE_EXIT_CODE,
                format!("command '{}' panicked: {}", resolved.name, panic_message(&*payload)),
            ),
        };

        if outcome.is_success() {
            tracing::debug!(command = %resolved.name, "command finished");
        } else {
            tracing::warn!(command = %resolved.name, outcome = %outcome, "command failed");
        }
        outcome
    }

    fn run_command(&self, resolved: &ResolvedCommand) -> CommandOutcome {
        let command = match self.injector.get_named::<dyn Command>(&resolved.name) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(command = %resolved.name, error = %e, "command could not be created");
                return CommandOutcome::failed(FAILURE_EXIT_CODE, e.to_string());
            }
        };

        match command.execute(&resolved.args) {
            Ok(outcome) => outcome,
            Err(e) => CommandOutcome::failed_with_error(FAILURE_EXIT_CODE, &e),
        }
    }
}

/// `name` from `--name` or `--name=value`; `None` for anything else.
fn flag_name(token: &str) -> Option<&str> {
    let rest = token.strip_prefix("--")?;
    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    (!name.is_empty()).then_some(name)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
