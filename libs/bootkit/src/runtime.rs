//! The assembled application.

use std::{fmt, sync::Arc};

use crate::arguments::Arguments;
use crate::binding::{BindingError, Injector};
use crate::command::{CommandDispatcher, CommandOutcome};
use crate::config::ConfigSource;

/// Immutable, fully resolved container produced by `RuntimeBuilder::build`.
///
/// Owns its frozen bindings exclusively; lookups are `&self` and safe from many threads.
pub struct Runtime {
    injector: Injector,
    modules: Vec<String>,
    arguments: Arc<Arguments>,
}

impl Runtime {
    pub(crate) fn new(injector: Injector, modules: Vec<String>, arguments: Arc<Arguments>) -> Self {
        Self {
            injector,
            modules,
            arguments,
        }
    }

    /// Resolve the unqualified binding for `T`.
    ///
    /// # Errors
    /// `BindingError::Missing` if nothing declared `T`, or the provider's failure.
    pub fn get<T>(&self) -> Result<Arc<T>, BindingError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.injector.get::<T>()
    }

    /// Resolve the binding for `T` under `qualifier`.
    ///
    /// # Errors
    /// See [`Runtime::get`].
    pub fn get_named<T>(&self, qualifier: &str) -> Result<Arc<T>, BindingError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.injector.get_named::<T>(qualifier)
    }

    /// Shortcut for the bound [`ConfigSource`].
    ///
    /// # Errors
    /// See [`Runtime::get`]; a missing `--config` file surfaces here.
    pub fn config(&self) -> Result<Arc<ConfigSource>, BindingError> {
        self.get::<ConfigSource>()
    }

    #[must_use]
    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    /// Module names in the order they were applied (core module first).
    #[must_use]
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    #[must_use]
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Dispatch the command selected by the runtime's own arguments.
    #[must_use]
    pub fn run(&self) -> CommandOutcome {
        CommandDispatcher::new(&self.injector).dispatch(&self.arguments)
    }

    /// Dispatch against different arguments, e.g. to run a second command on the same runtime.
    #[must_use]
    pub fn run_with<I, S>(&self, args: I) -> CommandOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandDispatcher::new(&self.injector).dispatch(&Arguments::new(args))
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("modules", &self.modules)
            .field("arguments", &self.arguments)
            .field("injector", &self.injector)
            .finish()
    }
}
