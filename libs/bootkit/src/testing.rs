//! Test harness: fresh, isolated runtimes per test.
//!
//! Typical flow:
//!
//! ```ignore
//! let runtime = TestFactory::new()
//!     .app()
//!     .auto_load_modules()
//!     .module(|b: &mut Binder| b.bind_instance::<dyn Mailer>(Arc::new(FakeMailer::default())))
//!     .create_runtime()?;
//! ```
//!
//! Every `app()` call starts a new [`TestApp`] in the configuring state; `create_runtime` and
//! `run` consume it, so a configured app cannot be reused by accident. Nothing is shared between
//! apps except the (immutable) discovery source, so tests may run in parallel without locking.
//! Modules that need per-runtime state should create it inside `configure`.

use std::sync::Arc;

use crate::builder::{BootError, RuntimeBuilder};
use crate::command::{CommandOutcome, FAILURE_EXIT_CODE};
use crate::discovery::{InventoryDiscovery, ModuleDiscovery};
use crate::module::Module;
use crate::runtime::Runtime;

/// Factory of test apps. Cheap to create; one per test or shared across tests.
#[derive(Clone)]
pub struct TestFactory {
    discovery: Arc<dyn ModuleDiscovery>,
}

impl Default for TestFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFactory {
    /// Factory whose apps auto-load from `inventory` registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::with_discovery(Arc::new(InventoryDiscovery))
    }

    #[must_use]
    pub fn with_discovery(discovery: Arc<dyn ModuleDiscovery>) -> Self {
        Self { discovery }
    }

    /// A new app with no arguments.
    #[must_use]
    pub fn app(&self) -> TestApp {
        TestApp {
            builder: RuntimeBuilder::new().discovery(Arc::clone(&self.discovery)),
        }
    }

    /// A new app with the given process arguments.
    #[must_use]
    pub fn app_with_args<I, S>(&self, args: I) -> TestApp
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TestApp {
            builder: RuntimeBuilder::new()
                .args(args)
                .discovery(Arc::clone(&self.discovery)),
        }
    }
}

/// An app under construction for one test.
#[must_use]
pub struct TestApp {
    builder: RuntimeBuilder,
}

impl TestApp {
    pub fn auto_load_modules(self) -> Self {
        Self {
            builder: self.builder.auto_load_modules(),
        }
    }

    /// Add an ad hoc module; it runs after every auto-loaded module and can override them.
    pub fn module<M: Module>(self, module: M) -> Self {
        Self {
            builder: self.builder.module(module),
        }
    }

    /// Build without executing a command.
    ///
    /// # Errors
    /// Construction errors, see [`RuntimeBuilder::build`].
    pub fn create_runtime(mut self) -> Result<Runtime, BootError> {
        self.builder.build()
    }

    /// Build and dispatch the app's arguments. Always returns an outcome.
    pub fn run(self) -> CommandOutcome {
        match self.create_runtime() {
            Ok(runtime) => runtime.run(),
            Err(e) => CommandOutcome::failed(FAILURE_EXIT_CODE, e.to_string()),
        }
    }
}
