//! Main application entry point.
//!
//! ```ignore
//! fn main() -> bootkit::CommandOutcome {
//!     bootkit::Bootstrap::app(std::env::args().skip(1))
//!         .auto_load_modules()
//!         .exec()
//! }
//! ```

use std::sync::Arc;

use crate::builder::{BootError, RuntimeBuilder};
use crate::command::{CommandOutcome, FAILURE_EXIT_CODE};
use crate::discovery::ModuleDiscovery;
use crate::module::Module;
use crate::runtime::Runtime;

pub struct Bootstrap {
    builder: RuntimeBuilder,
}

impl Bootstrap {
    /// Start assembling an application from process arguments (program name excluded).
    #[must_use]
    pub fn app<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            builder: RuntimeBuilder::new().args(args),
        }
    }

    #[must_use]
    pub fn module<M: Module>(mut self, module: M) -> Self {
        self.builder.add_module(module);
        self
    }

    #[must_use]
    pub fn auto_load_modules(self) -> Self {
        Self {
            builder: self.builder.auto_load_modules(),
        }
    }

    #[must_use]
    pub fn discovery(self, discovery: Arc<dyn ModuleDiscovery>) -> Self {
        Self {
            builder: self.builder.discovery(discovery),
        }
    }

    /// Build without running anything.
    ///
    /// # Errors
    /// Construction errors, see [`RuntimeBuilder::build`].
    pub fn create_runtime(mut self) -> Result<Runtime, BootError> {
        self.builder.build()
    }

    /// Build and dispatch. Construction errors are reported as a failed outcome.
    #[must_use]
    pub fn exec(self) -> CommandOutcome {
        match self.create_runtime() {
            Ok(runtime) => runtime.run(),
            Err(e) => {
                tracing::error!(error = %e, "application failed to start");
                CommandOutcome::failed(FAILURE_EXIT_CODE, e.to_string())
            }
        }
    }
}
