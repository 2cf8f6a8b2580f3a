//! Runtime assembly.
//!
//! Application order is always: core module, then discovered modules (discovery order) then
//! explicit modules (in `add_module` order). Explicit modules therefore override discovered
//! ones no matter whether `auto_load_modules` was called before or after `add_module`.
//!
//! `configure` calls run sequentially on the calling thread; there is no parallel module
//! initialization.

use std::sync::Arc;

use crate::arguments::Arguments;
use crate::binding::Binder;
use crate::config::ConfigError;
use crate::core_module::CoreModule;
use crate::discovery::{DiscoveryError, InventoryDiscovery, ModuleDiscovery};
use crate::module::Module;
use crate::runtime::Runtime;

#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("module discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("invalid arguments: {0}")]
    Arguments(#[source] ConfigError),
}

pub struct RuntimeBuilder {
    arguments: Arc<Arguments>,
    discovery: Arc<dyn ModuleDiscovery>,
    auto_load: bool,
    /// Filled by the first `build` after `auto_load_modules`; discovery runs once per builder.
    discovered: Option<Vec<Arc<dyn Module>>>,
    explicit: Vec<Arc<dyn Module>>,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    /// Builder with no arguments and `inventory` discovery.
    #[must_use]
    pub fn new() -> Self {
        Self {
            arguments: Arc::new(Arguments::default()),
            discovery: Arc::new(InventoryDiscovery),
            auto_load: false,
            discovered: None,
            explicit: Vec::new(),
        }
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = Arc::new(Arguments::new(args));
        self
    }

    /// Replace the discovery source used by [`RuntimeBuilder::auto_load_modules`].
    #[must_use]
    pub fn discovery(mut self, discovery: Arc<dyn ModuleDiscovery>) -> Self {
        self.discovery = discovery;
        self.discovered = None;
        self
    }

    /// Include every discoverable module, ahead of all explicit modules.
    #[must_use]
    pub fn auto_load_modules(mut self) -> Self {
        self.auto_load = true;
        self
    }

    #[must_use]
    pub fn module<M: Module>(mut self, module: M) -> Self {
        self.add_module(module);
        self
    }

    /// Append an explicit module; it runs after all discovered modules.
    pub fn add_module<M: Module>(&mut self, module: M) -> &mut Self {
        self.explicit.push(Arc::new(module));
        self
    }

    /// Apply all modules to a fresh binder and freeze it into a new [`Runtime`].
    ///
    /// May be called repeatedly; every call yields an independent runtime.
    ///
    /// # Errors
    /// `BootError::Arguments` if a `--config` option has no path; `BootError::Discovery` if
    /// auto-loading was requested and discovery fails. No module has been configured at that
    /// point in either case.
    pub fn build(&mut self) -> Result<Runtime, BootError> {
        if self.arguments.config_value_missing() {
            return Err(BootError::Arguments(ConfigError::MissingValue));
        }

        let discovered: &[Arc<dyn Module>] = if self.auto_load {
            if self.discovered.is_none() {
                self.discovered = Some(self.discovery.discover_modules()?);
            }
            self.discovered.as_deref().unwrap_or_default()
        } else {
            &[]
        };

        let core: Arc<dyn Module> = Arc::new(CoreModule::new(Arc::clone(&self.arguments)));
        let modules = std::iter::once(&core)
            .chain(discovered)
            .chain(&self.explicit);

        let mut binder = Binder::new();
        let mut applied = Vec::new();
        for module in modules {
            tracing::debug!(module = module.name(), "configuring module");
            binder.enter_module(module.name());
            module.configure(&mut binder);
            applied.push(module.name().to_owned());
        }

        let injector = binder.freeze();
        tracing::info!(
            modules = applied.len(),
            bindings = injector.len(),
            "runtime built"
        );
        Ok(Runtime::new(injector, applied, Arc::clone(&self.arguments)))
    }
}
