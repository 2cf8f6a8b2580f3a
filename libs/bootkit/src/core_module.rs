//! Built-in bindings every runtime starts with.
//!
//! `CoreModule` is applied before any discovered or explicit module, so each of its bindings
//! can be overridden by application modules.

use std::sync::Arc;

use crate::arguments::Arguments;
use crate::binding::Binder;
use crate::command::HelpCommand;
use crate::config::{ConfigSource, EnvPrefix};
use crate::module::Module;

pub struct CoreModule {
    arguments: Arc<Arguments>,
}

impl CoreModule {
    pub const NAME: &'static str = "bootkit-core";

    #[must_use]
    pub fn new(arguments: Arc<Arguments>) -> Self {
        Self { arguments }
    }
}

impl Module for CoreModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn configure(&self, binder: &mut Binder) {
        binder.bind_instance::<Arguments>(Arc::clone(&self.arguments));
        binder.bind_instance::<EnvPrefix>(Arc::new(EnvPrefix::default()));
        binder.bind_fn::<ConfigSource, _>(|injector| {
            let args = injector.get::<Arguments>()?;
            let prefix = injector.get::<EnvPrefix>()?;
            Ok(Arc::new(ConfigSource::load(&args, &prefix.0)?))
        });
        binder.declare_command(HelpCommand::metadata(), |injector| {
            Ok(HelpCommand::from_injector(injector))
        });
    }
}
