use bootkit::{Binder, Module};

use super::greeting::GreetCommand;

/// Application-level choices layered over the feature modules.
#[derive(Default)]
pub struct AppModule;

impl Module for AppModule {
    fn configure(&self, binder: &mut Binder) {
        binder.set_default_command(GreetCommand::NAME);
    }
}

bootkit::register_module!(AppModule, name = "app", deps = ["greeting"]);
