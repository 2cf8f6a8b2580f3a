//! Greeting service and the `greet` command.

use std::sync::Arc;

use bootkit::{Binder, Command, CommandMetadata, CommandOutcome, ConfigSource, Module};
use clap::Parser;
use serde::Deserialize;

pub const SECTION: &str = "greeting";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GreetingConfig {
    pub salutation: String,
    pub name: String,
}

impl Default for GreetingConfig {
    fn default() -> Self {
        Self {
            salutation: "Hello".to_owned(),
            name: "world".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Greeter {
    config: GreetingConfig,
}

impl Greeter {
    #[must_use]
    pub fn new(config: GreetingConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn greet(&self, name: Option<&str>) -> String {
        let name = name.unwrap_or(&self.config.name);
        format!("{}, {name}!", self.config.salutation)
    }
}

#[derive(Debug, Parser)]
#[command(name = "greet", about = "Prints a greeting")]
struct GreetArgs {
    /// Who to greet (overrides `greeting.name`)
    #[arg(long)]
    name: Option<String>,

    /// Print in upper case
    #[arg(long)]
    shout: bool,
}

pub struct GreetCommand {
    greeter: Arc<Greeter>,
}

impl GreetCommand {
    pub const NAME: &'static str = "greet";
}

impl Command for GreetCommand {
    fn execute(&self, args: &[String]) -> anyhow::Result<CommandOutcome> {
        let argv = std::iter::once(Self::NAME).chain(args.iter().map(String::as_str));
        let args = match GreetArgs::try_parse_from(argv) {
            Ok(args) => args,
            Err(e) if !e.use_stderr() => {
                print!("{e}");
                return Ok(CommandOutcome::succeeded());
            }
            Err(e) => return Ok(CommandOutcome::failed(2, e.to_string())),
        };

        let mut line = self.greeter.greet(args.name.as_deref());
        if args.shout {
            line = line.to_uppercase();
        }
        println!("{line}");
        Ok(CommandOutcome::succeeded_with(line))
    }
}

#[derive(Default)]
pub struct GreetingModule;

impl Module for GreetingModule {
    fn configure(&self, binder: &mut Binder) {
        binder.bind_fn::<Greeter, _>(|inj| {
            let config = inj.get::<ConfigSource>()?;
            Ok(Arc::new(Greeter::new(config.section_or_default(SECTION)?)))
        });
        binder.declare_command(
            CommandMetadata::new(GreetCommand::NAME).with_description("Prints a greeting."),
            |inj| {
                Ok(GreetCommand {
                    greeter: inj.get::<Greeter>()?,
                })
            },
        );
    }
}

bootkit::register_module!(GreetingModule, name = "greeting");

#[cfg(test)]
mod tests {
    use super::*;
    use bootkit::testing::TestFactory;
    use bootkit::{Injector, ModuleCatalog};

    fn factory() -> TestFactory {
        TestFactory::with_discovery(Arc::new(ModuleCatalog::new().with(GreetingModule)))
    }

    #[test]
    fn greets_configured_name_by_default() {
        let greeter = Greeter::new(GreetingConfig::default());
        assert_eq!(greeter.greet(None), "Hello, world!");
        assert_eq!(greeter.greet(Some("Ada")), "Hello, Ada!");
    }

    #[test]
    fn greet_command_parses_its_own_arguments() {
        let outcome = factory()
            .app_with_args(["--greet", "--name", "Ada", "--shout"])
            .auto_load_modules()
            .run();
        assert_eq!(outcome.message(), Some("HELLO, ADA!"));
    }

    #[test]
    fn bad_arguments_fail_the_command() {
        let outcome = factory()
            .app_with_args(["--greet", "--volume=11"])
            .auto_load_modules()
            .run();
        assert!(!outcome.is_success());
        assert_eq!(outcome.exit_code(), 2);
    }

    #[test]
    fn server_flag_without_server_module_reaches_default_command() {
        let catalog = ModuleCatalog::new()
            .with(GreetingModule)
            .with(crate::modules::app::AppModule);
        let outcome = TestFactory::with_discovery(Arc::new(catalog))
            .app_with_args(["--server"])
            .auto_load_modules()
            .run();

        // `greet` is the default and does not know `--server`.
        assert!(!outcome.is_success());
        assert_eq!(outcome.exit_code(), 2);
        assert!(outcome.message().unwrap().contains("--server"), "got: {outcome}");
    }

    #[test]
    fn greeter_can_be_replaced_by_a_test_module() {
        let outcome = factory()
            .app_with_args(["--greet"])
            .auto_load_modules()
            .module(|b: &mut Binder| {
                b.bind_fn::<Greeter, _>(|_: &Injector| {
                    Ok(Arc::new(Greeter::new(GreetingConfig {
                        salutation: "Hi".to_owned(),
                        name: "tester".to_owned(),
                    })))
                });
            })
            .run();
        assert_eq!(outcome.message(), Some("Hi, tester!"));
    }
}
