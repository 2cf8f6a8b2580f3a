use super::{CommandMetadata, CommandOutcome};
use crate::binding::Injector;
use crate::command::Command;

/// Lists declared commands. Bound as `help` by the core module.
#[derive(Debug, Clone)]
pub struct HelpCommand {
    commands: Vec<CommandMetadata>,
    default_command: Option<String>,
}

impl HelpCommand {
    pub const NAME: &'static str = "help";

    #[must_use]
    pub fn metadata() -> CommandMetadata {
        CommandMetadata::new(Self::NAME).with_description("Prints this message.")
    }

    #[must_use]
    pub fn from_injector(injector: &Injector) -> Self {
        Self {
            commands: injector.commands().to_vec(),
            default_command: injector.default_command().map(str::to_owned),
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        let width = self
            .commands
            .iter()
            .map(|c| c.name().len())
            .max()
            .unwrap_or(0);

        let lines: Vec<String> = std::iter::once("Commands:".to_owned())
            .chain(self.commands.iter().map(|cmd| {
                let marker = if self.default_command.as_deref() == Some(cmd.name()) {
                    " (default)"
                } else {
                    ""
                };
                format!(
                    "  --{:<width$}  {}{marker}",
                    cmd.name(),
                    cmd.description().unwrap_or_default(),
                )
            }))
            .collect();
        lines.join("\n") + "\n"
    }
}

impl Command for HelpCommand {
    fn execute(&self, _args: &[String]) -> anyhow::Result<CommandOutcome> {
        let text = self.render();
        print!("{text}");
        Ok(CommandOutcome::succeeded_with(text))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::binding::Binder;

    #[test]
    fn lists_commands_in_declaration_order_and_marks_default() {
        let mut binder = Binder::new();
        binder.declare_command(HelpCommand::metadata(), |inj| Ok(HelpCommand::from_injector(inj)));
        binder.declare_command(
            CommandMetadata::new("server").with_description("Starts the server."),
            |inj| Ok(HelpCommand::from_injector(inj)),
        );
        binder.set_default_command("server");
        let injector = binder.freeze();

        let text = HelpCommand::from_injector(&injector).render();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Commands:");
        assert_eq!(lines[1], "  --help    Prints this message.");
        assert_eq!(lines[2], "  --server  Starts the server. (default)");
    }

    #[test]
    fn render_is_complete_and_newline_terminated() {
        let mut binder = Binder::new();
        binder.declare_command(HelpCommand::metadata(), |inj| Ok(HelpCommand::from_injector(inj)));
        binder.declare_command(CommandMetadata::new("go"), |inj| Ok(HelpCommand::from_injector(inj)));
        let injector = binder.freeze();

        assert_eq!(
            HelpCommand::from_injector(&injector).render(),
            "Commands:\n  --help  Prints this message.\n  --go    \n"
        );
    }
}
