mod modules;

use bootkit::command::FAILURE_EXIT_CODE;
use bootkit::telemetry::{LOGGING_SECTION, LoggingConfig, init_logging};
use bootkit::{Bootstrap, CommandOutcome, Runtime};

fn main() -> CommandOutcome {
    let runtime = match Bootstrap::app(std::env::args().skip(1))
        .auto_load_modules()
        .create_runtime()
    {
        Ok(runtime) => runtime,
        Err(e) => return CommandOutcome::failed(FAILURE_EXIT_CODE, e.to_string()),
    };

    // Logging is driven by configuration, so it can only start once the runtime exists.
    let logging = match logging_config(&runtime) {
        Ok(cfg) => cfg,
        Err(e) => return CommandOutcome::failed_with_error(FAILURE_EXIT_CODE, &e),
    };
    let installed = init_logging(&logging);

    tracing::info!(modules = ?runtime.modules(), installed, "bootkit-demo starting");
    runtime.run()
}

fn logging_config(runtime: &Runtime) -> anyhow::Result<LoggingConfig> {
    let config = runtime.config()?;
    Ok(config.section_or_default(LOGGING_SECTION)?)
}
