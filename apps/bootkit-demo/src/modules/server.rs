//! A minimal TCP greeting server: each accepted connection receives one greeting line.

use std::io::Write;
use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context;
use bootkit::{Binder, Command, CommandMetadata, CommandOutcome, ConfigSource, Module};
use clap::Parser;
use serde::Deserialize;

use super::greeting::Greeter;

pub const SECTION: &str = "server";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_owned(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "server", about = "Starts the greeting server")]
struct ServerArgs {
    /// Address to bind (overrides `server.bind`)
    #[arg(long)]
    bind: Option<String>,

    /// Stop after serving this many connections
    #[arg(long)]
    max_connections: Option<usize>,
}

pub struct ServerCommand {
    config: ServerConfig,
    greeter: Arc<Greeter>,
}

impl ServerCommand {
    pub const NAME: &'static str = "server";
}

impl Command for ServerCommand {
    fn execute(&self, args: &[String]) -> anyhow::Result<CommandOutcome> {
        let args = ServerArgs::try_parse_from(
            std::iter::once(Self::NAME).chain(args.iter().map(String::as_str)),
        )?;
        let bind = args.bind.as_deref().unwrap_or(&self.config.bind);

        let listener = TcpListener::bind(bind).with_context(|| format!("binding {bind}"))?;
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "server listening");
        println!("listening on {addr}");

        let limit_reached = |served: usize| args.max_connections.is_some_and(|max| served >= max);
        let mut served = 0usize;
        while !limit_reached(served) {
            let (mut stream, peer) = listener.accept().context("accepting connection")?;
            if let Err(e) = writeln!(stream, "{}", self.greeter.greet(None)) {
                tracing::warn!(%peer, error = %e, "client went away");
            }
            served += 1;
        }

        Ok(CommandOutcome::succeeded_with(format!("served {served} connection(s)")))
    }
}

#[derive(Default)]
pub struct ServerModule;

impl Module for ServerModule {
    fn configure(&self, binder: &mut Binder) {
        binder.declare_command(
            CommandMetadata::new(ServerCommand::NAME).with_description("Starts the greeting server."),
            |inj| {
                let config = inj.get::<ConfigSource>()?;
                Ok(ServerCommand {
                    config: config.section_or_default(SECTION)?,
                    greeter: inj.get::<Greeter>()?,
                })
            },
        );
    }
}

bootkit::register_module!(ServerModule, name = "server", deps = ["greeting"]);
