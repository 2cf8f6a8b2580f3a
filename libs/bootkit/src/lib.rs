//! # BootKit
//!
//! Applications assembled at startup from independently authored modules.
//!
//! - **Modules** contribute bindings (service providers and commands) to a shared [`Binder`].
//! - **Auto-discovery**: modules registered with [`register_module!`] are found via `inventory`.
//! - **Override semantics**: modules are applied in order and the last declaration of a key
//!   wins; explicitly added modules always run after auto-loaded ones.
//! - **Runtime**: the frozen result; resolves services and dispatches exactly one command
//!   selected from the process arguments.
//! - **Testing**: [`testing::TestFactory`] builds fresh, isolated runtimes per test with ad hoc
//!   overriding modules.
//!
//! ```ignore
//! #[derive(Default)]
//! pub struct GreetingModule;
//!
//! impl bootkit::Module for GreetingModule {
//!     fn configure(&self, binder: &mut bootkit::Binder) {
//!         binder.declare_command(CommandMetadata::new("greet"), |_| Ok(GreetCommand));
//!     }
//! }
//!
//! bootkit::register_module!(GreetingModule, name = "greeting");
//!
//! fn main() -> bootkit::CommandOutcome {
//!     bootkit::Bootstrap::app(std::env::args().skip(1))
//!         .auto_load_modules()
//!         .exec()
//! }
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Re-export inventory for the registration macro
pub use inventory;

pub mod arguments;
pub mod binding;
pub mod bootstrap;
pub mod builder;
pub mod command;
pub mod config;
pub mod core_module;
pub mod discovery;
pub mod module;
pub mod runtime;
pub mod telemetry;
pub mod testing;

pub use arguments::Arguments;
pub use binding::{Binder, BindingError, Injector, Provider, ServiceKey};
pub use bootstrap::Bootstrap;
pub use builder::{BootError, RuntimeBuilder};
pub use command::{Command, CommandDispatcher, CommandMetadata, CommandOutcome, DispatchError};
pub use config::{ConfigError, ConfigSource, EnvPrefix};
pub use discovery::{DiscoveryError, InventoryDiscovery, ModuleCatalog, ModuleDiscovery};
pub use module::Module;
pub use runtime::Runtime;
