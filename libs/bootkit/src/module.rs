//! Modules: independently authored units of configuration.
//!
//! A module contributes bindings in [`Module::configure`]. Modules that should be picked up by
//! auto-loading register themselves at link time with [`register_module!`](crate::register_module);
//! whether a module is present therefore depends on which crates and features the final binary
//! links, and an absent module is simply not discovered.

use crate::binding::Binder;

/// Unit of configuration. `configure` runs once per `RuntimeBuilder::build` and must be
/// idempotent: building twice from the same modules must produce equivalent runtimes.
pub trait Module: Send + Sync + 'static {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn configure(&self, binder: &mut Binder);
}

/// Ad hoc modules: `builder.module(|b: &mut Binder| b.bind_instance(...))`.
impl<F> Module for F
where
    F: Fn(&mut Binder) + Send + Sync + 'static,
{
    fn configure(&self, binder: &mut Binder) {
        self(binder);
    }
}

/// Link-time registration record collected by `inventory`.
pub struct ModuleRegistration {
    pub name: &'static str,
    /// Modules this one must be configured after (so it can override their bindings).
    pub deps: &'static [&'static str],
    pub constructor: fn() -> Box<dyn Module>,
}

inventory::collect!(ModuleRegistration);

/// Iterate every module registration linked into the current binary.
pub fn registrations() -> impl Iterator<Item = &'static ModuleRegistration> {
    inventory::iter::<ModuleRegistration>.into_iter()
}

/// Module wrapper that reports the registration name instead of the Rust type name.
pub(crate) struct Registered {
    pub(crate) name: &'static str,
    pub(crate) inner: Box<dyn Module>,
}

impl Module for Registered {
    fn name(&self) -> &str {
        self.name
    }

    fn configure(&self, binder: &mut Binder) {
        self.inner.configure(binder);
    }
}

/// Register a module type for auto-loading.
///
/// The type must implement [`Module`] and [`Default`].
///
/// ```ignore
/// #[derive(Default)]
/// pub struct GreetingModule;
/// impl bootkit::Module for GreetingModule { /* ... */ }
///
/// bootkit::register_module!(GreetingModule, name = "greeting");
/// bootkit::register_module!(AppModule, name = "app", deps = ["greeting"]);
/// ```
#[macro_export]
macro_rules! register_module {
    ($ty:ty, name = $name:literal $(, deps = [$($dep:literal),* $(,)?])? $(,)?) => {
        $crate::inventory::submit! {
            $crate::module::ModuleRegistration {
                name: $name,
                deps: &[$($($dep),*)?],
                constructor: {
                    fn construct() -> ::std::boxed::Box<dyn $crate::module::Module> {
                        ::std::boxed::Box::new(<$ty as ::std::default::Default>::default())
                    }
                    construct
                },
            }
        }
    };
}
