//! Type-keyed bindings contributed by modules.
//!
//! Two halves of one registry:
//! - [`Binder`] is the mutable, accumulate-only side handed to `Module::configure`.
//!   Declaring a key that already exists replaces the previous binding (last write wins).
//! - [`Injector`] is the frozen snapshot produced by [`Binder::freeze`]. It is immutable,
//!   `Send + Sync`, and owned by exactly one `Runtime`.
//!
//! Implementation details:
//! - Key = (type name, optional qualifier). We use `type_name::<T>()`, which works for `T = dyn Trait`.
//! - Value = `Provider<T>` stored as `Box<dyn Any + Send + Sync>` (downcast on read).
//! - A provider is a factory, not an instance; it is invoked on every lookup and may pull
//!   its own dependencies from the injector.

use std::{any::Any, collections::HashMap, fmt, sync::Arc};

use crate::command::{Command, CommandMetadata};

/// Stable type key for trait objects, from the fully-qualified `type_name::<T>()`.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct TypeKey(&'static str);

impl TypeKey {
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeKey(std::any::type_name::<T>())
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Address of a binding: the service type plus an optional qualifier.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct ServiceKey {
    type_key: TypeKey,
    qualifier: Option<Arc<str>>,
}

impl ServiceKey {
    /// Unqualified key for `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_key: TypeKey::of::<T>(),
            qualifier: None,
        }
    }

    /// Key for `T` qualified by `name` (e.g. one command among many `dyn Command`).
    #[must_use]
    pub fn named<T: ?Sized + 'static>(name: impl Into<Arc<str>>) -> Self {
        Self {
            type_key: TypeKey::of::<T>(),
            qualifier: Some(name.into()),
        }
    }

    #[must_use]
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    #[must_use]
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            None => write!(f, "{:?}", self.type_key),
            Some(q) => write!(f, "{:?}#{q}", self.type_key),
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("no binding declared for {key}")]
    Missing { key: ServiceKey },

    #[error("type mismatch in bindings for {key}")]
    TypeMismatch { key: ServiceKey },

    #[error("provider for {key} failed: {source:#}")]
    Provision {
        key: ServiceKey,
        #[source]
        source: anyhow::Error,
    },
}

type ProviderFn<T> = dyn Fn(&Injector) -> anyhow::Result<Arc<T>> + Send + Sync;

/// Factory capability producing instances of `T` on demand.
pub struct Provider<T: ?Sized> {
    factory: Arc<ProviderFn<T>>,
}

impl<T: ?Sized> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<T: ?Sized + 'static> Provider<T> {
    /// Provider backed by a factory closure. The closure receives the frozen injector so it
    /// can resolve its own dependencies.
    pub fn from_fn<F>(factory: F) -> Self
    where
        F: Fn(&Injector) -> anyhow::Result<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Provider that hands out clones of one shared instance.
    pub fn instance(instance: Arc<T>) -> Self
    where
        T: Send + Sync,
    {
        Self::from_fn(move |_| Ok(Arc::clone(&instance)))
    }

    /// Produce an instance.
    ///
    /// # Errors
    /// Propagates whatever the factory returns.
    pub fn provide(&self, injector: &Injector) -> anyhow::Result<Arc<T>> {
        (self.factory)(injector)
    }
}

struct Binding {
    provider: Box<dyn Any + Send + Sync>,
    module: Arc<str>,
}

/// Mutable side of the registry, passed to `Module::configure`.
pub struct Binder {
    bindings: HashMap<ServiceKey, Binding>,
    commands: Vec<CommandMetadata>,
    default_command: Option<Arc<str>>,
    current_module: Arc<str>,
}

impl Binder {
    pub(crate) fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            commands: Vec::new(),
            default_command: None,
            current_module: Arc::from("<root>"),
        }
    }

    /// Attribute subsequent declarations to `module` (used in logs and introspection).
    pub(crate) fn enter_module(&mut self, module: &str) {
        self.current_module = Arc::from(module);
    }

    /// Register or override the unqualified binding for `T`. Never fails.
    pub fn declare<T>(&mut self, provider: Provider<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.insert(ServiceKey::of::<T>(), provider);
    }

    /// Register or override the binding for `T` under `qualifier`.
    pub fn declare_named<T>(&mut self, qualifier: impl Into<Arc<str>>, provider: Provider<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.insert(ServiceKey::named::<T>(qualifier), provider);
    }

    /// Bind `T` to a single shared instance.
    pub fn bind_instance<T>(&mut self, instance: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.declare(Provider::instance(instance));
    }

    /// Bind `T` to a factory closure.
    pub fn bind_fn<T, F>(&mut self, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Injector) -> anyhow::Result<Arc<T>> + Send + Sync + 'static,
    {
        self.declare(Provider::from_fn(factory));
    }

    /// Declare a command. Re-declaring a name overrides both the factory and the metadata,
    /// keeping the command's original position in listings.
    pub fn declare_command<C, F>(&mut self, metadata: CommandMetadata, factory: F)
    where
        C: Command + 'static,
        F: Fn(&Injector) -> anyhow::Result<C> + Send + Sync + 'static,
    {
        let provider: Provider<dyn Command> =
            Provider::from_fn(move |injector| Ok(Arc::new(factory(injector)?) as Arc<dyn Command>));
        self.declare_named::<dyn Command>(Arc::clone(metadata.name_arc()), provider);

        match self
            .commands
            .iter_mut()
            .find(|existing| existing.name() == metadata.name())
        {
            Some(existing) => *existing = metadata,
            None => self.commands.push(metadata),
        }
    }

    /// Command dispatched when the arguments select none. Last call wins.
    pub fn set_default_command(&mut self, name: impl Into<Arc<str>>) {
        self.default_command = Some(name.into());
    }

    #[must_use]
    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.bindings.contains_key(key)
    }

    /// Consume the binder into its immutable snapshot.
    #[must_use]
    pub fn freeze(self) -> Injector {
        Injector {
            bindings: self.bindings,
            commands: self.commands,
            default_command: self.default_command,
        }
    }

    fn insert<T>(&mut self, key: ServiceKey, provider: Provider<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let binding = Binding {
            provider: Box::new(provider),
            module: Arc::clone(&self.current_module),
        };
        if let Some(previous) = self.bindings.insert(key.clone(), binding) {
            tracing::debug!(
                key = %key,
                previous = %previous.module,
                module = %self.current_module,
                "binding overridden"
            );
        }
    }
}

/// Frozen, read-only view of all bindings.
pub struct Injector {
    bindings: HashMap<ServiceKey, Binding>,
    commands: Vec<CommandMetadata>,
    default_command: Option<Arc<str>>,
}

impl Injector {
    /// Provider bound to `key`; `T` must be the type the key was declared with.
    ///
    /// # Errors
    /// `BindingError::Missing` if the key was never declared, `TypeMismatch` if `T` is wrong.
    pub fn provider<T>(&self, key: &ServiceKey) -> Result<Provider<T>, BindingError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let binding = self
            .bindings
            .get(key)
            .ok_or_else(|| BindingError::Missing { key: key.clone() })?;

        binding
            .provider
            .downcast_ref::<Provider<T>>()
            .cloned()
            .ok_or_else(|| BindingError::TypeMismatch { key: key.clone() })
    }

    /// Resolve an instance of `T` from its unqualified binding.
    ///
    /// # Errors
    /// See [`Injector::provider`]; provider failures surface as `BindingError::Provision`.
    pub fn get<T>(&self) -> Result<Arc<T>, BindingError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve(&ServiceKey::of::<T>())
    }

    /// Resolve an instance of `T` bound under `qualifier`.
    ///
    /// # Errors
    /// See [`Injector::get`].
    pub fn get_named<T>(&self, qualifier: &str) -> Result<Arc<T>, BindingError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve(&ServiceKey::named::<T>(qualifier))
    }

    fn resolve<T>(&self, key: &ServiceKey) -> Result<Arc<T>, BindingError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.provider::<T>(key)?
            .provide(self)
            .map_err(|source| BindingError::Provision {
                key: key.clone(),
                source,
            })
    }

    #[must_use]
    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.bindings.contains_key(key)
    }

    /// Name of the module whose declaration is active for `key`.
    #[must_use]
    pub fn declared_by(&self, key: &ServiceKey) -> Option<&str> {
        self.bindings.get(key).map(|b| &*b.module)
    }

    /// Declared commands, in first-declaration order.
    #[must_use]
    pub fn commands(&self) -> &[CommandMetadata] {
        &self.commands
    }

    #[must_use]
    pub fn command(&self, name: &str) -> Option<&CommandMetadata> {
        self.commands.iter().find(|c| c.name() == name)
    }

    #[must_use]
    pub fn default_command(&self) -> Option<&str> {
        self.default_command.as_deref()
    }

    /// Introspection: (total bindings).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("bindings", &self.bindings.keys().collect::<Vec<_>>())
            .field("commands", &self.commands)
            .field("default_command", &self.default_command)
            .finish()
    }
}
