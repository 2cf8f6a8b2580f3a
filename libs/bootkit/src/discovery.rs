//! Module discovery.
//!
//! A discovery source is a pure query returning modules in a stable order:
//! - [`InventoryDiscovery`] enumerates link-time registrations (`register_module!`). Link order
//!   is not stable, so registrations are sorted by name first.
//! - [`ModuleCatalog`] is an explicit plugin list, kept in insertion order.
//!
//! Both then apply dependency ordering: a module is moved after every module named in its
//! `deps`, ties keep the base order. A dependency on a module that is not present is ignored
//! (module sets legitimately differ between builds).

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::module::{Module, Registered, registrations};

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("module '{name}' is registered more than once")]
    DuplicateModule { name: String },

    #[error("module dependency cycle among: {}", modules.join(", "))]
    DependencyCycle { modules: Vec<String> },

    #[error("module catalog unavailable: {source:#}")]
    Catalog {
        #[source]
        source: anyhow::Error,
    },
}

/// Source of auto-loaded modules.
pub trait ModuleDiscovery: Send + Sync {
    /// Enumerate modules in application order.
    ///
    /// # Errors
    /// Any `DiscoveryError`; it aborts runtime construction before any module runs.
    fn discover_modules(&self) -> Result<Vec<Arc<dyn Module>>, DiscoveryError>;
}

/// Discovery over `inventory` registrations linked into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct InventoryDiscovery;

impl ModuleDiscovery for InventoryDiscovery {
    fn discover_modules(&self) -> Result<Vec<Arc<dyn Module>>, DiscoveryError> {
        let mut regs: Vec<_> = registrations().collect();
        regs.sort_by_key(|r| r.name);

        let entries = regs
            .into_iter()
            .map(|r| Entry {
                name: r.name.to_owned(),
                deps: r.deps.iter().map(|d| (*d).to_owned()).collect(),
                module: Arc::new(Registered {
                    name: r.name,
                    inner: (r.constructor)(),
                }) as Arc<dyn Module>,
            })
            .collect();

        let ordered = order_by_dependencies(entries)?;
        tracing::debug!(
            modules = ?ordered.iter().map(|m| m.name()).collect::<Vec<_>>(),
            "discovered registered modules"
        );
        Ok(ordered)
    }
}

/// Explicit, in-code list of modules.
#[derive(Default, Clone)]
pub struct ModuleCatalog {
    entries: Vec<Entry>,
}

impl ModuleCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<M: Module>(self, module: M) -> Self {
        self.with_deps(module, &[])
    }

    /// Add a module that must come after each module named in `deps`.
    #[must_use]
    pub fn with_deps<M: Module>(mut self, module: M, deps: &[&str]) -> Self {
        self.entries.push(Entry {
            name: module.name().to_owned(),
            deps: deps.iter().map(|d| (*d).to_owned()).collect(),
            module: Arc::new(module),
        });
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ModuleDiscovery for ModuleCatalog {
    fn discover_modules(&self) -> Result<Vec<Arc<dyn Module>>, DiscoveryError> {
        order_by_dependencies(self.entries.clone())
    }
}

#[derive(Clone)]
struct Entry {
    name: String,
    deps: Vec<String>,
    module: Arc<dyn Module>,
}

/// Stable topological sort (Kahn): among ready modules the one earliest in the input wins.
fn order_by_dependencies(entries: Vec<Entry>) -> Result<Vec<Arc<dyn Module>>, DiscoveryError> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(entries.len());
    for (i, e) in entries.iter().enumerate() {
        if index.insert(e.name.as_str(), i).is_some() {
            return Err(DiscoveryError::DuplicateModule {
                name: e.name.clone(),
            });
        }
    }

    let mut pending = vec![0usize; entries.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
    for (i, e) in entries.iter().enumerate() {
        for dep in &e.deps {
            match index.get(dep.as_str()) {
                Some(&d) => {
                    pending[i] += 1;
                    dependents[d].push(i);
                }
                None => tracing::warn!(
                    module = %e.name,
                    dependency = %dep,
                    "dependency not present; ignoring"
                ),
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..entries.len()).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(entries.len());
    while let Some(i) = ready.pop_first() {
        order.push(i);
        for &next in &dependents[i] {
            pending[next] -= 1;
            if pending[next] == 0 {
                ready.insert(next);
            }
        }
    }

    if order.len() != entries.len() {
        let modules = (0..entries.len())
            .filter(|i| pending[*i] > 0)
            .map(|i| entries[i].name.clone())
            .collect();
        return Err(DiscoveryError::DependencyCycle { modules });
    }

    Ok(order
        .into_iter()
        .map(|i| Arc::clone(&entries[i].module))
        .collect())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::binding::Binder;

    struct Named(&'static str);
    impl Module for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn configure(&self, _binder: &mut Binder) {}
    }

    fn names(modules: &[Arc<dyn Module>]) -> Vec<&str> {
        modules.iter().map(|m| m.name()).collect()
    }

    #[test]
    fn catalog_keeps_insertion_order_without_deps() {
        let catalog = ModuleCatalog::new()
            .with(Named("c"))
            .with(Named("a"))
            .with(Named("b"));
        assert_eq!(names(&catalog.discover_modules().unwrap()), ["c", "a", "b"]);
    }

    #[test]
    fn dependents_move_after_their_dependencies() {
        let catalog = ModuleCatalog::new()
            .with_deps(Named("app"), &["db", "web"])
            .with(Named("web"))
            .with_deps(Named("db"), &["config"])
            .with(Named("config"));
        assert_eq!(
            names(&catalog.discover_modules().unwrap()),
            ["web", "config", "db", "app"]
        );
    }

    #[test]
    fn missing_dependency_is_ignored() {
        let catalog = ModuleCatalog::new()
            .with_deps(Named("server"), &["jersey"])
            .with(Named("core"));
        assert_eq!(names(&catalog.discover_modules().unwrap()), ["server", "core"]);
    }

    #[test]
    fn cycle_is_reported() {
        let catalog = ModuleCatalog::new()
            .with_deps(Named("a"), &["b"])
            .with_deps(Named("b"), &["a"])
            .with(Named("c"));
        match catalog.discover_modules() {
            Err(DiscoveryError::DependencyCycle { modules }) => assert_eq!(modules, ["a", "b"]),
            Err(other) => panic!("expected cycle, got {other}"),
            Ok(_) => panic!("expected cycle"),
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let catalog = ModuleCatalog::new().with(Named("a")).with(Named("a"));
        assert!(matches!(
            catalog.discover_modules(),
            Err(DiscoveryError::DuplicateModule { name }) if name == "a"
        ));
    }

    #[test]
    fn empty_catalog_discovers_nothing() {
        assert!(ModuleCatalog::new().discover_modules().unwrap().is_empty());
    }
}
