#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Override semantics: ordered module application with last-declaration-wins bindings.

use std::sync::Arc;

use bootkit::{Binder, BindingError, Module, RuntimeBuilder, ServiceKey};

trait Service: Send + Sync {
    fn implementation(&self) -> String;
}

struct Impl(String);

impl Service for Impl {
    fn implementation(&self) -> String {
        self.0.clone()
    }
}

/// Binds `Service` to an implementation tagged with the module name.
struct ServiceModule {
    name: String,
}

impl ServiceModule {
    fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Module for ServiceModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&self, binder: &mut Binder) {
        let tag = self.name.clone();
        binder.bind_fn::<dyn Service, _>(move |_| Ok(Arc::new(Impl(tag.clone()))));
    }
}

/// Module that declares nothing.
struct Quiet;

impl Module for Quiet {
    fn configure(&self, _binder: &mut Binder) {}
}

#[test]
fn a_then_b_resolves_to_b() {
    let runtime = RuntimeBuilder::new()
        .module(ServiceModule::new("ImplX"))
        .module(ServiceModule::new("ImplY"))
        .build()
        .unwrap();

    assert_eq!(runtime.get::<dyn Service>().unwrap().implementation(), "ImplY");
    assert_eq!(
        runtime
            .injector()
            .declared_by(&ServiceKey::of::<dyn Service>()),
        Some("ImplY")
    );
}

#[test]
fn last_declaring_module_wins_for_any_length() {
    for n in 1..=8 {
        let mut builder = RuntimeBuilder::new();
        for i in 0..n {
            builder.add_module(ServiceModule::new(format!("m{i}")));
            // Modules that declare nothing never disturb the winner.
            builder.add_module(Quiet);
        }
        let runtime = builder.build().unwrap();
        assert_eq!(
            runtime.get::<dyn Service>().unwrap().implementation(),
            format!("m{}", n - 1),
            "n = {n}"
        );
    }
}

#[test]
fn undeclared_key_is_a_missing_binding() {
    let runtime = RuntimeBuilder::new().module(Quiet).build().unwrap();
    assert!(matches!(
        runtime.get::<dyn Service>(),
        Err(BindingError::Missing { .. })
    ));
}

#[test]
fn building_twice_yields_equivalent_independent_runtimes() {
    let mut builder = RuntimeBuilder::new()
        .module(ServiceModule::new("a"))
        .module(|b: &mut Binder| b.bind_instance::<String>(Arc::new("value".to_owned())));

    let first = builder.build().unwrap();
    let second = builder.build().unwrap();

    assert_eq!(first.modules(), second.modules());
    assert_eq!(
        first.get::<dyn Service>().unwrap().implementation(),
        second.get::<dyn Service>().unwrap().implementation()
    );
    assert_eq!(first.get::<String>().unwrap(), second.get::<String>().unwrap());
    assert_eq!(first.injector().len(), second.injector().len());
}

#[test]
fn runtime_serves_concurrent_lookups() {
    let runtime = RuntimeBuilder::new()
        .module(ServiceModule::new("shared"))
        .build()
        .unwrap();

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..100 {
                    assert_eq!(
                        runtime.get::<dyn Service>().unwrap().implementation(),
                        "shared"
                    );
                }
            });
        }
    });
}
