/// Injector facade tests: child injectors, members injection and deferred handles

use saber_di::{
    DependencyResolver, DiError, DiResult, Injectable, Injector, Key, Lazy, ProviderRegistry, ResolverExt,
    TypedProvider,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

// ===== Test Services =====

struct Config {
    name: String,
}

struct Service {
    config: Arc<Config>,
}

fn root_component(registry: &mut ProviderRegistry) -> DiResult<()> {
    registry.register_instance(Key::of_type::<Config>(), Config { name: "root".to_string() })?;
    registry.register_factory(Key::of_type::<Service>(), |resolver: &dyn DependencyResolver| {
        Ok(Service {
            config: resolver.instance_of::<Config>()?,
        })
    })
}

fn empty(_: &mut ProviderRegistry) -> DiResult<()> {
    Ok(())
}

// ===== Child Injectors =====

#[test]
fn test_child_resolves_parent_providers() {
    let root = Injector::new(&root_component).unwrap();
    let child = root.create_child_injector(&empty).unwrap();

    assert_eq!(child.instance_of::<Service>().unwrap().config.name, "root");
    assert!(child.parent().map_or(false, |p| p.ptr_eq(&root)));
    assert!(root.parent().is_none());
}

#[test]
fn test_parent_providers_see_child_overrides() {
    let root = Injector::new(&root_component).unwrap();
    let child = root
        .create_child_injector(&|registry: &mut ProviderRegistry| {
            registry.register_instance(Key::of_type::<Config>(), Config { name: "child".to_string() })
        })
        .unwrap();

    assert_eq!(child.instance_of::<Service>().unwrap().config.name, "child");
    assert_eq!(root.instance_of::<Service>().unwrap().config.name, "root");
}

#[test]
fn test_missing_key_is_not_found() {
    let root = Injector::new(&empty).unwrap();
    let child = root.create_child_injector(&empty).unwrap();

    match child.instance_of::<Config>() {
        Err(DiError::ProviderNotFound(key)) => assert_eq!(key, Key::of_type::<Config>()),
        other => panic!("expected a missing provider, got {:?}", other.err()),
    }
}

#[test]
fn test_factories_can_ask_for_the_current_injector() {
    let root = Injector::new(&|registry: &mut ProviderRegistry| {
        registry.register_factory(Key::of_type::<usize>(), |resolver: &dyn DependencyResolver| {
            let injector = resolver.instance_of::<Injector>()?;
            Ok(if injector.parent().is_some() { 1usize } else { 0usize })
        })
    })
    .unwrap();
    let child = root.create_child_injector(&empty).unwrap();

    assert_eq!(*root.instance_of::<usize>().unwrap(), 0);
    assert_eq!(*child.instance_of::<usize>().unwrap(), 1);
}

// ===== Members Injection =====

#[derive(Default)]
struct Screen {
    service: Option<Arc<Service>>,
    title: Option<Arc<String>>,
}

impl Injectable for Screen {
    fn inject_members(&mut self, resolver: &dyn DependencyResolver) -> DiResult<()> {
        self.service = Some(resolver.instance_of::<Service>()?);
        self.title = Some(resolver.instance(&Key::named::<String>("title"))?);
        Ok(())
    }
}

#[test]
fn test_inject_members_fills_fields() {
    let injector = Injector::new(&|registry: &mut ProviderRegistry| {
        root_component(registry)?;
        registry.register_instance(Key::named::<String>("title"), "Home".to_string())
    })
    .unwrap();

    let mut screen = Screen::default();
    injector.inject_members(&mut screen).unwrap();

    assert_eq!(screen.service.map(|s| s.config.name.clone()), Some("root".to_string()));
    assert_eq!(screen.title.as_deref().map(String::as_str), Some("Home"));
}

#[test]
fn test_inject_members_reports_the_target() {
    let injector = Injector::new(&root_component).unwrap();
    let mut screen = Screen::default();

    match injector.inject_members(&mut screen) {
        Err(DiError::MembersInjection { target, source }) => {
            assert!(target.ends_with("Screen"));
            assert!(matches!(*source, DiError::ProviderNotFound(_)));
        }
        other => panic!("expected a members injection failure, got {:?}", other.err()),
    }
}

// ===== Deferred Handles =====

#[test]
fn test_typed_provider_resolves_on_every_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let injector = Injector::new(&move |registry: &mut ProviderRegistry| {
        let counter = counter.clone();
        registry.register_factory(Key::of_type::<usize>(), move |_: &dyn DependencyResolver| {
            Ok(counter.fetch_add(1, Ordering::SeqCst))
        })
    })
    .unwrap();

    let provider: TypedProvider<usize> = injector.provider(Key::of_type::<usize>());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(*provider.get().unwrap(), 0);
    assert_eq!(*provider.get().unwrap(), 1);
}

#[test]
fn test_lazy_resolves_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let injector = Injector::new(&move |registry: &mut ProviderRegistry| {
        let counter = counter.clone();
        registry.register_factory(Key::of_type::<usize>(), move |_: &dyn DependencyResolver| {
            Ok(counter.fetch_add(1, Ordering::SeqCst))
        })
    })
    .unwrap();

    let lazy: Lazy<usize> = injector.lazy(Key::of_type::<usize>());
    assert!(!lazy.is_resolved());
    let first = lazy.get().unwrap();
    let second = lazy.get().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_deferred_handles_break_construction_cycles() {
    struct Parent {
        child: Lazy<Child>,
    }
    struct Child {
        parent: TypedProvider<Parent>,
    }

    let injector = Injector::new(&|registry: &mut ProviderRegistry| {
        registry.register_singleton(Key::of_type::<Parent>(), |resolver: &dyn DependencyResolver| {
            Ok(Parent {
                child: Lazy::from_resolver(resolver, Key::of_type::<Child>())?,
            })
        })?;
        registry.register_singleton(Key::of_type::<Child>(), |resolver: &dyn DependencyResolver| {
            Ok(Child {
                parent: TypedProvider::from_resolver(resolver, Key::of_type::<Parent>())?,
            })
        })
    })
    .unwrap();

    let parent = injector.instance_of::<Parent>().unwrap();
    let child = parent.child.get().unwrap();
    assert!(Arc::ptr_eq(&child.parent.get().unwrap(), &parent));
}

#[test]
fn test_singletons_holding_deferred_handles_are_dropped_with_the_injector() {
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    struct Holder {
        value: Lazy<u8>,
        _flag: DropFlag,
    }

    let dropped = Arc::new(AtomicBool::new(false));
    let marker = dropped.clone();
    {
        let injector = Injector::new(&move |registry: &mut ProviderRegistry| {
            registry.register_instance(Key::of_type::<u8>(), 5u8)?;
            let marker = marker.clone();
            registry.register_singleton(Key::of_type::<Holder>(), move |resolver: &dyn DependencyResolver| {
                Ok(Holder {
                    value: Lazy::from_resolver(resolver, Key::of_type::<u8>())?,
                    _flag: DropFlag(marker.clone()),
                })
            })
        })
        .unwrap();

        let holder = injector.instance_of::<Holder>().unwrap();
        assert_eq!(*holder.value.get().unwrap(), 5);
        assert!(!dropped.load(Ordering::SeqCst));
    }

    assert!(dropped.load(Ordering::SeqCst));
}

#[test]
fn test_deferred_handle_outliving_its_injector_fails() {
    let injector = Injector::new(&|registry: &mut ProviderRegistry| {
        registry.register_instance(Key::of_type::<u8>(), 5u8)
    })
    .unwrap();
    let provider: TypedProvider<u8> = injector.provider(Key::of_type::<u8>());
    assert_eq!(*provider.get().unwrap(), 5);

    drop(injector);
    match provider.get() {
        Err(DiError::InjectorDropped(key)) => assert_eq!(key, Key::of_type::<u8>()),
        other => panic!("expected a dropped injector, got {:?}", other.err()),
    }
}
