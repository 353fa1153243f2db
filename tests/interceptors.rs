/// Interceptor chain tests: overrides, ordering and misbehaving interceptors

use saber_di::{
    DependencyResolver, DependencyResolverInterceptor, DiError, DiResult, Injector, Key, KeyOverrideInterceptor,
    OverrideInterceptor, Provider, ProviderChain, ProviderInterceptor, ProviderRegistry, ResolverExt,
};
use std::sync::{Arc, Mutex};

fn real_component(registry: &mut ProviderRegistry) -> DiResult<()> {
    registry.register_instance(Key::of_type::<String>(), "Real".to_string())
}

fn fake_overrides() -> OverrideInterceptor {
    OverrideInterceptor::from_component(&|registry: &mut ProviderRegistry| {
        registry.register_instance(Key::of_type::<String>(), "Fake".to_string())
    })
    .unwrap()
}

// ===== Test Interceptors =====

/// Records its name on every pass, then wraps the resolver unchanged.
struct Recording {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

struct RecordingResolver {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
    delegate: Arc<dyn DependencyResolver>,
}

impl DependencyResolver for RecordingResolver {
    fn find_provider(&self, key: &Key) -> DiResult<Option<Arc<dyn Provider>>> {
        self.log.lock().unwrap().push(self.name);
        self.delegate.find_provider(key)
    }

    fn get_instance(&self, key: &Key) -> DiResult<saber_di::AnyArc> {
        self.get_provider(key)?.get(self)
    }
}

impl DependencyResolverInterceptor for Recording {
    fn intercept(&self, resolver: Arc<dyn DependencyResolver>) -> Option<Arc<dyn DependencyResolver>> {
        Some(Arc::new(RecordingResolver {
            name: self.name,
            log: self.log.clone(),
            delegate: resolver,
        }))
    }
}

struct Broken;

impl DependencyResolverInterceptor for Broken {
    fn intercept(&self, _resolver: Arc<dyn DependencyResolver>) -> Option<Arc<dyn DependencyResolver>> {
        None
    }
}

struct Forgetful;

impl ProviderInterceptor for Forgetful {
    fn intercept(&self, _chain: &ProviderChain<'_>, _key: &Key) -> DiResult<Option<Arc<dyn Provider>>> {
        Ok(None)
    }
}

struct Announcing {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl ProviderInterceptor for Announcing {
    fn intercept(&self, chain: &ProviderChain<'_>, key: &Key) -> DiResult<Option<Arc<dyn Provider>>> {
        self.log.lock().unwrap().push(self.name);
        chain.proceed(key).map(Some)
    }
}

// ===== Override Scenario =====

#[test]
fn test_override_interceptor_replaces_real_value() {
    let injector = Injector::builder()
        .resolver_interceptor(Arc::new(fake_overrides()))
        .build(&real_component)
        .unwrap();
    assert_eq!(*injector.instance_of::<String>().unwrap(), "Fake");
}

#[test]
fn test_removing_the_interceptor_restores_real_value() {
    let intercepted = Injector::builder()
        .resolver_interceptor(Arc::new(fake_overrides()))
        .build(&real_component)
        .unwrap();
    let plain = Injector::builder().build(&real_component).unwrap();

    assert_eq!(*intercepted.instance_of::<String>().unwrap(), "Fake");
    assert_eq!(*plain.instance_of::<String>().unwrap(), "Real");
}

#[test]
fn test_overrides_apply_to_transitive_dependencies() {
    let component = |registry: &mut ProviderRegistry| {
        real_component(registry)?;
        registry.register_factory(Key::of_type::<usize>(), |resolver: &dyn DependencyResolver| {
            Ok(resolver.instance_of::<String>()?.len())
        })
    };
    let injector = Injector::builder()
        .provider_interceptor(Arc::new(
            KeyOverrideInterceptor::new().with_instance(Key::of_type::<String>(), "Override".to_string()),
        ))
        .build(&component)
        .unwrap();

    assert_eq!(*injector.instance_of::<usize>().unwrap(), "Override".len());
}

#[test]
fn test_child_injectors_inherit_interceptors() {
    let root = Injector::builder()
        .resolver_interceptor(Arc::new(fake_overrides()))
        .build(&|_: &mut ProviderRegistry| -> DiResult<()> { Ok(()) })
        .unwrap();
    let child = root.create_child_injector(&real_component).unwrap();

    assert_eq!(*child.instance_of::<String>().unwrap(), "Fake");
}

// ===== Ordering =====

#[test]
fn test_first_added_resolver_interceptor_is_invoked_first() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let injector = Injector::builder()
        .resolver_interceptor(Arc::new(Recording { name: "first", log: log.clone() }))
        .resolver_interceptor(Arc::new(Recording { name: "second", log: log.clone() }))
        .build(&real_component)
        .unwrap();

    log.lock().unwrap().clear();
    injector.instance_of::<String>().unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn test_provider_interceptors_run_in_addition_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let injector = Injector::builder()
        .provider_interceptor(Arc::new(Announcing { name: "outer", log: log.clone() }))
        .provider_interceptor(Arc::new(Announcing { name: "inner", log: log.clone() }))
        .build(&real_component)
        .unwrap();

    injector.instance_of::<String>().unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
}

// ===== Null Results =====

#[test]
fn test_resolver_interceptor_returning_nothing_fails_the_build() {
    let result = Injector::builder()
        .resolver_interceptor(Arc::new(Broken))
        .build(&real_component);

    match result {
        Err(DiError::NullInterceptorResult(name)) => assert!(name.ends_with("Broken")),
        other => panic!("expected a null interceptor result, got {:?}", other.err()),
    }
}

#[test]
fn test_provider_interceptor_returning_nothing_fails_the_lookup() {
    let injector = Injector::builder()
        .provider_interceptor(Arc::new(Forgetful))
        .build(&real_component)
        .unwrap();

    match injector.instance_of::<String>() {
        Err(DiError::NullInterceptorResult(name)) => assert!(name.ends_with("Forgetful")),
        other => panic!("expected a null interceptor result, got {:?}", other.err()),
    }
}

#[test]
fn test_null_provider_result_is_not_a_miss_for_lookups() {
    let injector = Injector::builder()
        .provider_interceptor(Arc::new(Forgetful))
        .build(&real_component)
        .unwrap();

    assert!(matches!(
        injector.find_provider(&Key::of_type::<String>()),
        Err(DiError::NullInterceptorResult(_))
    ));

    let registry = ProviderRegistry::with_parent(Arc::new(injector));
    match registry.get_instance(&Key::of_type::<String>()) {
        Err(DiError::NullInterceptorResult(name)) => assert!(name.ends_with("Forgetful")),
        other => panic!("expected a null interceptor result, got {:?}", other.err()),
    }
}

#[test]
fn test_missing_key_through_provider_interceptors_is_a_miss() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let injector = Injector::builder()
        .provider_interceptor(Arc::new(Announcing { name: "only", log }))
        .build(&real_component)
        .unwrap();

    assert!(injector.find_provider(&Key::of_type::<u64>()).unwrap().is_none());
    assert!(matches!(injector.get_instance(&Key::of_type::<u64>()), Err(DiError::ProviderNotFound(_))));
}
