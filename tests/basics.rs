use locus_di::{DiError, Resolver, Scope};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn singleton_resolves_to_same_instance() {
    struct Config {
        port: u16,
    }

    let scope = Scope::new();
    scope.register_singleton::<Config, _>(|_| Ok(Config { port: 8080 }));

    let a = scope.get::<Config>().unwrap();
    let b = scope.get::<Config>().unwrap();

    assert_eq!(a.port, 8080);
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn singleton_creator_runs_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = count.clone();

    let scope = Scope::new();
    scope.register_singleton::<u64, _>(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
        Ok(42u64)
    });

    for _ in 0..5 {
        let value = scope.get::<u64>().unwrap();
        assert_eq!(*value, 42);
    }
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn singleton_value_registration() {
    let scope = Scope::new();
    scope.register_singleton_value(7usize);
    scope.register_singleton_value("hello".to_string());

    let n1 = scope.get::<usize>().unwrap();
    let n2 = scope.get::<usize>().unwrap();
    assert_eq!(*n1, 7);
    assert!(Arc::ptr_eq(&n1, &n2));
    assert_eq!(*scope.get::<String>().unwrap(), "hello");
}

#[test]
fn transient_creates_new_instances() {
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = count.clone();

    let scope = Scope::new();
    scope.register_factory::<String, _>(move |_| {
        let n = count_clone.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("instance-{n}"))
    });

    let a = scope.get::<String>().unwrap();
    let b = scope.get::<String>().unwrap();

    assert_eq!(*a, "instance-1");
    assert_eq!(*b, "instance-2");
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn factory_resolves_dependencies() {
    struct Config {
        port: u16,
    }

    struct Server {
        config: Arc<Config>,
        name: String,
    }

    let scope = Scope::new();
    scope.register_singleton::<Config, _>(|_| Ok(Config { port: 9000 }));
    scope.register_factory::<Server, _>(|ctx| {
        Ok(Server {
            config: ctx.get::<Config>()?,
            name: "api".to_string(),
        })
    });

    let server = scope.get::<Server>().unwrap();
    assert_eq!(server.config.port, 9000);
    assert_eq!(server.name, "api");
}

#[test]
fn complex_graph_shares_singletons() {
    struct A {
        value: i32,
    }
    struct B {
        a: Arc<A>,
    }
    struct C {
        a: Arc<A>,
        b: Arc<B>,
    }

    let scope = Scope::new();
    scope.register_singleton::<A, _>(|_| Ok(A { value: 100 }));
    scope.register_singleton::<B, _>(|ctx| Ok(B { a: ctx.get::<A>()? }));
    scope.register_singleton::<C, _>(|ctx| {
        Ok(C {
            a: ctx.get::<A>()?,
            b: ctx.get::<B>()?,
        })
    });

    let c = scope.get::<C>().unwrap();
    assert_eq!(c.a.value, 100);
    assert!(Arc::ptr_eq(&c.a, &c.b.a));
}

#[test]
fn reregistration_last_write_wins() {
    let scope = Scope::new();
    scope.register_singleton::<usize, _>(|_| Ok(1usize));
    scope.register_singleton::<usize, _>(|_| Ok(2usize));

    assert_eq!(*scope.get::<usize>().unwrap(), 2);
}

#[test]
fn reregistration_drops_cached_instance() {
    let scope = Scope::new();
    scope.register_singleton::<String, _>(|_| Ok("first".to_string()));
    let first = scope.get::<String>().unwrap();
    assert_eq!(*first, "first");

    scope.register_singleton::<String, _>(|_| Ok("second".to_string()));
    let second = scope.get::<String>().unwrap();
    assert_eq!(*second, "second");
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn unregistered_key_fails_with_not_registered() {
    #[derive(Debug)]
    struct Missing;

    let scope = Scope::new();
    scope.register_singleton_value(3u8);

    assert!(!scope.is_registered::<Missing>());
    match scope.get::<Missing>() {
        Err(DiError::NotRegistered { key, known }) => {
            assert!(key.type_name().contains("Missing"));
            // The message lists what actually is registered at this scope.
            assert_eq!(known.len(), 1);
            assert!(known[0].type_name().contains("u8"));
        }
        other => panic!("expected NotRegistered, got {other:?}"),
    }
}

#[test]
fn creator_error_is_wrapped_with_cause() {
    #[derive(Debug)]
    struct BrokenIo;
    impl std::fmt::Display for BrokenIo {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "disk on fire")
        }
    }
    impl std::error::Error for BrokenIo {}

    #[derive(Debug)]
    struct Flaky;

    let scope = Scope::new();
    scope.register_factory::<Flaky, _>(|_| Err(Box::new(BrokenIo) as locus_di::BoxError));

    match scope.get::<Flaky>() {
        Err(DiError::ResolutionFailed { key, source }) => {
            assert!(key.type_name().contains("Flaky"));
            assert!(source.to_string().contains("disk on fire"));
        }
        other => panic!("expected ResolutionFailed, got {other:?}"),
    }
}

#[test]
fn nested_taxonomy_error_is_not_double_wrapped() {
    #[derive(Debug)]
    struct Outer;
    struct Inner;

    let scope = Scope::new();
    // Outer's creator fails because Inner is not registered; the NotRegistered
    // error must surface as-is rather than wrapped in ResolutionFailed.
    scope.register_factory::<Outer, _>(|ctx| {
        let _inner = ctx.get::<Inner>()?;
        Ok(Outer)
    });

    match scope.get::<Outer>() {
        Err(DiError::NotRegistered { key, .. }) => {
            assert!(key.type_name().contains("Inner"));
        }
        other => panic!("expected NotRegistered passthrough, got {other:?}"),
    }
}

#[test]
fn required_variant_panics_on_missing() {
    struct Missing;

    let scope = Scope::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = scope.get_required::<Missing>();
    }));
    assert!(result.is_err());
}
