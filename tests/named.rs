use locus_di::{DiError, Resolver, Scope};
use std::sync::Arc;

#[derive(Debug)]
struct Endpoint {
    url: String,
}

#[test]
fn named_registrations_are_isolated() {
    let scope = Scope::new();
    scope.register_named_singleton::<Endpoint, _>("primary", |_| {
        Ok(Endpoint {
            url: "https://primary.example.com".to_string(),
        })
    });
    scope.register_named_singleton::<Endpoint, _>("replica", |_| {
        Ok(Endpoint {
            url: "https://replica.example.com".to_string(),
        })
    });

    let primary = scope.get_named::<Endpoint>("primary").unwrap();
    let replica = scope.get_named::<Endpoint>("replica").unwrap();

    assert_eq!(primary.url, "https://primary.example.com");
    assert_eq!(replica.url, "https://replica.example.com");
    assert!(!Arc::ptr_eq(&primary, &replica));
}

#[test]
fn unnamed_never_returns_named_and_vice_versa() {
    let scope = Scope::new();
    scope.register_named_singleton::<Endpoint, _>("primary", |_| {
        Ok(Endpoint {
            url: "https://primary.example.com".to_string(),
        })
    });

    // No unnamed registration exists, so the plain lookup fails.
    assert!(matches!(
        scope.get::<Endpoint>(),
        Err(DiError::NotRegistered { .. })
    ));

    scope.register_singleton::<Endpoint, _>(|_| {
        Ok(Endpoint {
            url: "https://default.example.com".to_string(),
        })
    });

    let unnamed = scope.get::<Endpoint>().unwrap();
    let named = scope.get_named::<Endpoint>("primary").unwrap();
    assert_eq!(unnamed.url, "https://default.example.com");
    assert!(!Arc::ptr_eq(&unnamed, &named));

    // A name that was never registered still fails.
    assert!(scope.get_named::<Endpoint>("missing").is_err());
}

#[test]
fn named_transients_and_is_registered() {
    let scope = Scope::new();
    scope.register_named_factory::<Endpoint, _>("ephemeral", |_| {
        Ok(Endpoint {
            url: "https://ephemeral.example.com".to_string(),
        })
    });

    assert!(scope.is_registered_named::<Endpoint>("ephemeral"));
    assert!(!scope.is_registered_named::<Endpoint>("other"));
    assert!(!scope.is_registered::<Endpoint>());

    let a = scope.get_named::<Endpoint>("ephemeral").unwrap();
    let b = scope.get_named::<Endpoint>("ephemeral").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn named_trait_registrations() {
    trait Notifier: Send + Sync {
        fn channel(&self) -> &str;
    }

    struct Email;
    impl Notifier for Email {
        fn channel(&self) -> &str {
            "email"
        }
    }

    struct Sms;
    impl Notifier for Sms {
        fn channel(&self) -> &str {
            "sms"
        }
    }

    let scope = Scope::new();
    scope.register_named_singleton_trait::<dyn Notifier, _>("email", |_| {
        Ok(Arc::new(Email) as Arc<dyn Notifier>)
    });
    scope.register_named_singleton_trait::<dyn Notifier, _>("sms", |_| {
        Ok(Arc::new(Sms) as Arc<dyn Notifier>)
    });

    assert_eq!(
        scope.get_named_trait::<dyn Notifier>("email").unwrap().channel(),
        "email"
    );
    assert_eq!(
        scope.get_named_trait::<dyn Notifier>("sms").unwrap().channel(),
        "sms"
    );
}
