//! Tests for the process-wide root scope. These mutate shared process state,
//! so they are serialized.

use locus_di::{global, Resolver};
use serial_test::serial;
use std::sync::Arc;

#[derive(Debug)]
struct AppConfig {
    name: String,
}

#[test]
#[serial]
fn root_round_trip() {
    global::dispose_all();

    global::register_singleton::<AppConfig, _>(|_| {
        Ok(AppConfig {
            name: "global-app".to_string(),
        })
    });

    assert!(global::is_registered::<AppConfig>());

    let a = global::get::<AppConfig>().unwrap();
    let b = global::get::<AppConfig>().unwrap();
    assert_eq!(a.name, "global-app");
    assert!(Arc::ptr_eq(&a, &b));

    global::dispose_all();
    assert!(!global::is_registered::<AppConfig>());
    assert!(global::root().is_empty());
}

#[test]
#[serial]
fn root_children_fall_back_to_root() {
    global::dispose_all();

    global::register_singleton::<AppConfig, _>(|_| {
        Ok(AppConfig {
            name: "root".to_string(),
        })
    });

    let child = global::create_child();
    assert_eq!(child.get::<AppConfig>().unwrap().name, "root");

    child.register_singleton::<AppConfig, _>(|_| {
        Ok(AppConfig {
            name: "child".to_string(),
        })
    });
    assert_eq!(child.get::<AppConfig>().unwrap().name, "child");
    assert_eq!(global::get::<AppConfig>().unwrap().name, "root");

    global::dispose_all();
}

#[tokio::test]
#[serial]
async fn root_async_resolution() {
    global::dispose_all();

    global::register_async_singleton::<AppConfig, _, _>(|_ctx| async {
        Ok(AppConfig {
            name: "async-root".to_string(),
        })
    });

    let config = global::get_async::<AppConfig>().await.unwrap();
    assert_eq!(config.name, "async-root");

    global::dispose_all();
}

#[test]
#[serial]
fn root_transients_and_dump() {
    global::dispose_all();

    global::register_factory::<String, _>(|_| Ok("fresh".to_string()));
    let a = global::get::<String>().unwrap();
    let b = global::get::<String>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));

    global::dump_registry();
    global::dispose_all();
}
