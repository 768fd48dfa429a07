use keyscope::{
    instance, registry, utils::thread_safety::RcThreadSafety, Context, InstantiateErrorKind, Lifetime::*, Registry, RegistryBuilder,
    ResolveErrorKind, Resolver, Scope,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing_test::traced_test;

struct Pool {
    size: i64,
}

struct Repository {
    pool: RcThreadSafety<Pool>,
}

struct RequestId(i64);

struct Handler {
    repository: RcThreadSafety<Repository>,
    request_id: RcThreadSafety<RequestId>,
}

fn registry(counter: RcThreadSafety<AtomicU8>) -> Registry {
    RegistryBuilder::new()
        .provide("pool", SingleInstance, move |context: &Context, _: &dyn Resolver| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Pool {
                size: context.path("pool.size").and_then(Context::as_i64).unwrap_or(1),
            })
        })
        .provide(["repository", "repo"], Transient, |_: &Context, resolver: &dyn Resolver| {
            Ok(Repository {
                pool: resolver.get("pool")?,
            })
        })
        .provide("request_id", Transient, |context: &Context, _: &dyn Resolver| {
            let id = context.require("request_id")?.as_i64();
            Ok(RequestId(id.ok_or_else(|| anyhow::anyhow!("request_id isn't a number"))?))
        })
        .provide_on_demand("handler", |_: &Context, resolver: &dyn Resolver| {
            Ok(Handler {
                repository: resolver.get("repo")?,
                request_id: resolver.get("request_id")?,
            })
        })
        .build()
}

fn root_context() -> Context {
    Context::new().with("pool", Context::new().with("size", 16))
}

#[test]
#[traced_test]
fn test_unregistered_key_fails() {
    let scope = Scope::new(Context::new(), RegistryBuilder::new().build());

    let err = scope.get::<Pool>("pool").err().unwrap();

    assert!(matches!(err, ResolveErrorKind::Unregistered { .. }));
    assert_eq!(err.to_string(), "Service with key pool is not registered");
}

#[test]
#[traced_test]
fn test_single_instance_shared_with_descendants() {
    let counter = RcThreadSafety::new(AtomicU8::new(0));
    let root = Scope::new(root_context(), registry(counter.clone()));
    let child = root.create_scope(Context::new().with("request_id", 1));
    let grandchild = child.create_scope(Context::new().with("request_id", 2));

    let from_grandchild = grandchild.get::<Pool>("pool").unwrap();
    let from_root = root.get::<Pool>("pool").unwrap();
    let from_child = child.get::<Pool>("pool").unwrap();

    assert!(RcThreadSafety::ptr_eq(&from_root, &from_child));
    assert!(RcThreadSafety::ptr_eq(&from_root, &from_grandchild));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    // Created with the context of the scope that asked first
    assert_eq!(from_root.size, 1);
}

#[test]
#[traced_test]
fn test_transient_isolated_per_scope() {
    let root = Scope::new(root_context(), registry(RcThreadSafety::new(AtomicU8::new(0))));
    let first = root.create_scope(Context::new());
    let second = root.create_scope(Context::new());

    let first_repository = first.get::<Repository>("repository").unwrap();
    let second_repository = second.get::<Repository>("repository").unwrap();

    assert!(RcThreadSafety::ptr_eq(&first_repository, &first.get::<Repository>("repository").unwrap()));
    assert!(!RcThreadSafety::ptr_eq(&first_repository, &second_repository));
    assert!(RcThreadSafety::ptr_eq(&first_repository.pool, &second_repository.pool));
}

#[test]
#[traced_test]
fn test_transient_differs_between_parent_and_child() {
    let root = Scope::new(root_context(), registry(RcThreadSafety::new(AtomicU8::new(0))));

    let from_root = root.get::<Repository>("repository").unwrap();
    let child = root.create_scope(Context::new());
    let from_child = child.get::<Repository>("repository").unwrap();

    assert!(!RcThreadSafety::ptr_eq(&from_root, &from_child));
    assert!(RcThreadSafety::ptr_eq(&from_root, &root.get::<Repository>("repo").unwrap()));
}

#[test]
#[traced_test]
fn test_on_demand_always_new() {
    let root = Scope::new(root_context(), registry(RcThreadSafety::new(AtomicU8::new(0))));
    let request = root.create_scope(Context::new().with("request_id", 42));

    let first = request.get::<Handler>("handler").unwrap();
    let second = request.get::<Handler>("handler").unwrap();

    assert!(!RcThreadSafety::ptr_eq(&first, &second));
    assert!(RcThreadSafety::ptr_eq(&first.repository, &second.repository));
    assert_eq!(first.request_id.0, 42);
}

#[test]
#[traced_test]
fn test_aliases_resolve_to_one_instance() {
    let root = Scope::new(root_context(), registry(RcThreadSafety::new(AtomicU8::new(0))));

    let by_alias = root.get::<Repository>("repo").unwrap();
    let by_key = root.get::<Repository>("repository").unwrap();

    assert!(RcThreadSafety::ptr_eq(&by_alias, &by_key));
}

#[test]
#[traced_test]
fn test_single_instance_aliases_across_scopes() {
    let created = RcThreadSafety::new(AtomicU8::new(0));
    let root = Scope::new(
        Context::new(),
        RegistryBuilder::new()
            .provide(["A", "B"], SingleInstance, {
                let created = created.clone();
                move |_: &Context, _: &dyn Resolver| {
                    created.fetch_add(1, Ordering::SeqCst);
                    Ok(Pool { size: 2 })
                }
            })
            .build(),
    );
    let child = root.create_scope(Context::new());

    let by_a = child.get::<Pool>("A").unwrap();
    let by_b = root.get::<Pool>("B").unwrap();

    assert!(RcThreadSafety::ptr_eq(&by_a, &by_b));
    assert!(RcThreadSafety::ptr_eq(&by_a, &child.get::<Pool>("B").unwrap()));
    assert_eq!(created.load(Ordering::SeqCst), 1);
}

#[test]
#[traced_test]
fn test_identical_registrations_are_not_aliases() {
    let root = Scope::new(
        Context::new(),
        RegistryBuilder::new()
            .provide("a", Transient, instance(1u8))
            .provide("b", Transient, instance(1u8))
            .build(),
    );

    assert!(!RcThreadSafety::ptr_eq(&root.get::<u8>("a").unwrap(), &root.get::<u8>("b").unwrap()));
}

#[test]
#[traced_test]
fn test_missing_context_is_reported() {
    let root = Scope::new(root_context(), registry(RcThreadSafety::new(AtomicU8::new(0))));

    let err = root.get::<Handler>("handler").err().unwrap();

    let ResolveErrorKind::Instantiator { key, source } = err else {
        panic!("expected an instantiator error");
    };
    assert_eq!(key, "handler");
    let InstantiateErrorKind::Deps(err) = source else {
        panic!("expected a dependency error");
    };
    assert!(matches!(
        *err,
        ResolveErrorKind::Instantiator {
            source: InstantiateErrorKind::MissingContext { .. },
            ..
        }
    ));
}

#[test]
#[traced_test]
fn test_end_scope_disposes_once_in_order() {
    let disposed = RcThreadSafety::new(Mutex::new(Vec::new()));

    let registry = registry! {
        lifetime(SingleInstance) [
            provide("config", instance(1u8), disposer = {
                let disposed = disposed.clone();
                move |_: RcThreadSafety<u8>, _: &Context| disposed.lock().push("config")
            }),
        ],
        lifetime(Transient) [
            provide(["session", "db_session"], |_: &Context, resolver: &dyn Resolver| {
                Ok(*resolver.get::<u8>("config")? as u16)
            }, disposer = {
                let disposed = disposed.clone();
                move |_: RcThreadSafety<u16>, _: &Context| disposed.lock().push("session")
            }),
        ],
        lifetime(OnDemand) [
            provide("command", instance(3u32), disposer = {
                let disposed = disposed.clone();
                move |_: RcThreadSafety<u32>, _: &Context| disposed.lock().push("command")
            }),
        ],
    };
    let root = Scope::new(Context::new(), registry);
    let child = root.create_scope(Context::new());

    let _ = root.get::<u32>("command").unwrap();
    let session = root.get::<u16>("db_session").unwrap();
    let _ = root.get::<u16>("session").unwrap();
    let _ = child.get::<u16>("session").unwrap();

    child.end_scope();
    assert_eq!(*disposed.lock(), ["session"]);

    root.end_scope();
    assert_eq!(*disposed.lock(), ["session", "command", "session", "config"]);

    root.end_scope();
    assert_eq!(disposed.lock().len(), 4);

    let renewed = root.get::<u16>("session").unwrap();
    assert!(!RcThreadSafety::ptr_eq(&session, &renewed));
}

#[test]
#[traced_test]
fn test_disposer_receives_scope_context() {
    let seen = RcThreadSafety::new(Mutex::new(None));

    let root = Scope::new(
        Context::new(),
        RegistryBuilder::new()
            .provide_with_disposer("connection", Transient, instance(()), {
                let seen = seen.clone();
                move |_: RcThreadSafety<()>, context: &Context| {
                    *seen.lock() = context.get("tenant").and_then(Context::as_str).map(ToOwned::to_owned);
                }
            })
            .build(),
    );

    let tenant = root.create_scope(Context::new().with("tenant", "acme"));
    let _ = tenant.get::<()>("connection").unwrap();
    drop(tenant);

    assert_eq!(seen.lock().as_deref(), Some("acme"));
}

#[test]
fn test_panicking_disposer_aborts_remaining() {
    let disposed = RcThreadSafety::new(AtomicU8::new(0));

    let root = Scope::new(
        Context::new(),
        RegistryBuilder::new()
            .provide_with_disposer("first", OnDemand, instance(1u8), |_: RcThreadSafety<u8>, _: &Context| {
                panic!("disposer failed");
            })
            .provide_with_disposer("second", Transient, instance(2u8), {
                let disposed = disposed.clone();
                move |_: RcThreadSafety<u8>, _: &Context| {
                    disposed.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build(),
    );
    let _ = root.get::<u8>("first").unwrap();
    let _ = root.get::<u8>("second").unwrap();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| root.end_scope()));

    assert!(result.is_err());
    assert_eq!(disposed.load(Ordering::SeqCst), 0);

    // Nothing is left to dispose
    root.end_scope();
    assert_eq!(disposed.load(Ordering::SeqCst), 0);
}
