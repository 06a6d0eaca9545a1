use lifetime_di::{DiError, Resolver, ServiceCollection};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[test]
fn test_scoped_services() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<String, _>(move |_| {
        let n = counter_clone.fetch_add(1, Ordering::SeqCst);
        Ok(format!("scoped-{}", n))
    });

    let sp = sc.build();

    let scope1 = sp.create_scope();
    let s1a = scope1.get_required::<String>();
    let s1b = scope1.get_required::<String>();

    let scope2 = sp.create_scope();
    let s2a = scope2.get_required::<String>();
    let s2b = scope2.get_required::<String>();

    // Same instance within scope
    assert!(Arc::ptr_eq(&s1a, &s1b));
    assert!(Arc::ptr_eq(&s2a, &s2b));

    // Different instances across scopes
    assert!(!Arc::ptr_eq(&s1a, &s2a));
    assert_eq!(*s1a, "scoped-0");
    assert_eq!(*s2a, "scoped-1");
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_scoped_without_scope_is_an_error() {
    struct UnitOfWork;

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<UnitOfWork, _>(|_| Ok(UnitOfWork));
    let sp = sc.build();

    match sp.get::<UnitOfWork>() {
        Err(DiError::ScopeRequired(name)) => assert!(name.ends_with("UnitOfWork")),
        _ => panic!("Expected ScopeRequired"),
    }
}

#[test]
fn test_transient_needing_scoped_fails_at_root() {
    struct Session;
    struct Handler {
        _session: Arc<Session>,
    }

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<Session, _>(|_| Ok(Session));
    sc.add_transient_factory::<Handler, _>(|r| Ok(Handler { _session: r.get::<Session>()? }));
    let sp = sc.build();

    assert!(matches!(sp.get::<Handler>(), Err(DiError::ScopeRequired(_))));

    let scope = sp.create_scope();
    assert!(scope.get::<Handler>().is_ok());
}

#[test]
fn test_singleton_shared_across_scopes() {
    let mut sc = ServiceCollection::new();
    sc.add_singleton_factory::<u64, _>(|_| Ok(99));

    let sp = sc.build();
    let root = sp.get_required::<u64>();
    let scope1 = sp.create_scope();
    let scope2 = sp.create_scope();

    assert!(Arc::ptr_eq(&root, &scope1.get_required::<u64>()));
    assert!(Arc::ptr_eq(&root, &scope2.get_required::<u64>()));
}

#[test]
fn test_transient_fresh_inside_scope() {
    struct Request(u32);

    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let mut sc = ServiceCollection::new();
    sc.add_transient_factory::<Request, _>(move |_| Ok(Request(counter_clone.fetch_add(1, Ordering::SeqCst))));

    let sp = sc.build();
    let scope = sp.create_scope();
    let a = scope.get_required::<Request>();
    let b = scope.get_required::<Request>();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!((a.0, b.0), (0, 1));
}

#[test]
fn test_scoped_dependencies_share_the_scope_instance() {
    struct DbContext;
    struct UserRepo {
        db: Arc<DbContext>,
    }
    struct OrderRepo {
        db: Arc<DbContext>,
    }

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<DbContext, _>(|_| Ok(DbContext));
    sc.add_scoped_factory::<UserRepo, _>(|r| Ok(UserRepo { db: r.get::<DbContext>()? }));
    sc.add_transient_factory::<OrderRepo, _>(|r| Ok(OrderRepo { db: r.get::<DbContext>()? }));

    let sp = sc.build();
    let scope = sp.create_scope();

    let users = scope.get_required::<UserRepo>();
    let orders = scope.get_required::<OrderRepo>();
    assert!(Arc::ptr_eq(&users.db, &orders.db));

    let other = sp.create_scope();
    assert!(!Arc::ptr_eq(&users.db, &other.get_required::<UserRepo>().db));
}

#[test]
fn test_labeled_scopes_and_ids() {
    let sp = ServiceCollection::new().build();

    let a = sp.create_labeled_scope("A");
    let b = sp.create_labeled_scope("B");
    let anonymous = sp.create_scope();

    assert_eq!(a.label(), Some("A"));
    assert_eq!(b.label(), Some("B"));
    assert_eq!(anonymous.label(), None);
    assert_ne!(a.id(), b.id());
    assert_ne!(b.id(), anonymous.id());
}

#[test]
fn test_dispose_releases_cached_instances() {
    struct First;
    struct Second;
    struct Unused;

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<First, _>(|_| Ok(First));
    sc.add_scoped_factory::<Second, _>(|_| Ok(Second));
    sc.add_scoped_factory::<Unused, _>(|_| Ok(Unused));

    let sp = sc.build();
    let scope = sp.create_scope();
    assert_eq!(scope.cached_count(), 0);

    let first = scope.get_required::<First>();
    scope.get_required::<Second>();
    scope.get_required::<First>();
    assert_eq!(scope.cached_count(), 2);

    assert_eq!(scope.dispose(), 2);

    // Callers holding an instance keep it alive after the scope ends
    assert_eq!(Arc::strong_count(&first), 1);
}

#[test]
fn test_active_scope_count() {
    let sp = ServiceCollection::new().build();
    assert_eq!(sp.active_scopes(), 0);

    let a = sp.create_scope();
    let b = sp.create_scope();
    assert_eq!(sp.active_scopes(), 2);

    a.dispose();
    assert_eq!(sp.active_scopes(), 1);

    drop(b);
    assert_eq!(sp.active_scopes(), 0);
}

#[test]
fn test_scope_resolves_through_its_provider() {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(3i32);
    let sp = sc.build();

    let scope = sp.create_scope();
    let via_provider = scope.provider().get_required::<i32>();
    assert!(Arc::ptr_eq(&via_provider, &sp.get_required::<i32>()));
}

#[test]
fn test_factory_sees_its_scope() {
    struct ScopeTag(Option<String>);

    let mut sc = ServiceCollection::new();
    sc.add_transient_factory::<ScopeTag, _>(|r| Ok(ScopeTag(r.scope().and_then(|s| s.label()).map(String::from))));

    let sp = sc.build();
    assert_eq!(sp.get_required::<ScopeTag>().0, None);

    let scope = sp.create_labeled_scope("orders");
    assert_eq!(scope.get_required::<ScopeTag>().0.as_deref(), Some("orders"));
}
