//! The printer and operations walkthrough, checked through instance identity.

use lifetime_di::{Resolver, ServiceCollection, ServiceDescriptor, ServiceProvider};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

trait Printer: Send + Sync {
    fn print(&self, caller: &str, message: &str);
}

#[derive(Default)]
struct RecordingPrinter {
    lines: Mutex<Vec<String>>,
}

impl Printer for RecordingPrinter {
    fn print(&self, caller: &str, message: &str) {
        self.lines.lock().unwrap().push(format!("[ {}...{} ]", caller, message));
    }
}

struct TransientOperation {
    id: u64,
    printer: Arc<dyn Printer>,
}

struct ScopedOperation {
    id: u64,
    printer: Arc<dyn Printer>,
}

struct SingletonOperation {
    id: u64,
    printer: Arc<dyn Printer>,
}

fn build(printer: Arc<RecordingPrinter>) -> ServiceProvider {
    let ids = Arc::new(AtomicU64::new(1));
    let (t_ids, s_ids, g_ids) = (ids.clone(), ids.clone(), ids);

    ServiceCollection::from_descriptors([
        ServiceDescriptor::trait_instance::<dyn Printer>(printer),
        ServiceDescriptor::transient::<TransientOperation, _>(move |r| {
            Ok(TransientOperation {
                id: t_ids.fetch_add(1, Ordering::SeqCst),
                printer: r.get_trait::<dyn Printer>()?,
            })
        })
        .depends_on_trait::<dyn Printer>(),
        ServiceDescriptor::scoped::<ScopedOperation, _>(move |r| {
            Ok(ScopedOperation {
                id: s_ids.fetch_add(1, Ordering::SeqCst),
                printer: r.get_trait::<dyn Printer>()?,
            })
        })
        .depends_on_trait::<dyn Printer>(),
        ServiceDescriptor::singleton::<SingletonOperation, _>(move |r| {
            Ok(SingletonOperation {
                id: g_ids.fetch_add(1, Ordering::SeqCst),
                printer: r.get_trait::<dyn Printer>()?,
            })
        })
        .depends_on_trait::<dyn Printer>(),
    ])
    .build()
}

#[test]
fn test_identity_pattern_in_scope_a() {
    let provider = build(Arc::new(RecordingPrinter::default()));
    let scope_a = provider.create_labeled_scope("A");

    let s1 = scope_a.get_required::<SingletonOperation>();
    let s2 = scope_a.get_required::<SingletonOperation>();
    assert!(Arc::ptr_eq(&s1, &s2));

    let c1 = scope_a.get_required::<ScopedOperation>();
    let c2 = scope_a.get_required::<ScopedOperation>();
    assert!(Arc::ptr_eq(&c1, &c2));

    let t1 = scope_a.get_required::<TransientOperation>();
    let t2 = scope_a.get_required::<TransientOperation>();
    assert!(!Arc::ptr_eq(&t1, &t2));
    assert_ne!(t1.id, t2.id);
}

#[test]
fn test_scope_b_gets_its_own_scoped_operation() {
    let provider = build(Arc::new(RecordingPrinter::default()));

    let scope_a = provider.create_labeled_scope("A");
    let in_a = scope_a.get_required::<ScopedOperation>();
    let singleton_a = scope_a.get_required::<SingletonOperation>();
    scope_a.dispose();

    let scope_b = provider.create_labeled_scope("B");
    let in_b = scope_b.get_required::<ScopedOperation>();
    let singleton_b = scope_b.get_required::<SingletonOperation>();

    assert!(!Arc::ptr_eq(&in_a, &in_b));
    assert_ne!(in_a.id, in_b.id);
    assert!(Arc::ptr_eq(&singleton_a, &singleton_b));
}

#[test]
fn test_every_operation_shares_the_printer() {
    let printer = Arc::new(RecordingPrinter::default());
    let provider = build(printer.clone());
    let scope = provider.create_scope();

    let transient = scope.get_required::<TransientOperation>();
    let scoped = scope.get_required::<ScopedOperation>();
    let singleton = scope.get_required::<SingletonOperation>();

    transient.printer.print("TransientOperation", "Print");
    scoped.printer.print("ScopedOperation", "Print");
    singleton.printer.print("SingletonOperation", "Print");

    let lines = printer.lines.lock().unwrap();
    assert_eq!(
        *lines,
        [
            "[ TransientOperation...Print ]",
            "[ ScopedOperation...Print ]",
            "[ SingletonOperation...Print ]",
        ]
    );
}

#[test]
fn test_registrations_validate_cleanly() {
    let mut services = ServiceCollection::new();
    services.add_singleton_trait::<dyn Printer>(Arc::new(RecordingPrinter::default()));
    services.add(
        ServiceDescriptor::scoped::<ScopedOperation, _>(|r| {
            Ok(ScopedOperation {
                id: 0,
                printer: r.get_trait::<dyn Printer>()?,
            })
        })
        .depends_on_trait::<dyn Printer>(),
    );

    let report = services.validate();
    assert!(report.is_valid());
    assert!(report.warnings.is_empty());
}
