//! Walks through the three service lifetimes.
//!
//! A `Printer` singleton is shared by three operation services registered as
//! transient, scoped and singleton. Two scopes ("A" and "B") show which
//! resolutions reuse an instance and which get a fresh one.
//!
//! Run with `cargo run --example lifetimes`; set `RUST_LOG=lifetime_di=debug`
//! to also see container events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lifetime_di::{
    DiResult, Resolver, Scope, ServiceCollection, ServiceCollectionExt, ServiceDescriptor, ServiceModule,
    TracingObserver,
};
use tracing_subscriber::EnvFilter;

trait Printer: Send + Sync {
    fn print(&self, caller: &str, message: &str);
}

struct ConsolePrinter;

impl Printer for ConsolePrinter {
    fn print(&self, caller: &str, message: &str) {
        tracing::info!("[ {}...{} ]", caller, message);
    }
}

static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(1);

/// Shared shape of the three operation services.
struct Operation {
    id: u64,
    printer: Arc<dyn Printer>,
}

impl Operation {
    fn new(printer: Arc<dyn Printer>) -> Self {
        Self {
            id: NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed),
            printer,
        }
    }
}

struct TransientOperation(Operation);
struct ScopedOperation(Operation);
struct SingletonOperation(Operation);

struct OperationsModule;

impl ServiceModule for OperationsModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        services
            .add(
                ServiceDescriptor::transient::<TransientOperation, _>(|r| {
                    Ok(TransientOperation(Operation::new(r.get_trait::<dyn Printer>()?)))
                })
                .depends_on_trait::<dyn Printer>(),
            )
            .add(
                ServiceDescriptor::scoped::<ScopedOperation, _>(|r| {
                    Ok(ScopedOperation(Operation::new(r.get_trait::<dyn Printer>()?)))
                })
                .depends_on_trait::<dyn Printer>(),
            )
            .add(
                ServiceDescriptor::singleton::<SingletonOperation, _>(|r| {
                    Ok(SingletonOperation(Operation::new(r.get_trait::<dyn Printer>()?)))
                })
                .depends_on_trait::<dyn Printer>(),
            );
        Ok(())
    }
}

fn report(printer: &dyn Printer, label: &str, lifetime: &str, first: u64, second: u64) {
    let verdict = if first == second { "same" } else { "different" };
    printer.print(label, &format!("{} {} / {} ({})", lifetime, first, second, verdict));
}

fn run_unit_of_work(scope: &Scope) -> DiResult<u64> {
    let label = scope.label().unwrap_or("?");
    let printer = scope.get_trait::<dyn Printer>()?;

    let (s1, s2) = (scope.get::<SingletonOperation>()?, scope.get::<SingletonOperation>()?);
    report(printer.as_ref(), label, "singleton", s1.0.id, s2.0.id);

    let (c1, c2) = (scope.get::<ScopedOperation>()?, scope.get::<ScopedOperation>()?);
    report(printer.as_ref(), label, "scoped", c1.0.id, c2.0.id);

    let (t1, t2) = (scope.get::<TransientOperation>()?, scope.get::<TransientOperation>()?);
    report(t1.0.printer.as_ref(), label, "transient", t1.0.id, t2.0.id);

    Ok(c1.0.id)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut services = ServiceCollection::new();
    services
        .add_singleton_trait::<dyn Printer>(Arc::new(ConsolePrinter))
        .add_observer(Arc::new(TracingObserver::with_name("demo")));
    let services = services.add_module(OperationsModule)?;

    let validation = services.validate();
    for warning in &validation.warnings {
        tracing::warn!(?warning, "registration warning");
    }

    let provider = services.try_build()?;
    tracing::info!("Starting application");

    let scope_a = provider.create_labeled_scope("A");
    let scoped_in_a = run_unit_of_work(&scope_a)?;
    scope_a.dispose();

    let scope_b = provider.create_labeled_scope("B");
    let scoped_in_b = run_unit_of_work(&scope_b)?;
    scope_b.dispose();

    let printer = provider.get_required_trait::<dyn Printer>();
    report(printer.as_ref(), "main", "scoped A vs B", scoped_in_a, scoped_in_b);
    tracing::info!("All done!");
    Ok(())
}
