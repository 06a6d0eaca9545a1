//! Build-time validation of declared dependencies.
//!
//! Only dependencies declared on descriptors are visible here; services a
//! factory resolves dynamically are checked when they are resolved.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::ContainerOptions;
use crate::registration::Registry;
use crate::{DiError, DiResult, Key, Lifetime};

/// A registration problem that will fail at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{service} depends on unregistered {dependency}")]
    MissingDependency {
        service: &'static str,
        dependency: &'static str,
    },
    #[error("Circular dependency: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<&'static str> },
    #[error("Singleton {singleton} depends on scoped service {scoped}")]
    SingletonDependsOnScoped {
        singleton: &'static str,
        scoped: &'static str,
    },
}

/// A registration that works but probably does not do what was meant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// The transient is constructed once and then lives as long as the singleton.
    SingletonDependsOnTransient {
        singleton: &'static str,
        transient: &'static str,
    },
    /// The singleton captures the scoped instance of whichever scope built it.
    SingletonDependsOnScoped {
        singleton: &'static str,
        scoped: &'static str,
    },
}

/// Outcome of [`ServiceCollection::validate`](crate::ServiceCollection::validate).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Maps the first error onto the resolution error it would cause.
    pub fn into_result(self) -> DiResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(ValidationError::MissingDependency { dependency, .. }) => Err(DiError::NotFound(dependency)),
            Some(ValidationError::CircularDependency { cycle }) => Err(DiError::Circular(cycle)),
            Some(ValidationError::SingletonDependsOnScoped { singleton, scoped }) => {
                Err(DiError::CaptiveDependency { singleton, scoped })
            }
        }
    }
}

pub(crate) fn validate_registry(registry: &Registry, options: &ContainerOptions) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (key, reg) in registry.iter() {
        for dep in &reg.dependencies {
            if !registry.contains_key(dep) {
                report.errors.push(ValidationError::MissingDependency {
                    service: key.display_name(),
                    dependency: dep.display_name(),
                });
            }
        }
    }

    find_cycles(registry, &mut report);

    for (key, reg) in registry.iter() {
        if reg.lifetime == Lifetime::Singleton {
            check_captive(registry, key, options, &mut report);
        }
    }

    report
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

fn find_cycles(registry: &Registry, report: &mut ValidationReport) {
    let mut marks: HashMap<Key, Mark> = HashMap::new();
    for (key, _) in registry.iter() {
        let mut stack = Vec::new();
        visit(registry, *key, &mut marks, &mut stack, report);
    }
}

fn visit(
    registry: &Registry,
    key: Key,
    marks: &mut HashMap<Key, Mark>,
    stack: &mut Vec<Key>,
    report: &mut ValidationReport,
) {
    match marks.get(&key) {
        Some(Mark::Done) => return,
        Some(Mark::InProgress) => {
            if let Some(start) = stack.iter().position(|k| *k == key) {
                let mut cycle: Vec<&'static str> = stack[start..].iter().map(|k| k.display_name()).collect();
                cycle.push(key.display_name());
                report.errors.push(ValidationError::CircularDependency { cycle });
            }
            return;
        }
        None => {}
    }

    let Some(reg) = registry.get(&key) else {
        // Reported as missing already
        return;
    };

    marks.insert(key, Mark::InProgress);
    stack.push(key);
    for dep in &reg.dependencies {
        visit(registry, *dep, marks, stack, report);
    }
    stack.pop();
    marks.insert(key, Mark::Done);
}

/// Follows a singleton's declared dependencies through transients, which it
/// captures, stopping at other singletons.
fn check_captive(registry: &Registry, singleton: &Key, options: &ContainerOptions, report: &mut ValidationReport) {
    let Some(reg) = registry.get(singleton) else {
        return;
    };
    let singleton_name = singleton.display_name();
    let mut seen: HashSet<Key> = HashSet::new();
    let mut pending: Vec<(Key, bool)> = reg.dependencies.iter().map(|dep| (*dep, true)).collect();

    while let Some((dep, direct)) = pending.pop() {
        if !seen.insert(dep) {
            continue;
        }
        let Some(dep_reg) = registry.get(&dep) else {
            continue;
        };
        match dep_reg.lifetime {
            Lifetime::Singleton => {}
            Lifetime::Scoped => {
                let scoped = dep.display_name();
                if options.validate_scopes {
                    report.errors.push(ValidationError::SingletonDependsOnScoped {
                        singleton: singleton_name,
                        scoped,
                    });
                } else {
                    report.warnings.push(ValidationWarning::SingletonDependsOnScoped {
                        singleton: singleton_name,
                        scoped,
                    });
                }
            }
            Lifetime::Transient => {
                if direct {
                    report.warnings.push(ValidationWarning::SingletonDependsOnTransient {
                        singleton: singleton_name,
                        transient: dep.display_name(),
                    });
                }
                pending.extend(dep_reg.dependencies.iter().map(|d| (*d, false)));
            }
        }
    }
}
