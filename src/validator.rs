use alloc::{
    borrow::ToOwned as _,
    collections::BTreeSet,
    string::{String, ToString},
    vec::Vec,
};
use core::cell::RefCell;
use tracing::{debug, info_span, warn};

use crate::{
    context::Context,
    errors::{ResolveErrorKind, ValidationErrorKind},
    key::ServiceKey,
    lifetime::Lifetime,
    registry::Registry,
    resolver::Resolver,
    utils::thread_safety::RcAnyThreadSafety,
};

/// Resolver of one validation pass.
///
/// It runs the real factories with the stand-in context, but stops at every defective edge
/// and answers it with [`ResolveErrorKind::StandIn`] instead of an instance.
struct SimulatingResolver<'a> {
    registry: &'a Registry,
    context: &'a Context,
    root: &'a str,
    root_lifetime: Lifetime,
    visited: RefCell<BTreeSet<ServiceKey>>,
    findings: RefCell<Vec<ValidationErrorKind>>,
}

impl<'a> SimulatingResolver<'a> {
    fn new(registry: &'a Registry, context: &'a Context, root: &'a str, root_lifetime: Lifetime) -> Self {
        Self {
            registry,
            context,
            root,
            root_lifetime,
            visited: RefCell::new(BTreeSet::new()),
            findings: RefCell::new(Vec::new()),
        }
    }

    fn report(&self, key: &str, finding: ValidationErrorKind) -> ResolveErrorKind {
        warn!("{}", finding);
        self.findings.borrow_mut().push(finding);
        ResolveErrorKind::StandIn { key: key.to_owned() }
    }

    fn into_findings(self) -> Vec<ValidationErrorKind> {
        self.findings.into_inner()
    }
}

impl Resolver for SimulatingResolver<'_> {
    fn resolve(&self, key: &str) -> Result<RcAnyThreadSafety, ResolveErrorKind> {
        let Some(entry) = self.registry.get(key) else {
            return Err(self.report(
                key,
                ValidationErrorKind::MissingDependency {
                    root: self.root.to_owned(),
                    dependency: key.to_owned(),
                },
            ));
        };

        let visited = {
            let visited = self.visited.borrow();
            entry.aliases().iter().any(|alias| visited.contains(alias))
        };
        if visited {
            return Err(self.report(
                key,
                ValidationErrorKind::CircularDependency {
                    root: self.root.to_owned(),
                    dependency: key.to_owned(),
                },
            ));
        }

        if self.root_lifetime.ordinal() < entry.lifetime().ordinal() {
            return Err(self.report(
                key,
                ValidationErrorKind::ScopeViolation {
                    root: self.root.to_owned(),
                    root_lifetime: self.root_lifetime,
                    dependency: key.to_owned(),
                    dependency_lifetime: entry.lifetime(),
                },
            ));
        }

        self.visited.borrow_mut().extend(entry.aliases().iter().cloned());
        debug!(dependency = key, "Edge traversed");

        entry
            .descriptor()
            .instantiate(self.context, self)
            .map_err(|source| ResolveErrorKind::Instantiator {
                key: key.to_owned(),
                source,
            })
    }
}

/// Walks the dependency graph of every registered service without touching any scope.
///
/// Each registry entry gets an independent pass, in registry order, with its own visited set.
/// A pass runs the entry's factory with [`Context::StandIn`] and a resolver that reports
/// missing dependencies, circular dependencies and dependencies with a more embracing lifetime
/// than the root's one.
///
/// # Warning
/// A stopped edge is handed to the factory as an error. A factory that returns early on it with `?`
/// doesn't request its remaining dependencies, so their defects aren't reported in that pass.
#[must_use]
pub fn validate(registry: &Registry) -> Vec<ValidationErrorKind> {
    let context = Context::stand_in();
    let mut findings = Vec::new();

    for (root, entry) in registry.iter() {
        let span = info_span!("validate", root);
        let _guard = span.enter();

        let resolver = SimulatingResolver::new(registry, &context, root, entry.lifetime());
        if let Err(err) = entry.descriptor().instantiate(&context, &resolver) {
            debug!(%err, "Factory failed during validation");
        }

        findings.extend(resolver.into_findings());
    }

    debug!(count = findings.len(), "Registry validated");

    findings
}

/// Same as [`validate`], but returns the findings as human-readable lines.
/// An empty list means no defects were found.
#[must_use]
pub fn validate_registry(registry: &Registry) -> Vec<String> {
    validate(registry).iter().map(ToString::to_string).collect()
}
