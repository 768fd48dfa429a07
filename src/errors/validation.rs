use crate::{key::ServiceKey, lifetime::Lifetime};

/// Defect found by the validator.
///
/// These are reported as data, never raised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    #[error("Root Service with key {root} depends on a service keyed {dependency} which does not exist.")]
    MissingDependency { root: ServiceKey, dependency: ServiceKey },
    #[error("Root Service with key {root} has a circular dependency with {dependency}.")]
    CircularDependency { root: ServiceKey, dependency: ServiceKey },
    #[error(
        "Root Service with key {root} has a scope of {root_lifetime} which is less embracing than {dependency} scope of {dependency_lifetime}."
    )]
    ScopeViolation {
        root: ServiceKey,
        root_lifetime: Lifetime,
        dependency: ServiceKey,
        dependency_lifetime: Lifetime,
    },
}

impl ValidationErrorKind {
    #[inline]
    #[must_use]
    pub fn root(&self) -> &str {
        match self {
            ValidationErrorKind::MissingDependency { root, .. }
            | ValidationErrorKind::CircularDependency { root, .. }
            | ValidationErrorKind::ScopeViolation { root, .. } => root,
        }
    }
}
