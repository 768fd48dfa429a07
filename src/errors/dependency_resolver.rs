use super::instantiate::InstantiateErrorKind;
use crate::key::ServiceKey;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Service with key {key} is not registered")]
    Unregistered { key: ServiceKey },
    #[error("Incorrect service type for key {key}. Expected: {expected}")]
    IncorrectType { key: ServiceKey, expected: &'static str },
    #[error("Service with key {key} is only simulated during validation")]
    StandIn { key: ServiceKey },
    #[error("Instantiator of service with key {key} failed: {source}")]
    Instantiator {
        key: ServiceKey,
        #[source]
        source: InstantiateErrorKind,
    },
}

impl ResolveErrorKind {
    /// Key of the service whose resolution failed
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            ResolveErrorKind::Unregistered { key }
            | ResolveErrorKind::IncorrectType { key, .. }
            | ResolveErrorKind::StandIn { key }
            | ResolveErrorKind::Instantiator { key, .. } => key,
        }
    }
}
