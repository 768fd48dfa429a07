use alloc::borrow::ToOwned as _;
use core::any::type_name;
use tracing::error;

use crate::{
    errors::ResolveErrorKind,
    utils::thread_safety::{RcAnyThreadSafety, RcThreadSafety, SendSafety, SyncSafety},
};

/// Key-resolution capability handed to factories.
///
/// Factories receive it as `&dyn Resolver` and call [`get`](#method.get) for each dependency.
/// They must not assume any resolution order of sibling dependencies.
///
/// # Validation
/// During [`crate::validate`] the resolver answers every defective dependency with [`ResolveErrorKind::StandIn`].
/// A factory that returns on it with `?` doesn't request its remaining dependencies,
/// so only the first defective dependency of that factory is reported.
/// Resolve every dependency before propagating the first error to get all of them reported.
pub trait Resolver {
    /// Resolves a key to a type-erased instance
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::Unregistered`] if the key has no descriptor,
    /// or the error of the instantiator that produced the instance
    fn resolve(&self, key: &str) -> Result<RcAnyThreadSafety, ResolveErrorKind>;
}

impl dyn Resolver + '_ {
    /// Resolves a key and downcasts the instance
    ///
    /// # Errors
    /// Returns the errors of [`Resolver::resolve`],
    /// or [`ResolveErrorKind::IncorrectType`] if the instance isn't a `Dep`
    #[inline]
    pub fn get<Dep: SendSafety + SyncSafety + 'static>(&self, key: &str) -> Result<RcThreadSafety<Dep>, ResolveErrorKind> {
        downcast(key, self.resolve(key)?)
    }
}

pub(crate) fn downcast<Dep: SendSafety + SyncSafety + 'static>(
    key: &str,
    instance: RcAnyThreadSafety,
) -> Result<RcThreadSafety<Dep>, ResolveErrorKind> {
    instance.downcast::<Dep>().map_err(|_| {
        let err = ResolveErrorKind::IncorrectType {
            key: key.to_owned(),
            expected: type_name::<Dep>(),
        };
        error!("{}", err);
        err
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{downcast, Resolver};
    use crate::{
        errors::ResolveErrorKind,
        utils::thread_safety::{RcAnyThreadSafety, RcThreadSafety},
    };

    use alloc::{
        borrow::ToOwned as _,
        format,
        string::{String, ToString as _},
    };
    use tracing_test::traced_test;

    struct Fixed;

    impl Resolver for Fixed {
        fn resolve(&self, key: &str) -> Result<RcAnyThreadSafety, ResolveErrorKind> {
            match key {
                "number" => Ok(RcThreadSafety::new(42u32)),
                _ => Err(ResolveErrorKind::Unregistered { key: key.to_owned() }),
            }
        }
    }

    #[test]
    #[traced_test]
    fn test_get_through_dyn() {
        let resolver: &dyn Resolver = &Fixed;

        assert_eq!(*resolver.get::<u32>("number").unwrap(), 42);
        assert!(matches!(
            resolver.get::<u32>("missing"),
            Err(ResolveErrorKind::Unregistered { key }) if key == "missing"
        ));
        assert!(matches!(
            resolver.get::<String>("number"),
            Err(ResolveErrorKind::IncorrectType { key, .. }) if key == "number"
        ));
    }

    #[test]
    #[traced_test]
    fn test_downcast_keeps_identity() {
        let instance: RcAnyThreadSafety = RcThreadSafety::new("value".to_string());
        let typed = downcast::<String>("key", instance.clone()).unwrap();

        assert_eq!(typed.as_str(), "value");
        assert_eq!(RcThreadSafety::strong_count(&typed), 2);
    }
}
