use tracing::debug;

use crate::{
    context::Context,
    errors::InstantiateErrorKind,
    resolver::Resolver,
    utils::thread_safety::{RcAnyThreadSafety, RcThreadSafety, SendSafety, SyncSafety},
};

/// Type-erased factory stored in a descriptor
pub(crate) trait InstantiatorFn:
    Fn(&Context, &dyn Resolver) -> Result<RcAnyThreadSafety, InstantiateErrorKind> + SendSafety + SyncSafety
{
}

impl<F> InstantiatorFn for F where
    F: Fn(&Context, &dyn Resolver) -> Result<RcAnyThreadSafety, InstantiateErrorKind> + SendSafety + SyncSafety
{
}

pub(crate) type BoxedInstantiator = RcThreadSafety<dyn InstantiatorFn>;

#[must_use]
pub(crate) fn boxed_instantiator<Dep, Inst>(instantiator: Inst) -> BoxedInstantiator
where
    Dep: SendSafety + SyncSafety + 'static,
    Inst: Fn(&Context, &dyn Resolver) -> Result<Dep, InstantiateErrorKind> + SendSafety + SyncSafety + 'static,
{
    let boxed: BoxedInstantiator = RcThreadSafety::new(
        move |context: &Context, resolver: &dyn Resolver| -> Result<RcAnyThreadSafety, InstantiateErrorKind> {
            let dependency = instantiator(context, resolver)?;

            debug!("Instantiated");

            Ok(RcThreadSafety::new(dependency) as RcAnyThreadSafety)
        },
    );
    boxed
}

/// Wrapper to create a factory that just returns clones of the passed value.
/// It can be used when the value was created outside the registry.
#[inline]
#[must_use]
pub fn instance<T>(val: T) -> impl Fn(&Context, &dyn Resolver) -> Result<T, InstantiateErrorKind> + SendSafety + SyncSafety + 'static
where
    T: Clone + SendSafety + SyncSafety + 'static,
{
    move |_: &Context, _: &dyn Resolver| -> Result<T, InstantiateErrorKind> { Ok(val.clone()) }
}
