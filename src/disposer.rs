use core::any::type_name;
use tracing::error;

use crate::{
    context::Context,
    utils::thread_safety::{RcAnyThreadSafety, RcThreadSafety, SendSafety, SyncSafety},
};

/// Type-erased disposer stored in a descriptor
pub(crate) trait DisposerFn: Fn(RcAnyThreadSafety, &Context) + SendSafety + SyncSafety {}

impl<F> DisposerFn for F where F: Fn(RcAnyThreadSafety, &Context) + SendSafety + SyncSafety {}

pub(crate) type BoxedDisposer = RcThreadSafety<dyn DisposerFn>;

#[must_use]
pub(crate) fn boxed_disposer<Dep, Disp>(disposer: Disp) -> BoxedDisposer
where
    Dep: SendSafety + SyncSafety + 'static,
    Disp: Fn(RcThreadSafety<Dep>, &Context) + SendSafety + SyncSafety + 'static,
{
    let boxed: BoxedDisposer = RcThreadSafety::new(move |instance: RcAnyThreadSafety, context: &Context| {
        match instance.downcast::<Dep>() {
            Ok(instance) => disposer(instance, context),
            // The instance always comes from the same descriptor as the disposer
            Err(_) => error!(expected = type_name::<Dep>(), "Disposer got an instance of another type"),
        }
    });
    boxed
}
