use alloc::{collections::BTreeMap, vec::Vec};
use core::mem;
use parking_lot::Mutex;
use tracing::debug;

use crate::{context::Context, disposer::BoxedDisposer, key::ServiceKey, utils::thread_safety::RcAnyThreadSafety};

/// Created instance paired with the disposer captured from its descriptor
#[derive(Clone)]
pub(crate) struct ServiceHandle {
    pub(crate) instance: RcAnyThreadSafety,
    pub(crate) disposer: Option<BoxedDisposer>,
}

impl ServiceHandle {
    #[inline]
    pub(crate) fn dispose(self, context: &Context) {
        if let Some(disposer) = self.disposer {
            disposer(self.instance, context);
        }
    }
}

/// Get-or-create cache keyed by the canonical alias key.
/// Handles are kept in insertion order, which is the order they are disposed in.
#[derive(Clone, Default)]
pub(crate) struct Cache {
    index: BTreeMap<ServiceKey, usize>,
    handles: Vec<ServiceHandle>,
}

impl Cache {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            index: BTreeMap::new(),
            handles: Vec::new(),
        }
    }

    #[must_use]
    pub(crate) fn get(&self, key: &str) -> Option<RcAnyThreadSafety> {
        self.index.get(key).map(|position| self.handles[*position].instance.clone())
    }

    /// Stores the handle unless the key is already cached.
    /// Returns the instance that ends up cached under the key.
    pub(crate) fn get_or_insert(&mut self, key: &str, handle: ServiceHandle) -> RcAnyThreadSafety {
        if let Some(instance) = self.get(key) {
            return instance;
        }

        let instance = handle.instance.clone();
        self.index.insert(key.into(), self.handles.len());
        self.handles.push(handle);
        instance
    }

    #[inline]
    #[must_use]
    pub(crate) fn take_handles(&mut self) -> Vec<ServiceHandle> {
        self.index.clear();
        mem::take(&mut self.handles)
    }
}

/// Cache of single instances shared by a root scope and all of its descendants.
///
/// The root disposes it when it ends. Whatever is created after that, by a child that outlives the root,
/// is disposed with the root's context when the last scope sharing the cache is dropped.
pub(crate) struct SharedCache {
    pub(crate) cache: Mutex<Cache>,
    context: Context,
}

impl SharedCache {
    #[must_use]
    pub(crate) fn new(context: Context) -> Self {
        Self {
            cache: Mutex::new(Cache::new()),
            context,
        }
    }
}

impl Drop for SharedCache {
    fn drop(&mut self) {
        let handles = self.cache.get_mut().take_handles();
        if handles.is_empty() {
            return;
        }

        let count = handles.len();
        for handle in handles {
            handle.dispose(&self.context);
        }

        debug!(count, "Single instances disposed after the root scope");
    }
}

/// Handles created in one scope with the on-demand lifetime.
/// They are never reused, only kept to be disposed.
#[derive(Clone, Default)]
pub(crate) struct HandleList(pub(crate) Vec<ServiceHandle>);

impl HandleList {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub(crate) fn push(&mut self, handle: ServiceHandle) {
        self.0.push(handle);
    }

    #[inline]
    #[must_use]
    pub(crate) fn take(&mut self) -> Vec<ServiceHandle> {
        mem::take(&mut self.0)
    }
}
