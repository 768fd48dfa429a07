use alloc::{borrow::ToOwned as _, vec::Vec};
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    cache::{Cache, HandleList, ServiceHandle, SharedCache},
    context::Context,
    errors::ResolveErrorKind,
    lifetime::Lifetime,
    registry::{Registry, ServiceEntry},
    resolver::{downcast, Resolver},
    utils::thread_safety::{RcAnyThreadSafety, RcThreadSafety, SendSafety, SyncSafety},
};

/// Resolution scope bound to a context.
///
/// A scope resolves keys to instances, caching them according to their [`Lifetime`]:
/// - on-demand instances are created on every call and only tracked to be disposed;
/// - transient instances are cached in the scope itself;
/// - single instances are cached in a cache shared by the root scope and all of its descendants.
///
/// Cloning a scope clones a handle to the same scope.
#[derive(Clone)]
pub struct Scope {
    pub(crate) inner: RcThreadSafety<ScopeInner>,
}

impl Scope {
    /// Creates a root scope.
    /// The root scope owns the instances with [`Lifetime::SingleInstance`] and disposes them when it ends.
    #[inline]
    #[must_use]
    pub fn new(context: Context, registry: Registry) -> Self {
        Self::new_with_shared_registry(context, RcThreadSafety::new(registry))
    }

    /// Creates a root scope over a registry that is already shared, for example by several independent roots
    #[inline]
    #[must_use]
    pub fn new_with_shared_registry(context: Context, registry: RcThreadSafety<Registry>) -> Self {
        Self {
            inner: RcThreadSafety::new(ScopeInner {
                single_instance: RcThreadSafety::new(SharedCache::new(context.clone())),
                context,
                registry,
                on_demand: Mutex::new(HandleList::new()),
                transient: Mutex::new(Cache::new()),
                is_root: true,
            }),
        }
    }

    /// Creates a child scope bound to the new context.
    /// The child shares single instances with this scope, but gets its own transient and on-demand instances.
    /// It isn't responsible for disposing single instances, unless it outlives the root:
    /// single instances created after the root ended are disposed when the last scope sharing them is dropped.
    #[inline]
    #[must_use]
    pub fn create_scope(&self, context: Context) -> Scope {
        debug!(parent_is_root = self.inner.is_root, "Child scope created");

        Scope {
            inner: RcThreadSafety::new(ScopeInner {
                context,
                registry: self.inner.registry.clone(),
                on_demand: Mutex::new(HandleList::new()),
                transient: Mutex::new(Cache::new()),
                single_instance: self.inner.single_instance.clone(),
                is_root: false,
            }),
        }
    }

    /// Gets an instance of the service registered under the key
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::Unregistered`] if the key isn't registered.
    /// - Returns [`ResolveErrorKind::Instantiator`] if the factory or one of its dependencies failed.
    ///   Dependencies created before the failure stay cached.
    /// - Returns [`ResolveErrorKind::IncorrectType`] if the instance isn't a `Dep`.
    ///
    /// # Warning
    /// There is no cycle guard here: a circular registration recurses until the stack is exhausted.
    /// Use [`crate::validate_registry`] to find cycles ahead of time.
    pub fn get<Dep: SendSafety + SyncSafety + 'static>(&self, key: &str) -> Result<RcThreadSafety<Dep>, ResolveErrorKind> {
        downcast(key, self.resolve(key)?)
    }

    /// Ends the scope, calling disposers of the instances it owns.
    ///
    /// Disposers are called once each: on-demand instances in creation order,
    /// then transient instances in insertion order, then, for the root scope only, single instances in insertion order.
    /// Afterwards the scope is empty and can be used again as a fresh one.
    ///
    /// # Panics
    /// A panicking disposer isn't caught: the panic propagates and the remaining instances are dropped without being disposed.
    pub fn end_scope(&self) {
        self.inner.end();
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.inner.context
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.inner.is_root
    }
}

impl Resolver for Scope {
    fn resolve(&self, key: &str) -> Result<RcAnyThreadSafety, ResolveErrorKind> {
        let span = info_span!("get", key, root = self.inner.is_root);
        let _guard = span.enter();

        let Some(entry) = self.inner.registry.get(key) else {
            let err = ResolveErrorKind::Unregistered { key: key.to_owned() };
            error!("{}", err);
            return Err(err);
        };

        match entry.lifetime() {
            Lifetime::OnDemand => {
                let handle = self.instantiate(key, entry)?;
                let instance = handle.instance.clone();
                self.inner.on_demand.lock().push(handle);
                debug!("Tracked as on-demand");
                Ok(instance)
            }
            Lifetime::SingleInstance => self.get_or_create(&self.inner.single_instance.cache, key, entry),
            Lifetime::Transient => self.get_or_create(&self.inner.transient, key, entry),
        }
    }
}

impl Scope {
    fn get_or_create(&self, cache: &Mutex<Cache>, key: &str, entry: &ServiceEntry) -> Result<RcAnyThreadSafety, ResolveErrorKind> {
        let canonical_key = entry.canonical_key();

        let cached = cache.lock().get(canonical_key);
        if let Some(instance) = cached {
            debug!("Found in cache");
            return Ok(instance);
        }
        debug!("Not found in cache");

        // The lock isn't held here, so the factory can resolve from the same cache
        let handle = self.instantiate(key, entry)?;
        let instance = cache.lock().get_or_insert(canonical_key, handle);
        debug!(canonical_key, "Cached");

        Ok(instance)
    }

    fn instantiate(&self, key: &str, entry: &ServiceEntry) -> Result<ServiceHandle, ResolveErrorKind> {
        let descriptor = entry.descriptor();

        match descriptor.instantiate(&self.inner.context, self) {
            Ok(instance) => Ok(ServiceHandle {
                instance,
                disposer: descriptor.disposer(),
            }),
            Err(source) => {
                let err = ResolveErrorKind::Instantiator {
                    key: key.to_owned(),
                    source,
                };
                error!("{}", err);
                Err(err)
            }
        }
    }
}

pub(crate) struct ScopeInner {
    pub(crate) context: Context,
    pub(crate) registry: RcThreadSafety<Registry>,
    pub(crate) on_demand: Mutex<HandleList>,
    pub(crate) transient: Mutex<Cache>,
    pub(crate) single_instance: RcThreadSafety<SharedCache>,
    pub(crate) is_root: bool,
}

impl ScopeInner {
    fn end(&self) {
        let mut handles: Vec<ServiceHandle> = self.on_demand.lock().take();
        handles.append(&mut self.transient.lock().take_handles());
        if self.is_root {
            handles.append(&mut self.single_instance.cache.lock().take_handles());
        }

        let count = handles.len();
        for handle in handles {
            let has_disposer = handle.disposer.is_some();
            handle.dispose(&self.context);
            if has_disposer {
                debug!("Disposer called");
            }
        }

        debug!(count, is_root = self.is_root, "Scope ended");
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.end();
        debug!("Scope ended on drop");
    }
}
