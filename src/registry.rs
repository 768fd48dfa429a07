use alloc::{collections::BTreeMap, vec::Vec};
use tracing::debug;

use crate::{
    context::Context,
    disposer::{boxed_disposer, BoxedDisposer},
    errors::InstantiateErrorKind,
    instantiator::{boxed_instantiator, BoxedInstantiator},
    key::{Keys, ServiceKey},
    lifetime::Lifetime,
    resolver::Resolver,
    utils::thread_safety::{same_allocation, RcAnyThreadSafety, RcThreadSafety, SendSafety, SyncSafety},
};

/// Immutable recipe of one service: its lifetime, factory and optional disposer
pub struct ServiceDescriptor {
    lifetime: Lifetime,
    instantiator: BoxedInstantiator,
    disposer: Option<BoxedDisposer>,
}

impl ServiceDescriptor {
    #[inline]
    #[must_use]
    pub const fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    #[inline]
    #[must_use]
    pub const fn has_disposer(&self) -> bool {
        self.disposer.is_some()
    }

    #[inline]
    pub(crate) fn instantiate(&self, context: &Context, resolver: &dyn Resolver) -> Result<RcAnyThreadSafety, InstantiateErrorKind> {
        (self.instantiator)(context, resolver)
    }

    #[inline]
    pub(crate) fn disposer(&self) -> Option<BoxedDisposer> {
        self.disposer.clone()
    }
}

/// Registry entry of one key
#[derive(Clone)]
pub struct ServiceEntry {
    descriptor: RcThreadSafety<ServiceDescriptor>,
    aliases: RcThreadSafety<[ServiceKey]>,
}

impl ServiceEntry {
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    #[inline]
    #[must_use]
    pub fn lifetime(&self) -> Lifetime {
        self.descriptor.lifetime
    }

    /// All keys bound to the same descriptor, in registry order
    #[inline]
    #[must_use]
    pub fn aliases(&self) -> &[ServiceKey] {
        &self.aliases
    }

    /// Key the instance of this descriptor is cached under: the first of its aliases
    #[inline]
    #[must_use]
    pub fn canonical_key(&self) -> &str {
        &self.aliases[0]
    }
}

/// Immutable mapping from service key to descriptor.
/// Lookups are by exact key; entries keep their registration order.
#[derive(Clone, Default)]
pub struct Registry {
    entries: Vec<(ServiceKey, ServiceEntry)>,
    positions: BTreeMap<ServiceKey, usize>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ServiceEntry> {
        self.positions.get(key).map(|position| &self.entries[*position].1)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServiceEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}

/// Builder of a [`Registry`].
///
/// The builder is consumed by every call and can be cloned to branch.
/// Re-registering a key replaces its descriptor and keeps the key's position.
#[derive(Clone, Default)]
pub struct RegistryBuilder {
    entries: Vec<(ServiceKey, RcThreadSafety<ServiceDescriptor>)>,
}

impl RegistryBuilder {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registers a factory under one key or under several alias keys
    #[inline]
    #[must_use]
    pub fn provide<Dep, Inst>(self, keys: impl Into<Keys>, lifetime: Lifetime, instantiator: Inst) -> Self
    where
        Dep: SendSafety + SyncSafety + 'static,
        Inst: Fn(&Context, &dyn Resolver) -> Result<Dep, InstantiateErrorKind> + SendSafety + SyncSafety + 'static,
    {
        self.add_descriptor(
            keys.into(),
            ServiceDescriptor {
                lifetime,
                instantiator: boxed_instantiator(instantiator),
                disposer: None,
            },
        )
    }

    /// Registers a factory with [`Lifetime::OnDemand`], the default lifetime
    #[inline]
    #[must_use]
    pub fn provide_on_demand<Dep, Inst>(self, keys: impl Into<Keys>, instantiator: Inst) -> Self
    where
        Dep: SendSafety + SyncSafety + 'static,
        Inst: Fn(&Context, &dyn Resolver) -> Result<Dep, InstantiateErrorKind> + SendSafety + SyncSafety + 'static,
    {
        self.provide(keys, Lifetime::default(), instantiator)
    }

    /// Registers a factory together with a disposer.
    /// The disposer is called once per created instance when the scope owning the instance ends.
    ///
    /// # Warning
    /// Instances with [`Lifetime::SingleInstance`] are owned by the root scope,
    /// so their disposer is only called when the root scope ends.
    #[inline]
    #[must_use]
    pub fn provide_with_disposer<Dep, Inst, Disp>(self, keys: impl Into<Keys>, lifetime: Lifetime, instantiator: Inst, disposer: Disp) -> Self
    where
        Dep: SendSafety + SyncSafety + 'static,
        Inst: Fn(&Context, &dyn Resolver) -> Result<Dep, InstantiateErrorKind> + SendSafety + SyncSafety + 'static,
        Disp: Fn(RcThreadSafety<Dep>, &Context) + SendSafety + SyncSafety + 'static,
    {
        self.add_descriptor(
            keys.into(),
            ServiceDescriptor {
                lifetime,
                instantiator: boxed_instantiator(instantiator),
                disposer: Some(boxed_disposer(disposer)),
            },
        )
    }

    #[must_use]
    pub fn build(self) -> Registry {
        let mut entries: Vec<(ServiceKey, ServiceEntry)> = Vec::with_capacity(self.entries.len());
        let mut positions = BTreeMap::new();

        for (key, descriptor) in &self.entries {
            let aliases = match entries.iter().find(|(_, entry)| same_allocation(&entry.descriptor, descriptor)) {
                Some((_, entry)) => entry.aliases.clone(),
                None => self
                    .entries
                    .iter()
                    .filter(|(_, other)| same_allocation(other, descriptor))
                    .map(|(alias, _)| alias.clone())
                    .collect(),
            };

            positions.insert(key.clone(), entries.len());
            entries.push((
                key.clone(),
                ServiceEntry {
                    descriptor: descriptor.clone(),
                    aliases,
                },
            ));
        }

        debug!(entries = entries.len(), "Registry built");

        Registry { entries, positions }
    }
}

impl RegistryBuilder {
    fn add_descriptor(mut self, keys: Keys, descriptor: ServiceDescriptor) -> Self {
        let keys = keys.into_vec();
        if keys.is_empty() {
            debug!("Descriptor without keys skipped");
            return self;
        }

        let descriptor = RcThreadSafety::new(descriptor);
        for key in keys {
            match self.entries.iter_mut().find(|(registered, _)| *registered == key) {
                Some((_, registered)) => {
                    debug!(key = key.as_str(), "Descriptor replaced");
                    *registered = descriptor.clone();
                }
                None => self.entries.push((key, descriptor.clone())),
            }
        }

        self
    }
}
