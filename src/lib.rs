#![no_std]

extern crate alloc;

pub(crate) mod cache;
pub(crate) mod context;
pub(crate) mod disposer;
pub(crate) mod errors;
pub(crate) mod instantiator;
pub(crate) mod key;
pub(crate) mod lifetime;
pub(crate) mod registry;
pub(crate) mod resolver;
pub(crate) mod scope;
pub(crate) mod validator;

pub(crate) mod registry_macros;
pub mod utils;

pub use context::Context;
pub use errors::{InstantiateErrorKind, InstantiatorResult, ResolveErrorKind, ValidationErrorKind};
pub use instantiator::instance;
pub use key::{Keys, ServiceKey};
pub use lifetime::Lifetime;
pub use registry::{Registry, RegistryBuilder, ServiceDescriptor, ServiceEntry};
pub use resolver::Resolver;
pub use scope::Scope;
pub use validator::{validate, validate_registry};
