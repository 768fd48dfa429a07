use alloc::{boxed::Box, string::String};

use super::dependency_resolver::ResolveErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error(transparent)]
    Deps(Box<ResolveErrorKind>),
    #[error("Context field {path} not found")]
    MissingContext { path: String },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl From<ResolveErrorKind> for InstantiateErrorKind {
    #[inline]
    fn from(err: ResolveErrorKind) -> Self {
        InstantiateErrorKind::Deps(Box::new(err))
    }
}
