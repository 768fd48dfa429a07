use alloc::{borrow::ToOwned as _, collections::BTreeMap, string::String, vec::Vec};

use crate::errors::InstantiateErrorKind;

/// Caller-supplied value a scope is bound to.
///
/// Factories and disposers only read from it. Scope-local state is never stored here.
///
/// [`Context::StandIn`] is the inert value the validator hands to factories:
/// every field, index or path access on it yields the stand-in itself,
/// and scalar accessors yield empty defaults, so a factory reading the context never fails for lack of a field.
#[derive(Clone, Debug, PartialEq)]
pub enum Context {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Context>),
    Map(BTreeMap<String, Context>),
    StandIn,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Creates an empty map context
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Context::Map(BTreeMap::new())
    }

    #[inline]
    #[must_use]
    pub const fn stand_in() -> Self {
        Context::StandIn
    }

    #[inline]
    #[must_use]
    pub const fn is_stand_in(&self) -> bool {
        matches!(self, Context::StandIn)
    }

    /// Inserts a field, turning a non-map context into an empty map first.
    /// Writes to the stand-in are ignored.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Context>) -> Option<Context> {
        match self {
            Context::StandIn => None,
            Context::Map(map) => map.insert(field.into(), value.into()),
            other => {
                let mut map = BTreeMap::new();
                map.insert(field.into(), value.into());
                *other = Context::Map(map);
                None
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Context>) -> Self {
        self.insert(field, value);
        self
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Context> {
        match self {
            Context::Map(map) => map.get(field),
            Context::StandIn => Some(self),
            _ => None,
        }
    }

    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Context> {
        match self {
            Context::List(list) => list.get(index),
            Context::StandIn => Some(self),
            _ => None,
        }
    }

    /// Follows a dot-separated path. Numeric segments index into lists.
    #[must_use]
    pub fn path(&self, path: &str) -> Option<&Context> {
        path.split('.').filter(|segment| !segment.is_empty()).try_fold(self, |node, segment| match node {
            Context::List(_) => segment.parse().ok().and_then(|index| node.at(index)),
            _ => node.get(segment),
        })
    }

    /// Same as [`Context::path`], failing with [`InstantiateErrorKind::MissingContext`] so factories can use `?`
    ///
    /// # Errors
    /// Returns [`InstantiateErrorKind::MissingContext`] if nothing is found at `path`
    pub fn require(&self, path: &str) -> Result<&Context, InstantiateErrorKind> {
        self.path(path)
            .ok_or_else(|| InstantiateErrorKind::MissingContext { path: path.to_owned() })
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Context::Str(value) => Some(value.as_str()),
            Context::StandIn => Some(""),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Context::Int(value) => Some(*value),
            Context::StandIn => Some(0),
            _ => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Context::Float(value) => Some(*value),
            Context::Int(value) => Some(*value as f64),
            Context::StandIn => Some(0.0),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Context::Bool(value) => Some(*value),
            Context::StandIn => Some(false),
            _ => None,
        }
    }
}

impl From<bool> for Context {
    fn from(value: bool) -> Self {
        Context::Bool(value)
    }
}

impl From<i64> for Context {
    fn from(value: i64) -> Self {
        Context::Int(value)
    }
}

impl From<i32> for Context {
    fn from(value: i32) -> Self {
        Context::Int(value.into())
    }
}

impl From<u32> for Context {
    fn from(value: u32) -> Self {
        Context::Int(value.into())
    }
}

impl From<f64> for Context {
    fn from(value: f64) -> Self {
        Context::Float(value)
    }
}

impl From<&str> for Context {
    fn from(value: &str) -> Self {
        Context::Str(value.to_owned())
    }
}

impl From<String> for Context {
    fn from(value: String) -> Self {
        Context::Str(value)
    }
}

impl From<Vec<Context>> for Context {
    fn from(value: Vec<Context>) -> Self {
        Context::List(value)
    }
}

impl From<BTreeMap<String, Context>> for Context {
    fn from(value: BTreeMap<String, Context>) -> Self {
        Context::Map(value)
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<Context>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Context::Map(iter.into_iter().map(|(field, value)| (field.into(), value.into())).collect())
    }
}
