use alloc::{borrow::ToOwned, string::String, vec, vec::Vec};

pub type ServiceKey = String;

/// Keys a descriptor is registered under.
///
/// Several keys registered together are aliases: they share one descriptor and one cached instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Keys {
    Single(ServiceKey),
    Many(Vec<ServiceKey>),
}

impl Keys {
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<ServiceKey> {
        match self {
            Keys::Single(key) => vec![key],
            Keys::Many(keys) => keys,
        }
    }
}

impl From<&str> for Keys {
    fn from(key: &str) -> Self {
        Keys::Single(key.to_owned())
    }
}

impl From<String> for Keys {
    fn from(key: String) -> Self {
        Keys::Single(key)
    }
}

impl<const N: usize> From<[&str; N]> for Keys {
    fn from(keys: [&str; N]) -> Self {
        Keys::Many(keys.iter().map(|key| (*key).to_owned()).collect())
    }
}

impl From<&[&str]> for Keys {
    fn from(keys: &[&str]) -> Self {
        Keys::Many(keys.iter().map(|key| (*key).to_owned()).collect())
    }
}

impl From<Vec<&str>> for Keys {
    fn from(keys: Vec<&str>) -> Self {
        Keys::Many(keys.into_iter().map(ToOwned::to_owned).collect())
    }
}

impl From<Vec<String>> for Keys {
    fn from(keys: Vec<String>) -> Self {
        Keys::Many(keys)
    }
}
