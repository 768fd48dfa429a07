use core::fmt::{self, Display, Formatter};

/// Lifetime policy of a registered service.
///
/// Policies are ordered by how widely an instance is shared,
/// `OnDemand < SingleInstance < Transient`, and the validator compares them by [`Lifetime::ordinal`].
///
/// - [`Lifetime::OnDemand`]: a new instance on every resolution, never cached.
/// - [`Lifetime::SingleInstance`]: one instance for the root scope and all of its descendants.
/// - [`Lifetime::Transient`]: one instance per scope, discarded when the scope ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Lifetime {
    #[default]
    OnDemand = 1,
    SingleInstance = 2,
    Transient = 3,
}

impl Lifetime {
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Lifetime::OnDemand => "OnDemand",
            Lifetime::SingleInstance => "SingleInstance",
            Lifetime::Transient => "Transient",
        }
    }

    #[inline]
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }
}

impl Display for Lifetime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::Lifetime::{self, *};

    use alloc::string::ToString as _;

    #[test]
    fn test_ordering() {
        assert!(OnDemand < SingleInstance);
        assert!(SingleInstance < Transient);
        assert_eq!([OnDemand, SingleInstance, Transient].map(Lifetime::ordinal), [1, 2, 3]);
        assert_eq!(Lifetime::default(), OnDemand);
    }

    #[test]
    fn test_names() {
        assert_eq!(OnDemand.to_string(), "OnDemand");
        assert_eq!(SingleInstance.name(), "SingleInstance");
        assert_eq!(Transient.name(), "Transient");
    }
}
