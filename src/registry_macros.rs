/// Builds a [`Registry`](crate::Registry) from entries grouped by lifetime.
///
/// ```
/// use keyscope::{instance, registry, Context, Resolver, InstantiateErrorKind};
///
/// struct Pool(u8);
///
/// let registry = registry! {
///     lifetime(SingleInstance) [
///         provide("pool", |_: &Context, _: &dyn Resolver| Ok::<_, InstantiateErrorKind>(Pool(4))),
///     ],
///     lifetime(OnDemand) [
///         provide(["port", "listen_port"], instance(8080u16)),
///         provide("name", instance("keyscope"), disposer = |_, _| {}),
///     ],
/// };
///
/// assert_eq!(registry.len(), 4);
/// ```
#[macro_export]
macro_rules! registry {
    (
        $(
            lifetime($lifetime:ident) [ $( $entries:tt )* ]
        ),* $(,)?
    ) => {{
        let builder = $crate::RegistryBuilder::new();
        $(
            let builder = $crate::registry_internal! { @entries builder, $lifetime [ $($entries)* ] };
        )*
        builder.build()
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! registry_internal {
    // === Base case ===
    // Example: registry_internal! { @entries builder, Transient [] }
    (@entries $builder:expr, $lifetime:ident []) => {
        $builder
    };

    // === Provide entries ===
    // Example: registry_internal! { @entries builder, Transient [ provide("a", inst_a), provide("b", inst_b) ] }
    (@entries $builder:expr, $lifetime:ident [ provide( $($entry:tt)+ ) $(, $($rest:tt)*)? ]) => {
        $crate::registry_internal! {
            @entries $crate::registry_internal! { @entry $builder, $lifetime, $($entry)+ },
            $lifetime [ $($($rest)*)? ]
        }
    };

    // === Entry with disposer ===
    // Example: registry_internal! { @entry builder, Transient, ["a", "b"], inst_a, disposer = disp_a }
    (@entry $builder:expr, $lifetime:ident, $keys:expr, $inst:expr, disposer = $disp:expr) => {
        $builder.provide_with_disposer($keys, $crate::Lifetime::$lifetime, $inst, $disp)
    };

    // === Entry without disposer ===
    // Example: registry_internal! { @entry builder, Transient, "a", inst_a }
    (@entry $builder:expr, $lifetime:ident, $keys:expr, $inst:expr) => {
        $builder.provide($keys, $crate::Lifetime::$lifetime, $inst)
    };
}
