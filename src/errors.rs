mod dependency_resolver;
mod instantiate;
mod validation;

pub use dependency_resolver::ResolveErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use validation::ValidationErrorKind;

pub type InstantiatorResult<Dep> = Result<Dep, InstantiateErrorKind>;
