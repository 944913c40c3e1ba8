use thiserror::Error;

/// Errors raised while composing Veil components.
///
/// The only failure the library reports is a composition mistake: a
/// sub-component resolved from context without its required ancestor. It is
/// not recoverable at runtime; the caller has to fix the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("<{component} /> is missing a parent <{provider} /> component.")]
    MissingContext {
        component: String,
        provider: &'static str,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
