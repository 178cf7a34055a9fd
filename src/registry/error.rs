//! Registry error taxonomy.

use thiserror::Error;

use crate::handler::HandlerError;

/// Errors reported synchronously by the alias registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A required input was missing or malformed. Nothing was mutated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The alias is already owned by another servlet.
    #[error("alias {0} is already in use")]
    DuplicateAlias(String),

    /// No servlet is registered under the alias.
    #[error("nothing registered at {0}")]
    AliasNotFound(String),

    /// The handler registry refused the descriptor. The alias was not recorded.
    #[error("handler installation failed: {0}")]
    Install(#[from] HandlerError),
}

impl RegistryError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::InvalidArgument(_) => "invalid_argument",
            RegistryError::DuplicateAlias(_) => "duplicate_alias",
            RegistryError::AliasNotFound(_) => "alias_not_found",
            RegistryError::Install(_) => "install_failed",
        }
    }
}
