//! Error types for recipes and the recipe runner

use drl_core::DrlError;
use thiserror::Error;

/// Errors returned by [`crate::RecipeRunner`] and recipe lookup
#[derive(Debug, Error)]
pub enum RecipeError {
    /// Parsing or rewriting failed
    #[error(transparent)]
    Core(#[from] DrlError),

    /// No built-in recipe has this id
    #[error("Unknown recipe '{id}'")]
    UnknownRecipe { id: String },
}

impl RecipeError {
    /// Check if processing of other files can continue
    pub fn is_recoverable(&self) -> bool {
        match self {
            RecipeError::Core(err) => err.is_recoverable(),
            RecipeError::UnknownRecipe { .. } => false,
        }
    }
}

/// Result type alias for recipe operations
pub type Result<T> = std::result::Result<T, RecipeError>;
