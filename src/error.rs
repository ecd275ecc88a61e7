//! Error type for render passes.

use std::error::Error as StdError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

/// Reasons a render pass can fail.
///
/// Everything here is a collaborator or caller problem; internal pixel
/// bookkeeping mistakes are debug assertions, not errors.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("{drawings} drawings supplied with {plans} plans")]
    PlanMismatch { drawings: usize, plans: usize },

    #[error("invalid plot bounds {width}x{height}")]
    InvalidBounds { width: i32, height: i32 },

    #[error("layer {layer}: {reason}")]
    Plan { layer: usize, reason: String },

    #[error("data store error: {0}")]
    DataStore(#[source] Box<dyn StdError + Send + Sync>),
}

impl RenderError {
    /// Wrap a collaborator's data access failure.
    pub fn data_store<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        RenderError::DataStore(err.into())
    }
}
