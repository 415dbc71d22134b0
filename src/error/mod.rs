use std::collections::TryReserveError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Allocation Error: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("Validation Error: {0} should be {1}")]
    Validation(String, String),
}
