#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Required column '{column}' missing from query results")]
    MissingColumn { column: &'static str },

    #[error("Validation failed: {0}")]
    Validation(String),
}
