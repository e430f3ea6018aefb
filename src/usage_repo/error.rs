// Store-level errors for the usage repository.

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value does not fit the model type (e.g. a code above 255).
    #[error("{table}.{column} holds out-of-range value {value}")]
    InvalidColumn {
        table: &'static str,
        column: &'static str,
        value: i64,
    },
}
