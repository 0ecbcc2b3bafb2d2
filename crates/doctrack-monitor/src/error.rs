/// Errors that can occur while running a monitor pass.
///
/// # Examples
///
/// ```rust
/// use doctrack_monitor::error::MonitorError;
///
/// let err = MonitorError::PassInProgress;
/// assert!(err.to_string().contains("already in progress"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// A database read or write failed. The whole pass is rolled back.
    #[error("Monitor: database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Another pass holds the run guard in this process.
    #[error("Monitor: a pass is already in progress")]
    PassInProgress,
}

/// Convenience `Result` alias for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
