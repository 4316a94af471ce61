//! Command abstractions.

use uuid::Uuid;

/// Trait that all application commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command, recorded on log lines.
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through handlers and providers.
    fn correlation_id(&self) -> Uuid;
}
