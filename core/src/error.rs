//! Error types for the device farm core.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while managing the device pool or starting a
/// population of devices.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// A port was queried that does not fall within any configured
    /// [`crate::distribution::PortAssignments`] range.
    #[error("port {0} is not within any configured port assignment")]
    UnknownPortRange(u16),

    /// Creating a device would exceed the pool's `max_devices` cap.
    #[error("pool exhausted: {active}/{max} devices active")]
    PoolExhausted { active: usize, max: usize },

    /// The candidate port range is smaller than the requested device mix.
    #[error("insufficient ports: range has {available} ports, mix needs {needed}")]
    InsufficientPorts { available: usize, needed: usize },

    /// A device actor failed to start.
    #[error("device actor for port {port} failed to start: {reason}")]
    ActorStartFailed { port: u16, reason: String },

    /// A device actor terminated unexpectedly.
    #[error("device actor for port {0} crashed")]
    ActorCrashed(u16),

    /// A bulk startup did not reach its completion threshold.
    #[error("population incomplete: {created}/{requested} devices created")]
    PopulationIncomplete { created: usize, requested: usize },

    /// A behavior descriptor could not be evaluated (the simulator never
    /// returns this to a caller; it falls back to [`crate::behavior::BehaviorDescriptor::StaticValue`]
    /// internally instead, but the variant is kept so the error kind set
    /// matches spec).
    #[error("invalid behavior descriptor: {0}")]
    InvalidBehavior(String),
}
