// Game events flowing in from the host and lifecycle events flowing out to observers

// Public API - what other modules can use
pub use events::{is_knife, GameEvent, HostInput, PlayerInfo, Team};
pub use host::{EventSource, GameHost};
pub use observer::{CacheReason, NoOpObserver, StatsEvent, StatsObserver, TracingObserver};
pub use projector::{EventProjector, GateConfig, Projection, StartedSession};

// Internal modules
mod events;
mod host;
mod observer;
mod projector;
