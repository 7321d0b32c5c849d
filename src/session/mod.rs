// Public API - what other modules can use
pub use models::SessionRecord;
pub use store::SessionStore;

// Internal modules
pub mod metrics;
mod models;
mod store;
