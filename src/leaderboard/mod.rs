pub use service::{Leaderboard, QueryService};

mod service;
