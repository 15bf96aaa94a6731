pub mod analyzer;
pub mod classify;
pub mod error;
pub mod io;
pub mod plan;
pub mod registry;
pub mod router;
pub mod score;
pub mod spec;
pub mod swarm;
pub mod task;
pub mod types;

pub use error::{Result, SwarmError};
