pub use adjacency::*;
pub use snapshot::*;

mod adjacency;
mod snapshot;
