pub use flockwork_core::{init_logging, Metrics};
pub mod config {
    pub use flockwork_core::config::*;
}
pub mod error {
    pub use flockwork_core::error::*;
}
pub mod flock {
    pub use flockwork_core::flock::*;
}
pub mod flocking {
    pub use flockwork_core::flocking::*;
}
pub mod snapshot {
    pub use flockwork_core::snapshot::*;
}
pub mod spatial_index {
    pub use flockwork_core::spatial_index::*;
}
pub mod state {
    pub use flockwork_data::*;
}
