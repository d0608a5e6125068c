pub mod app;
pub mod model;

pub use crate::app::{App, RunSummary};
pub use crate::model::config::FlockConfig;
pub use crate::model::flock::Flock;
