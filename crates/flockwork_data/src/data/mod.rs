//! Plain data types with no simulation logic attached.

pub mod agent;
pub mod axis;
pub mod neighbors;
pub mod time;
