#![forbid(unsafe_code)]

pub mod model;
pub mod status;
pub mod time;

pub use status::{DisplayStatus, StatusResolver};
pub use time::Clock;
