pub mod automation;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod duration;
pub mod error;
pub mod io;
pub mod item;
pub mod reconcile;
pub mod schedule;
pub mod sweep;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use duration::Duration;
pub use error::{CadenceError, Result};
pub use schedule::Schedule;
pub use tracker::Tracker;
