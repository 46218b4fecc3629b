//! Offline replay against a simulated video host.

mod driver;
mod stats;

pub use driver::{ReplayDriver, ReplayPlan};
pub use stats::ReplayStats;
