//! Scan driver.
//!
//! Each cycle loads state, sweeps dangling links from the library, drops
//! state for vanished sources, reconciles films and then shows, and saves
//! the new state. [`Organiser`] runs cycles on an interval in the
//! background; [`Organiser::run_cycle`] runs one on demand.

mod cycle;
mod runner;
mod types;

pub use cycle::{mount_available, CycleRunner, ScanCycle};
pub use runner::Organiser;
pub use types::{CategoryReport, OrganiserError, OrganiserStatus, ScanReport};
