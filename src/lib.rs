pub mod config;
pub mod error;
pub mod simulation;
pub mod compute;

pub use simulation::*;
pub use config::*;
pub use error::{SimError, SimResult};
