//! Sweeper command line application: loads configuration, wires a document
//! fixture to the observer and exposes its control surface.

pub mod cli;
pub mod config;
pub mod errors;
pub mod server;

pub use config::SweeperConfig;
pub use errors::SweeperError;
