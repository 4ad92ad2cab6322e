use clap::Subcommand;

use super::scan::ScanArgs;
use super::watch::WatchArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run one detection cycle over a document fixture
    Scan(ScanArgs),

    /// Observe a document replaying fixture frames until it settles
    Watch(WatchArgs),

    /// Show build information and the effective configuration
    Info,
}
