pub mod app;
pub mod commands;
pub mod dispatch;
pub mod env;
pub mod info;
pub mod output;
pub mod runtime;
pub mod scan;
pub mod watch;

pub use app::run;
pub use env::CliArgs;
