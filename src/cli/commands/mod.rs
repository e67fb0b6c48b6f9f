//! CLI command implementations

pub mod config;
pub mod deps;
pub mod list;
pub mod status;
pub mod tasks;
pub mod watch;
pub mod workspace;

pub use config::execute as config;
pub use deps::execute as deps;
pub use list::execute as list;
pub use status::execute as status;
pub use tasks::execute as tasks;
pub use watch::execute as watch;
