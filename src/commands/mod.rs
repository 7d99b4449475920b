// ABOUTME: Command module aggregator for the revdeploy CLI.
// ABOUTME: Re-exports package, check, and regions command handlers.

mod check;
mod package;
mod regions;

pub use check::check;
pub use package::package;
pub use regions::regions;
