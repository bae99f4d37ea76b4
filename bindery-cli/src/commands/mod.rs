//! CLI command implementations

mod import;
mod plan;
mod sanitize;
mod show;

pub use import::{import, ImportArgs};
pub use plan::plan;
pub use sanitize::sanitize;
pub use show::show;
