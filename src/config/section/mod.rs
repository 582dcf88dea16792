//! Configuration section definitions.

mod lint;
mod paths;
mod rewrite;
mod serve;

pub use lint::LintSection;
pub use paths::PathsConfig;
pub use rewrite::RewriteConfig;
pub use serve::ServeConfig;
