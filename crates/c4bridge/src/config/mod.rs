mod config;
mod diagnostics;
mod partial;

pub use config::*;
pub use diagnostics::ConfigError;
pub use diagnostics::Diagnostic;
pub use diagnostics::SourceInfo;
pub use diagnostics::ValidationError;
pub use diagnostics::Warning;
pub use diagnostics::format_diagnostics;
pub use partial::PartialConfig;
