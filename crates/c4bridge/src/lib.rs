pub mod api;
pub mod config;
mod engine;
pub mod integrations;

pub use config::Config;
pub use config::ConfigError;
pub use config::Diagnostic;
pub use config::LogLevel;
pub use config::format_diagnostics;
pub use engine::AlarmPanelState;
pub use engine::ClimateState;
pub use engine::Command;
pub use engine::Engine;
pub use engine::EntityState;
pub use engine::LightState;
pub use engine::MediaPlayerState;
pub use engine::State;
