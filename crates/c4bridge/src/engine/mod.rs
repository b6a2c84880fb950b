// Private module - allowed by clippy.toml allow-private-module-inception
#[allow(clippy::module_inception)]
mod engine;
mod integration;
mod message;
pub mod state;

pub use engine::Engine;
pub use integration::FromIntegrationSender;
pub use integration::Integration;
pub use integration::IntegrationContext;
pub use integration::IntegrationFactoryResult;
pub use integration::REGISTRY as INTEGRATION_REGISTRY;
pub use message::Command;
pub use message::FromIntegrationMessage;
pub use message::ToIntegrationMessage;
pub use state::AlarmPanelState;
pub use state::AlarmState;
pub use state::ClimateState;
pub use state::EntityState;
pub use state::HvacAction;
pub use state::HvacMode;
pub use state::LightState;
pub use state::MediaPlayerState;
pub use state::State;
pub use state::TemperatureUnit;
