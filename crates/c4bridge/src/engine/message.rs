//! Type-safe message system for c4bridge
//!
//! Messages are split by direction to enforce correct usage at compile time:
//! - `FromIntegrationMessage`: Events from integrations to the engine
//! - `ToIntegrationMessage`: Commands from the engine to integrations

use serde::Deserialize;
use serde::Serialize;

use super::state::EntityState;
use super::state::HvacMode;

/// Messages FROM integrations TO the engine (events/state updates)
#[derive(Debug, Clone)]
pub enum FromIntegrationMessage {
    /// An entity was registered by an integration
    EntityDiscovered {
        entity_id: String,
        integration_name: String,
    },

    /// An entity is no longer provided by its integration
    EntityRemoved { entity_id: String },

    /// An entity's state was read or changed
    StateChanged {
        entity_id: String,
        state: EntityState,
    },
}

/// A user command targeting one entity.
///
/// Serialized with a `command` tag, e.g. `{"command": "turn_on", "brightness": 128}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Turn a light on, optionally at a brightness (0-255)
    TurnOn { brightness: Option<u8> },
    TurnOff,
    /// Change thermostat setpoints; absent fields are left alone
    SetTemperature {
        temperature: Option<f64>,
        target_temp_low: Option<f64>,
        target_temp_high: Option<f64>,
    },
    SetHvacMode { hvac_mode: HvacMode },
    AlarmArmHome,
    AlarmArmAway,
    AlarmDisarm,
    /// Set a media player's volume (0.0-1.0)
    SetVolume { volume: f64 },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TurnOn { .. } => "turn_on",
            Self::TurnOff => "turn_off",
            Self::SetTemperature { .. } => "set_temperature",
            Self::SetHvacMode { .. } => "set_hvac_mode",
            Self::AlarmArmHome => "alarm_arm_home",
            Self::AlarmArmAway => "alarm_arm_away",
            Self::AlarmDisarm => "alarm_disarm",
            Self::SetVolume { .. } => "set_volume",
        }
    }
}

/// Messages FROM the engine TO integrations (commands)
#[derive(Debug, Clone)]
pub enum ToIntegrationMessage {
    Command { entity_id: String, command: Command },
}
