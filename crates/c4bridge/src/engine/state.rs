use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

/// State of a light entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LightState {
    /// Whether the light is on. `None` when the controller reports neither
    /// on nor off.
    pub on: Option<bool>,

    /// Brightness level (0-255).
    pub brightness: Option<u8>,
}

/// Operating mode selected on a thermostat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    HeatCool,
}

/// What the HVAC equipment is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HvacAction {
    Idle,
    Heating,
    Cooling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

/// State of a climate (thermostat) entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateState {
    pub hvac_mode: HvacMode,
    pub hvac_action: HvacAction,
    pub current_temperature: f64,
    /// Heat setpoint; also the single target in heat or cool mode.
    pub target_temperature: f64,
    /// Cool setpoint.
    pub target_temperature_high: f64,
    pub unit: TemperatureUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlarmState {
    Disarmed,
    ArmedHome,
    ArmedAway,
}

/// State of an alarm control panel entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlarmPanelState {
    /// `None` when the controller reports no consistent arming state.
    pub state: Option<AlarmState>,
}

/// State of a media player entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaPlayerState {
    /// Raw state string from the controller.
    pub state: String,

    /// Volume level between 0.0 and 1.0.
    pub volume: f64,
}

/// State of any entity, as reported by integrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "snake_case")]
pub enum EntityState {
    Light(LightState),
    Climate(ClimateState),
    AlarmControlPanel(AlarmPanelState),
    MediaPlayer(MediaPlayerState),
}

impl EntityState {
    /// Platform name, matching the prefix of entity IDs.
    pub fn platform(&self) -> &'static str {
        match self {
            Self::Light(_) => "light",
            Self::Climate(_) => "climate",
            Self::AlarmControlPanel(_) => "alarm_control_panel",
            Self::MediaPlayer(_) => "media_player",
        }
    }
}

/// Centralized snapshot of the entire engine state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct State {
    pub lights: HashMap<String, LightState>,
    pub climates: HashMap<String, ClimateState>,
    pub alarm_panels: HashMap<String, AlarmPanelState>,
    pub media_players: HashMap<String, MediaPlayerState>,
}

impl State {
    /// Record `state` for `entity_id`. Returns `true` if it differs from the
    /// previous value.
    pub fn update(&mut self, entity_id: String, state: EntityState) -> bool {
        match state {
            EntityState::Light(s) => self.lights.insert(entity_id, s.clone()) != Some(s),
            EntityState::Climate(s) => self.climates.insert(entity_id, s.clone()) != Some(s),
            EntityState::AlarmControlPanel(s) => {
                self.alarm_panels.insert(entity_id, s.clone()) != Some(s)
            }
            EntityState::MediaPlayer(s) => {
                self.media_players.insert(entity_id, s.clone()) != Some(s)
            }
        }
    }

    /// Forget every state recorded for `entity_id`.
    pub fn remove(&mut self, entity_id: &str) {
        self.lights.remove(entity_id);
        self.climates.remove(entity_id);
        self.alarm_panels.remove(entity_id);
        self.media_players.remove(entity_id);
    }
}
