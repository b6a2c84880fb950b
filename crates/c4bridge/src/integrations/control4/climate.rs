use c4bridge_client::VariableSnapshot;

use super::client::Variables;
use super::entity::parse_number;
use super::entity::required;
use super::entity::CommandError;
use super::entity::ValueError;
use crate::engine::state::ClimateState;
use crate::engine::state::HvacAction;
use crate::engine::state::HvacMode;
use crate::engine::state::TemperatureUnit;

pub const UNIT_VARIABLE: &str = "1100";
pub const HVAC_MODE_VARIABLE: &str = "1104";
pub const HVAC_STATE_VARIABLE: &str = "1107";
pub const CURRENT_TEMPERATURE_VARIABLE: &str = "1131";
pub const HEAT_SETPOINT_VARIABLE: &str = "1133";
pub const COOL_SETPOINT_VARIABLE: &str = "1135";

/// HVAC mode as the thermostat proxy names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
enum ControllerHvacMode {
    Off,
    Cool,
    Heat,
    Auto,
}

impl From<ControllerHvacMode> for HvacMode {
    fn from(mode: ControllerHvacMode) -> Self {
        match mode {
            ControllerHvacMode::Off => HvacMode::Off,
            ControllerHvacMode::Cool => HvacMode::Cool,
            ControllerHvacMode::Heat => HvacMode::Heat,
            ControllerHvacMode::Auto => HvacMode::HeatCool,
        }
    }
}

impl From<HvacMode> for ControllerHvacMode {
    fn from(mode: HvacMode) -> Self {
        match mode {
            HvacMode::Off => ControllerHvacMode::Off,
            HvacMode::Cool => ControllerHvacMode::Cool,
            HvacMode::Heat => ControllerHvacMode::Heat,
            HvacMode::HeatCool => ControllerHvacMode::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
enum ControllerHvacState {
    Off,
    Cool,
    Heat,
}

impl From<ControllerHvacState> for HvacAction {
    fn from(state: ControllerHvacState) -> Self {
        match state {
            ControllerHvacState::Off => HvacAction::Idle,
            ControllerHvacState::Cool => HvacAction::Cooling,
            ControllerHvacState::Heat => HvacAction::Heating,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
enum ControllerUnit {
    Fahrenheit,
    Celsius,
}

impl From<ControllerUnit> for TemperatureUnit {
    fn from(unit: ControllerUnit) -> Self {
        match unit {
            ControllerUnit::Fahrenheit => TemperatureUnit::Fahrenheit,
            ControllerUnit::Celsius => TemperatureUnit::Celsius,
        }
    }
}

fn parse_enum<T: std::str::FromStr>(
    snapshot: &VariableSnapshot,
    variable: &str,
) -> Result<T, ValueError> {
    let value = required(snapshot, variable)?;
    value
        .parse()
        .map_err(|_| ValueError::invalid(variable, value))
}

/// Thermostat behind a Control4 thermostat proxy
#[derive(Debug, Clone, Default)]
pub struct Climate {
    /// `None` until the first successful poll
    pub state: Option<ClimateState>,
}

impl Climate {
    pub fn variables(&self) -> Vec<String> {
        [
            HVAC_MODE_VARIABLE,
            HVAC_STATE_VARIABLE,
            CURRENT_TEMPERATURE_VARIABLE,
            UNIT_VARIABLE,
            HEAT_SETPOINT_VARIABLE,
            COOL_SETPOINT_VARIABLE,
        ]
        .iter()
        .map(|variable| variable.to_string())
        .collect()
    }

    pub fn apply_snapshot(&mut self, snapshot: &VariableSnapshot) -> Result<(), ValueError> {
        let mode: ControllerHvacMode = parse_enum(snapshot, HVAC_MODE_VARIABLE)?;
        let action: ControllerHvacState = parse_enum(snapshot, HVAC_STATE_VARIABLE)?;
        let unit: ControllerUnit = parse_enum(snapshot, UNIT_VARIABLE)?;

        self.state = Some(ClimateState {
            hvac_mode: mode.into(),
            hvac_action: action.into(),
            current_temperature: parse_number(snapshot, CURRENT_TEMPERATURE_VARIABLE)?,
            target_temperature: parse_number(snapshot, HEAT_SETPOINT_VARIABLE)?,
            target_temperature_high: parse_number(snapshot, COOL_SETPOINT_VARIABLE)?,
            unit: unit.into(),
        });
        Ok(())
    }

    /// Write the heat (`low`) and cool (`high`) setpoints that are given
    pub async fn set_temperature<C: Variables>(
        &mut self,
        client: &C,
        low: Option<f64>,
        high: Option<f64>,
    ) -> Result<(), CommandError> {
        if let Some(low) = low {
            client
                .set(HEAT_SETPOINT_VARIABLE, &low.to_string())
                .await?;
            if let Some(state) = &mut self.state {
                state.target_temperature = low;
            }
        }

        if let Some(high) = high {
            client
                .set(COOL_SETPOINT_VARIABLE, &high.to_string())
                .await?;
            if let Some(state) = &mut self.state {
                state.target_temperature_high = high;
            }
        }

        Ok(())
    }

    pub async fn set_hvac_mode<C: Variables>(
        &mut self,
        client: &C,
        mode: HvacMode,
    ) -> Result<(), CommandError> {
        let controller_mode = ControllerHvacMode::from(mode);
        client
            .set(HVAC_MODE_VARIABLE, &controller_mode.to_string())
            .await?;
        if let Some(state) = &mut self.state {
            state.hvac_mode = mode;
        }
        Ok(())
    }
}
