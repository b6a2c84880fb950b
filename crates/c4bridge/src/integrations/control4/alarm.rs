use c4bridge_client::VariableSnapshot;
use tracing::error;

use super::client::Variables;
use super::config::AlarmSchema;
use super::entity::required;
use super::entity::CommandError;
use super::entity::ValueError;
use crate::engine::state::AlarmPanelState;
use crate::engine::state::AlarmState;

pub const ARMED_HOME_VARIABLE: &str = "1000";
pub const ARMED_AWAY_VARIABLE: &str = "1001";
pub const DISARMED_VARIABLE: &str = "1002";

/// Single mode variable on firmwares that expose one
pub const MODE_VARIABLE: &str = "1104";

/// Flag variables in precedence order
const FLAGS: [(&str, AlarmState); 3] = [
    (DISARMED_VARIABLE, AlarmState::Disarmed),
    (ARMED_HOME_VARIABLE, AlarmState::ArmedHome),
    (ARMED_AWAY_VARIABLE, AlarmState::ArmedAway),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
enum ControllerAlarmMode {
    Disarmed,
    Home,
    Away,
}

impl From<ControllerAlarmMode> for AlarmState {
    fn from(mode: ControllerAlarmMode) -> Self {
        match mode {
            ControllerAlarmMode::Disarmed => AlarmState::Disarmed,
            ControllerAlarmMode::Home => AlarmState::ArmedHome,
            ControllerAlarmMode::Away => AlarmState::ArmedAway,
        }
    }
}

impl From<AlarmState> for ControllerAlarmMode {
    fn from(state: AlarmState) -> Self {
        match state {
            AlarmState::Disarmed => ControllerAlarmMode::Disarmed,
            AlarmState::ArmedHome => ControllerAlarmMode::Home,
            AlarmState::ArmedAway => ControllerAlarmMode::Away,
        }
    }
}

/// Security panel behind a Control4 security proxy
#[derive(Debug, Clone)]
pub struct AlarmPanel {
    schema: AlarmSchema,
    pub state: AlarmPanelState,
}

impl AlarmPanel {
    pub fn new(schema: AlarmSchema) -> Self {
        Self {
            schema,
            state: AlarmPanelState::default(),
        }
    }

    pub fn variables(&self) -> Vec<String> {
        match self.schema {
            AlarmSchema::Flags => FLAGS.iter().map(|(id, _)| id.to_string()).collect(),
            AlarmSchema::Mode => vec![MODE_VARIABLE.to_string()],
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: &VariableSnapshot) -> Result<(), ValueError> {
        let state = match self.schema {
            AlarmSchema::Flags => {
                let mut active = None;
                for (variable, state) in FLAGS {
                    if required(snapshot, variable)? == "1" && active.is_none() {
                        active = Some(state);
                    }
                }
                if active.is_none() {
                    error!("Alarm state invalid: no arming flag is set");
                }
                active
            }
            AlarmSchema::Mode => {
                let value = required(snapshot, MODE_VARIABLE)?;
                let mode: ControllerAlarmMode = value
                    .parse()
                    .map_err(|_| ValueError::invalid(MODE_VARIABLE, value))?;
                Some(mode.into())
            }
        };

        self.state = AlarmPanelState { state };
        Ok(())
    }

    pub async fn arm_home<C: Variables>(&mut self, client: &C) -> Result<(), CommandError> {
        self.request(client, AlarmState::ArmedHome).await
    }

    pub async fn arm_away<C: Variables>(&mut self, client: &C) -> Result<(), CommandError> {
        self.request(client, AlarmState::ArmedAway).await
    }

    pub async fn disarm<C: Variables>(&mut self, client: &C) -> Result<(), CommandError> {
        self.request(client, AlarmState::Disarmed).await
    }

    async fn request<C: Variables>(
        &mut self,
        client: &C,
        target: AlarmState,
    ) -> Result<(), CommandError> {
        match self.schema {
            AlarmSchema::Flags => {
                let variable = match target {
                    AlarmState::Disarmed => DISARMED_VARIABLE,
                    AlarmState::ArmedHome => ARMED_HOME_VARIABLE,
                    AlarmState::ArmedAway => ARMED_AWAY_VARIABLE,
                };
                client.set(variable, "1").await?;
            }
            AlarmSchema::Mode => {
                let mode = ControllerAlarmMode::from(target);
                client.set(MODE_VARIABLE, &mode.to_string()).await?;
            }
        }

        self.state.state = Some(target);
        Ok(())
    }
}
