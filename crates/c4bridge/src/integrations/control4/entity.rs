use std::str::FromStr;

use c4bridge_client::VariableSnapshot;

use super::alarm::AlarmPanel;
use super::client::Variables;
use super::climate::Climate;
use super::config::EntityKind;
use super::light::Light;
use super::media_player::MediaPlayer;
use crate::engine::Command;
use crate::engine::EntityState;

/// A snapshot value that cannot be turned into entity state
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("variable {variable} missing from snapshot")]
    Missing { variable: String },

    #[error("variable {variable} has unexpected value '{value}'")]
    Invalid { variable: String, value: String },
}

impl ValueError {
    pub(crate) fn invalid(variable: &str, value: &str) -> Self {
        Self::Invalid {
            variable: variable.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Client(#[from] c4bridge_client::Error),

    #[error("{command} is not supported by {platform} entities")]
    Unsupported {
        command: &'static str,
        platform: &'static str,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub(crate) fn required<'a>(
    snapshot: &'a VariableSnapshot,
    variable: &str,
) -> Result<&'a str, ValueError> {
    snapshot.get(variable).ok_or_else(|| ValueError::Missing {
        variable: variable.to_string(),
    })
}

pub(crate) fn parse_number<T: FromStr>(
    snapshot: &VariableSnapshot,
    variable: &str,
) -> Result<T, ValueError> {
    let value = required(snapshot, variable)?;
    value
        .trim()
        .parse()
        .map_err(|_| ValueError::invalid(variable, value))
}

/// Any Control4-backed entity
#[derive(Debug, Clone)]
pub enum Control4Entity {
    Light(Light),
    Climate(Climate),
    AlarmPanel(AlarmPanel),
    MediaPlayer(MediaPlayer),
}

impl Control4Entity {
    pub fn new(kind: &EntityKind) -> Self {
        match kind {
            EntityKind::Light => Self::Light(Light::default()),
            EntityKind::Climate => Self::Climate(Climate::default()),
            EntityKind::AlarmPanel { schema } => Self::AlarmPanel(AlarmPanel::new(*schema)),
            EntityKind::MediaPlayer { output_zone } => {
                Self::MediaPlayer(MediaPlayer::new(*output_zone))
            }
        }
    }

    pub fn platform(&self) -> &'static str {
        match self {
            Self::Light(_) => "light",
            Self::Climate(_) => "climate",
            Self::AlarmPanel(_) => "alarm_control_panel",
            Self::MediaPlayer(_) => "media_player",
        }
    }

    /// Variable IDs read on every poll
    pub fn variables(&self) -> Vec<String> {
        match self {
            Self::Light(e) => e.variables(),
            Self::Climate(e) => e.variables(),
            Self::AlarmPanel(e) => e.variables(),
            Self::MediaPlayer(e) => e.variables(),
        }
    }

    /// Replace the state from a poll; on error the previous state is kept
    pub fn apply_snapshot(&mut self, snapshot: &VariableSnapshot) -> Result<(), ValueError> {
        match self {
            Self::Light(e) => e.apply_snapshot(snapshot),
            Self::Climate(e) => e.apply_snapshot(snapshot),
            Self::AlarmPanel(e) => e.apply_snapshot(snapshot),
            Self::MediaPlayer(e) => e.apply_snapshot(snapshot),
        }
    }

    /// Current state, or `None` before anything is known
    pub fn state(&self) -> Option<EntityState> {
        match self {
            Self::Light(e) => Some(EntityState::Light(e.state.clone())),
            Self::Climate(e) => e.state.clone().map(EntityState::Climate),
            Self::AlarmPanel(e) => Some(EntityState::AlarmControlPanel(e.state.clone())),
            Self::MediaPlayer(e) => Some(EntityState::MediaPlayer(e.state.clone())),
        }
    }

    /// Run `command` against the driver, updating state only on success
    pub async fn execute<C: Variables>(
        &mut self,
        client: &C,
        command: Command,
    ) -> Result<(), CommandError> {
        match (self, command) {
            (Self::Light(light), Command::TurnOn { brightness }) => {
                light.turn_on(client, brightness).await
            }
            (Self::Light(light), Command::TurnOff) => light.turn_off(client).await,
            (
                Self::Climate(climate),
                Command::SetTemperature {
                    temperature,
                    target_temp_low,
                    target_temp_high,
                },
            ) => {
                climate
                    .set_temperature(client, target_temp_low.or(temperature), target_temp_high)
                    .await
            }
            (Self::Climate(climate), Command::SetHvacMode { hvac_mode }) => {
                climate.set_hvac_mode(client, hvac_mode).await
            }
            (Self::AlarmPanel(panel), Command::AlarmArmHome) => panel.arm_home(client).await,
            (Self::AlarmPanel(panel), Command::AlarmArmAway) => panel.arm_away(client).await,
            (Self::AlarmPanel(panel), Command::AlarmDisarm) => panel.disarm(client).await,
            (Self::MediaPlayer(player), Command::SetVolume { volume }) => {
                player.set_volume(client, volume).await
            }
            (entity, command) => Err(CommandError::Unsupported {
                command: command.name(),
                platform: entity.platform(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::control4::client::MockVariables;
    use crate::integrations::control4::config::AlarmSchema;

    #[test]
    fn test_parse_number() {
        let snapshot: VariableSnapshot = [("1131", " 72.5"), ("1100", "F")].into_iter().collect();

        assert_eq!(parse_number::<f64>(&snapshot, "1131").unwrap(), 72.5);
        assert!(matches!(
            parse_number::<f64>(&snapshot, "1100"),
            Err(ValueError::Invalid { .. })
        ));
        assert!(matches!(
            parse_number::<f64>(&snapshot, "1133"),
            Err(ValueError::Missing { .. })
        ));
    }

    #[test]
    fn test_variables_per_kind() {
        let panel = Control4Entity::new(&EntityKind::AlarmPanel {
            schema: AlarmSchema::Flags,
        });
        assert_eq!(panel.variables(), ["1002", "1000", "1001"]);
        assert_eq!(panel.platform(), "alarm_control_panel");
    }

    #[test]
    fn test_climate_has_no_state_until_polled() {
        let climate = Control4Entity::new(&EntityKind::Climate);
        assert!(climate.state().is_none());

        let light = Control4Entity::new(&EntityKind::Light);
        assert!(light.state().is_some());
    }

    #[tokio::test]
    async fn test_command_for_wrong_kind_is_rejected() {
        let client = MockVariables::default();
        let mut light = Control4Entity::new(&EntityKind::Light);

        let err = light
            .execute(&client, Command::SetVolume { volume: 0.5 })
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "set_volume is not supported by light entities"
        );
        assert!(client.sets().is_empty());
    }

    #[tokio::test]
    async fn test_set_temperature_prefers_low_setpoint() {
        let client = MockVariables::default();
        let mut climate = Control4Entity::new(&EntityKind::Climate);

        climate
            .execute(
                &client,
                Command::SetTemperature {
                    temperature: Some(70.0),
                    target_temp_low: Some(68.0),
                    target_temp_high: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(client.sets(), [("1133".to_string(), "68".to_string())]);
    }
}
