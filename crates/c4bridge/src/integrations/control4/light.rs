use c4bridge_client::VariableSnapshot;

use super::client::Variables;
use super::entity::parse_number;
use super::entity::required;
use super::entity::CommandError;
use super::entity::ValueError;
use crate::engine::state::LightState;

/// "1" on, "0" off
pub const ON_OFF_VARIABLE: &str = "1000";

/// Brightness percent, 0-100
pub const BRIGHTNESS_VARIABLE: &str = "1001";

/// Dimmer or switch behind a Control4 light proxy
#[derive(Debug, Clone, Default)]
pub struct Light {
    pub state: LightState,
}

/// 0-100 percent to 0-255
fn brightness_from_percent(percent: u32) -> u8 {
    (percent.min(100) * 255 / 100) as u8
}

/// 0-255 to 0-100 percent
fn brightness_to_percent(brightness: u8) -> u32 {
    u32::from(brightness) * 100 / 255
}

impl Light {
    pub fn variables(&self) -> Vec<String> {
        vec![ON_OFF_VARIABLE.to_string(), BRIGHTNESS_VARIABLE.to_string()]
    }

    /// Replace the state with the values in `snapshot`
    pub fn apply_snapshot(&mut self, snapshot: &VariableSnapshot) -> Result<(), ValueError> {
        let on = match required(snapshot, ON_OFF_VARIABLE)? {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        };
        let percent: u32 = parse_number(snapshot, BRIGHTNESS_VARIABLE)?;

        self.state = LightState {
            on,
            brightness: Some(brightness_from_percent(percent)),
        };
        Ok(())
    }

    pub async fn turn_on<C: Variables>(
        &mut self,
        client: &C,
        brightness: Option<u8>,
    ) -> Result<(), CommandError> {
        match brightness {
            Some(brightness) => {
                let percent = brightness_to_percent(brightness);
                client
                    .set(BRIGHTNESS_VARIABLE, &percent.to_string())
                    .await?;
                self.state.on = Some(brightness > 0);
                self.state.brightness = Some(brightness);
            }
            None => {
                client.set(ON_OFF_VARIABLE, "1").await?;
                self.state.on = Some(true);
                self.state.brightness = Some(u8::MAX);
            }
        }
        Ok(())
    }

    pub async fn turn_off<C: Variables>(&mut self, client: &C) -> Result<(), CommandError> {
        client.set(ON_OFF_VARIABLE, "0").await?;
        self.state.on = Some(false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::control4::client::MockVariables;

    fn snapshot(on: &str, brightness: &str) -> VariableSnapshot {
        [(ON_OFF_VARIABLE, on), (BRIGHTNESS_VARIABLE, brightness)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_apply_snapshot() {
        let mut light = Light::default();

        light.apply_snapshot(&snapshot("1", "50")).unwrap();
        assert_eq!(light.state.on, Some(true));
        assert_eq!(light.state.brightness, Some(127));

        light.apply_snapshot(&snapshot("0", "100")).unwrap();
        assert_eq!(light.state.on, Some(false));
        assert_eq!(light.state.brightness, Some(255));

        light.apply_snapshot(&snapshot("2", "0")).unwrap();
        assert_eq!(light.state.on, None);
        assert_eq!(light.state.brightness, Some(0));
    }

    #[test]
    fn test_bad_brightness_keeps_state() {
        let mut light = Light::default();
        light.apply_snapshot(&snapshot("1", "40")).unwrap();
        let before = light.state.clone();

        let err = light.apply_snapshot(&snapshot("0", "dim")).unwrap_err();
        assert!(matches!(err, ValueError::Invalid { .. }), "{err:?}");
        assert_eq!(light.state, before);
    }

    #[test]
    fn test_brightness_above_hundred_is_clamped() {
        let mut light = Light::default();
        light.apply_snapshot(&snapshot("1", "250")).unwrap();
        assert_eq!(light.state.brightness, Some(255));
    }

    #[tokio::test]
    async fn test_turn_on_with_brightness() {
        let client = MockVariables::default();
        let mut light = Light::default();

        light.turn_on(&client, Some(128)).await.unwrap();

        assert_eq!(client.sets(), [("1001".to_string(), "50".to_string())]);
        assert_eq!(light.state.brightness, Some(128));
        assert_eq!(light.state.on, Some(true));
    }

    #[tokio::test]
    async fn test_turn_on_without_brightness() {
        let client = MockVariables::default();
        let mut light = Light::default();

        light.turn_on(&client, None).await.unwrap();

        assert_eq!(client.sets(), [("1000".to_string(), "1".to_string())]);
        assert_eq!(light.state.on, Some(true));
        assert_eq!(light.state.brightness, Some(255));
    }

    #[tokio::test]
    async fn test_turn_off() {
        let client = MockVariables::default();
        let mut light = Light::default();

        light.turn_off(&client).await.unwrap();

        assert_eq!(client.sets(), [("1000".to_string(), "0".to_string())]);
        assert_eq!(light.state.on, Some(false));
    }

    #[tokio::test]
    async fn test_failed_command_keeps_state() {
        let client = MockVariables::default();
        client.fail_with(500);
        let mut light = Light::default();

        let err = light.turn_on(&client, None).await.unwrap_err();
        assert!(matches!(err, CommandError::Client(_)), "{err:?}");
        assert_eq!(light.state, LightState::default());
    }
}
