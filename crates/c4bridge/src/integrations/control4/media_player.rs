use std::num::NonZeroU32;

use c4bridge_client::VariableSnapshot;

use super::client::Variables;
use super::entity::parse_number;
use super::entity::required;
use super::entity::CommandError;
use super::entity::ValueError;
use crate::engine::state::MediaPlayerState;

pub const STATE_VARIABLE: &str = "1000";
pub const VOLUME_VARIABLE: &str = "1011";

/// Per-zone volume variables start here for output zone 1
const ZONE_VOLUME_BASE: u64 = 1900;

/// Room or amplifier zone behind a Control4 media proxy
#[derive(Debug, Clone)]
pub struct MediaPlayer {
    volume_variable: String,
    pub state: MediaPlayerState,
}

impl MediaPlayer {
    pub fn new(output_zone: Option<NonZeroU32>) -> Self {
        let volume_variable = match output_zone {
            Some(zone) => (ZONE_VOLUME_BASE + u64::from(zone.get()) - 1).to_string(),
            None => VOLUME_VARIABLE.to_string(),
        };
        Self {
            volume_variable,
            state: MediaPlayerState::default(),
        }
    }

    pub fn variables(&self) -> Vec<String> {
        vec![STATE_VARIABLE.to_string(), self.volume_variable.clone()]
    }

    pub fn apply_snapshot(&mut self, snapshot: &VariableSnapshot) -> Result<(), ValueError> {
        let state = required(snapshot, STATE_VARIABLE)?.to_string();
        let volume: f64 = parse_number(snapshot, &self.volume_variable)?;

        self.state = MediaPlayerState {
            state,
            volume: volume / 100.0,
        };
        Ok(())
    }

    /// Set the volume, `volume` being between 0.0 and 1.0
    pub async fn set_volume<C: Variables>(
        &mut self,
        client: &C,
        volume: f64,
    ) -> Result<(), CommandError> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(CommandError::InvalidArgument(format!(
                "volume {volume} is outside 0.0-1.0"
            )));
        }

        let percent = (volume * 100.0).trunc() as u32;
        client
            .set(&self.volume_variable, &percent.to_string())
            .await?;
        self.state.volume = volume;
        Ok(())
    }
}
