use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::client::Variables;
use super::config::EntityConfig;
use super::entity::Control4Entity;
use crate::engine::FromIntegrationMessage;
use crate::engine::FromIntegrationSender;
use crate::engine::Integration;
use crate::engine::ToIntegrationMessage;

pub const INTEGRATION_NAME: &str = "control4";

/// One configured entity together with the driver it talks to
struct PolledEntity<C> {
    id: String,
    name: String,
    client: C,
    entity: Control4Entity,
}

/// Held for the whole round trip, so a poll and a command on the same
/// entity never interleave.
type EntityHandle<C> = Arc<Mutex<PolledEntity<C>>>;

/// Control4 integration for c4bridge
///
/// Polls every configured proxy on a fixed interval and forwards commands
/// from the engine to the web driver.
pub struct Control4Integration<C: Variables> {
    entities: HashMap<String, EntityHandle<C>>,
    scan_interval: Duration,
    to_engine: Option<FromIntegrationSender>,
    poll_tasks: Vec<JoinHandle<()>>,
}

impl<C: Variables + 'static> Control4Integration<C> {
    pub fn new(scan_interval: Duration, entities: Vec<(EntityConfig, C)>) -> Self {
        let entities = entities
            .into_iter()
            .map(|(config, client)| {
                let entity = PolledEntity {
                    id: config.id.clone(),
                    name: config.name,
                    client,
                    entity: Control4Entity::new(&config.kind),
                };
                (config.id, Arc::new(Mutex::new(entity)))
            })
            .collect();

        Self {
            entities,
            scan_interval,
            to_engine: None,
            poll_tasks: Vec::new(),
        }
    }

    /// Read the entity's variables and report the new state
    ///
    /// A failed read or an unusable value leaves the state as it was.
    async fn poll(handle: &EntityHandle<C>, to_engine: &FromIntegrationSender) {
        let mut guard = handle.lock().await;
        let polled = &mut *guard;

        let variables = polled.entity.variables();
        let snapshot = match polled.client.get(&variables).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Failed to poll {}: {}", polled.id, e);
                return;
            }
        };

        if let Err(e) = polled.entity.apply_snapshot(&snapshot) {
            warn!("Ignoring poll of {}: {}", polled.id, e);
            return;
        }

        debug!("Polled {}", polled.id);
        Self::report(polled, to_engine).await;
    }

    async fn report(polled: &PolledEntity<C>, to_engine: &FromIntegrationSender) {
        let Some(state) = polled.entity.state() else {
            return;
        };

        let msg = FromIntegrationMessage::StateChanged {
            entity_id: polled.id.clone(),
            state,
        };
        if to_engine.send(msg).await.is_err() {
            debug!("Engine gone, dropping state of {}", polled.id);
        }
    }

    fn not_found(entity_id: &str) -> Box<dyn Error + Send> {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Unknown Control4 entity: {}", entity_id),
        ))
    }
}

#[async_trait]
impl<C: Variables + 'static> Integration for Control4Integration<C> {
    fn name(&self) -> &str {
        INTEGRATION_NAME
    }

    async fn setup(&mut self, tx: FromIntegrationSender) -> Result<(), Box<dyn Error + Send>> {
        for (entity_id, handle) in &self.entities {
            {
                let polled = handle.lock().await;
                info!(
                    "Adding {} entity: {} ({})",
                    polled.entity.platform(),
                    polled.name,
                    entity_id
                );
            }

            tx.send(FromIntegrationMessage::EntityDiscovered {
                entity_id: entity_id.clone(),
                integration_name: INTEGRATION_NAME.to_string(),
            })
            .await
            .map_err(|e| -> Box<dyn Error + Send> { Box::new(e) })?;
        }

        for handle in self.entities.values() {
            let handle = handle.clone();
            let to_engine = tx.clone();
            let scan_interval = self.scan_interval;

            self.poll_tasks.push(tokio::spawn(async move {
                let mut interval = tokio::time::interval(scan_interval);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    interval.tick().await;
                    Self::poll(&handle, &to_engine).await;
                }
            }));
        }

        info!(
            "Polling {} Control4 entities every {:?}",
            self.entities.len(),
            self.scan_interval
        );
        self.to_engine = Some(tx);
        Ok(())
    }

    async fn handle_message(
        &mut self,
        msg: ToIntegrationMessage,
    ) -> Result<(), Box<dyn Error + Send>> {
        let ToIntegrationMessage::Command { entity_id, command } = msg;

        let handle = self
            .entities
            .get(&entity_id)
            .ok_or_else(|| Self::not_found(&entity_id))?;

        let mut guard = handle.lock().await;
        let polled = &mut *guard;

        info!("Executing {} on {}", command.name(), entity_id);
        polled
            .entity
            .execute(&polled.client, command)
            .await
            .map_err(|e| -> Box<dyn Error + Send> { Box::new(e) })?;

        if let Some(to_engine) = &self.to_engine {
            Self::report(polled, to_engine).await;
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), Box<dyn Error + Send>> {
        for task in self.poll_tasks.drain(..) {
            task.abort();
        }

        if let Some(to_engine) = self.to_engine.take() {
            for entity_id in self.entities.keys() {
                let _ = to_engine.try_send(FromIntegrationMessage::EntityRemoved {
                    entity_id: entity_id.clone(),
                });
            }
        }

        info!("Control4 integration stopped");
        Ok(())
    }
}

impl<C: Variables> Drop for Control4Integration<C> {
    fn drop(&mut self) {
        for task in &self.poll_tasks {
            task.abort();
        }
    }
}
