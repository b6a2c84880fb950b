mod alarm;
mod client;
mod climate;
mod config;
// Private module - allowed by clippy.toml allow-private-module-inception
#[allow(clippy::module_inception)]
mod control4;
mod entity;
mod light;
mod media_player;

use anyhow::Context;
use c4bridge_client::VariableClient;
pub use client::Variables;
pub use config::AlarmSchema;
pub use config::Control4Config;
pub use config::EntityConfig;
pub use config::EntityKind;
pub use config::PartialControl4Config;
pub use config::PartialEntityConfig;
pub use control4::Control4Integration;
pub use entity::CommandError;
pub use entity::ValueError;
use linkme::distributed_slice;

use crate::engine;

#[distributed_slice(engine::INTEGRATION_REGISTRY)]
fn init_control4(ctx: &engine::IntegrationContext) -> engine::IntegrationFactoryResult {
    let control4_config = if let Some(c) = &ctx.config.integrations.control4 {
        c
    } else {
        return Ok(None);
    };

    // One connection pool for every proxy
    let http = reqwest::Client::builder()
        .user_agent(concat!("c4bridge/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")?;

    let entities = control4_config
        .entities
        .iter()
        .map(|entity| {
            let client = VariableClient::with_client(http.clone(), entity.endpoint.clone());
            (entity.clone(), client)
        })
        .collect();

    Ok(Some(Box::new(Control4Integration::new(
        control4_config.scan_interval,
        entities,
    ))))
}
