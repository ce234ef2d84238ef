//! Follow category change events.
//!
//! Reconnects after a dropped stream, up to the retry cap; a connection
//! that delivers an event re-arms the cap.

use std::time::Duration;

use futures::StreamExt;
use nursery_core::events::CategoryChange;
use nursery_storefront::Storefront;
use nursery_storefront::retry::RetryGate;
use tracing::{info, warn};

use super::CommandResult;

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

pub async fn run(storefront: &Storefront) -> CommandResult {
    let api = storefront.api();
    let mut gate = RetryGate::new();

    loop {
        match api.category_events().await {
            Ok(mut events) => {
                info!("Listening for category changes");
                while let Some(event) = events.next().await {
                    match event {
                        Ok(event) => {
                            gate.reset();
                            let verb = match event.change {
                                CategoryChange::Created => "created",
                                CategoryChange::Updated => "updated",
                                CategoryChange::Deleted => "deleted",
                            };
                            let id = event
                                .category_id
                                .map_or_else(|| "?".to_string(), |id| id.to_string());
                            println!("category {id} {verb}");
                        }
                        Err(e) => warn!(error = %e, "Event stream error"),
                    }
                }
                warn!("Event stream closed");
            }
            Err(e) => {
                if !e.is_network() && !e.is_server_fault() {
                    return Err(e.into());
                }
                warn!(error = %e, "Could not subscribe to events");
            }
        }

        if !gate.try_again() {
            warn!("Giving up after repeated failures");
            return Ok(());
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
