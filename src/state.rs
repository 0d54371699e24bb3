//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::domain::events::DomainEvent;
use crate::pricing::Composer;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub nats: Option<async_nats::Client>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, nats: Option<async_nats::Client>, config: Config) -> Self {
        Self { db, nats, config: Arc::new(config) }
    }

    pub fn composer(&self) -> Composer {
        Composer::new(self.config.price_decimal_places)
    }

    /// Publishes events when an event bus is configured. Failures are
    /// logged and dropped.
    pub async fn publish(&self, events: Vec<DomainEvent>) {
        let Some(nats) = &self.nats else { return };
        for event in events {
            let payload = match serde_json::to_vec(&event) {
                Ok(payload) => payload,
                Err(error) => {
                    tracing::warn!(%error, "failed to encode event");
                    continue;
                }
            };
            if let Err(error) = nats.publish(event.subject().to_string(), payload.into()).await {
                tracing::warn!(%error, subject = event.subject(), "failed to publish event");
            }
        }
    }
}
