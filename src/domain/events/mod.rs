//! Domain events
use crate::domain::aggregates::OrderStatus;
use crate::domain::value_objects::{OrderId, UserId};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Order(OrderEvent),
    User(UserEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: OrderId, user_id: UserId },
    StatusChanged { order_id: OrderId, from: OrderStatus, to: OrderStatus },
}

/// Account events. A mailer subscribed to `users.events` delivers the
/// confirmation key.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UserEvent {
    ConfirmationRequested { user_id: UserId, email: String, token: String },
}

impl DomainEvent {
    /// Subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Order(_) => "orders.events",
            Self::User(_) => "users.events",
        }
    }
}
