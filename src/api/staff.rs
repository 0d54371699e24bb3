//! Staff actions on placed orders.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::extract::StaffUser;
use crate::db::OrderRepository;
use crate::domain::aggregates::OrderStatus;
use crate::domain::value_objects::OrderId;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Moves an order one step along its lifecycle.
#[tracing::instrument(skip(state, staff, req), fields(staff_id = %staff.id))]
pub async fn set_status(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Value>> {
    let next: OrderStatus = req.status.trim().parse()?;
    let orders = OrderRepository::new(&state.db);
    let mut order = orders
        .get(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let from = order.status();
    if from.is_mutable() {
        return Err(AppError::Conflict("baskets are managed by their owner".to_string()));
    }
    order.transition(next)?;
    orders.set_status(order.id(), from, next).await?;
    tracing::info!(order_id = %order.id(), %from, to = %next, "order status changed");
    state.publish(order.take_events()).await;
    Ok(Json(json!({ "status": true, "order_status": next })))
}
