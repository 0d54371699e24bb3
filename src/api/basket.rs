//! Basket view and line item mutations.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::extract::AuthUser;
use crate::db::{CatalogRepository, OrderRepository, PricingRepository};
use crate::domain::aggregates::{plan_additions, plan_removals, plan_updates, OrderStatus};
use crate::domain::value_objects::{OrderItemId, ProductInfoId};
use crate::error::{AppError, Result};
use crate::pricing::BasketSummary;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub product_info: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItem {
    pub id: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

/// The basket priced from current offer prices.
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_basket(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<BasketSummary>> {
    let inputs = PricingRepository::new(&state.db).load_inputs(user.id, &[OrderStatus::Basket], None).await?;
    Ok(Json(state.composer().summarize(&inputs)?))
}

#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn add_items(State(state): State<AppState>, AuthUser(user): AuthUser, Json(req): Json<Items<AddItem>>) -> Result<Json<Value>> {
    let raw: Vec<(ProductInfoId, i64)> = req.items.iter().map(|i| (ProductInfoId::new(i.product_info), i.quantity)).collect();
    let planned = plan_additions(&raw)?;

    let ids: Vec<ProductInfoId> = planned.iter().map(|a| a.product_info_id).collect();
    let offers = CatalogRepository::new(&state.db).offers(&ids).await?;
    let mut lines = Vec::with_capacity(planned.len());
    for addition in &planned {
        let offer = offers
            .iter()
            .find(|o| o.id == addition.product_info_id)
            .ok_or_else(|| AppError::NotFound(format!("offer {}", addition.product_info_id)))?;
        offer.reserve(addition.quantity)?;
        lines.push((offer.clone(), addition.quantity));
    }

    let basket_id = OrderRepository::new(&state.db).add_items(user.id, &lines).await?;
    Ok(Json(json!({ "status": true, "order_id": basket_id, "created": lines.len() })))
}

#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_items(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<Items<UpdateItem>>,
) -> Result<Json<Value>> {
    let raw: Vec<(OrderItemId, i64)> = req.items.iter().map(|i| (OrderItemId::new(i.id), i.quantity)).collect();
    let planned = plan_updates(&raw)?;
    let updated = OrderRepository::new(&state.db).update_items(user.id, &planned).await?;
    Ok(Json(json!({ "status": true, "updated": updated })))
}

#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn remove_items(State(state): State<AppState>, AuthUser(user): AuthUser, Json(req): Json<Items<i64>>) -> Result<Json<Value>> {
    let raw: Vec<OrderItemId> = req.items.into_iter().map(OrderItemId::new).collect();
    let ids = plan_removals(&raw)?;
    let deleted = OrderRepository::new(&state.db).remove_items(user.id, &ids).await?;
    Ok(Json(json!({ "status": true, "deleted": deleted })))
}
