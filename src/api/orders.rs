//! Checkout and order history.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::extract::AuthUser;
use crate::db::{OrderRepository, PlacementContact, PricingRepository, UserRepository};
use crate::domain::aggregates::{AddressFields, OrderStatus};
use crate::domain::value_objects::OrderId;
use crate::error::{AppError, Result};
use crate::pricing::{OrderOutcome, PricedOrder};
use crate::state::AppState;

const MAX_PHONE_LENGTH: usize = 20;

#[derive(Debug, Deserialize)]
pub struct AcceptOrderRequest {
    pub phone: Option<String>,
    #[serde(flatten)]
    pub address: AddressFields,
}

impl AcceptOrderRequest {
    /// Trims every field and checks the required ones.
    fn into_contact(self) -> Result<PlacementContact> {
        let trim = |s: String| s.trim().to_string();
        let address = AddressFields {
            city: trim(self.address.city),
            street: trim(self.address.street),
            house: trim(self.address.house),
            structure: trim(self.address.structure),
            building: trim(self.address.building),
            apartment: trim(self.address.apartment),
        };
        let mut missing = vec![];
        for (name, value) in [("city", &address.city), ("street", &address.street), ("house", &address.house)] {
            if value.is_empty() {
                missing.push(name);
            }
        }
        if !missing.is_empty() {
            return Err(AppError::BadRequest(format!("missing required fields: {}", missing.join(", "))));
        }
        let phone = self.phone.map(trim).filter(|p| !p.is_empty());
        if phone.as_ref().is_some_and(|p| p.chars().count() > MAX_PHONE_LENGTH) {
            return Err(AppError::BadRequest(format!("phone must be at most {MAX_PHONE_LENGTH} characters")));
        }
        Ok(PlacementContact { phone, address })
    }
}

/// Places the basket: it must price cleanly and hold at least one line.
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn accept_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<AcceptOrderRequest>,
) -> Result<Json<Value>> {
    let contact = req.into_contact()?;
    let orders = OrderRepository::new(&state.db);
    let (mut order, line_count) = orders
        .find_basket(user.id)
        .await?
        .ok_or_else(|| AppError::BadRequest("basket is empty".to_string()))?;

    let inputs = PricingRepository::new(&state.db).load_inputs(user.id, &[OrderStatus::Basket], Some(order.id())).await?;
    state.composer().summarize(&inputs)?;

    order.place(usize::try_from(line_count).unwrap_or_default())?;
    orders.place(&order, &contact).await?;
    tracing::info!(order_id = %order.id(), "order placed");
    state.publish(order.take_events()).await;

    let users = UserRepository::new(&state.db);
    let addresses = users.list_addresses(user.id).await?;
    let phones = users.list_phones(user.id).await?;
    Ok(Json(json!({
        "status": true,
        "order_id": order.id(),
        "user": user,
        "phones": phones,
        "addresses": addresses,
    })))
}

#[derive(Debug, Serialize)]
pub struct Recipient {
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    pub recipient: Recipient,
    pub orders: Vec<OrderOutcome>,
}

/// Confirmed orders with the contact they ship to.
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn greeting(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<GreetingResponse>> {
    let inputs = PricingRepository::new(&state.db).load_inputs(user.id, &[OrderStatus::Confirmed], None).await?;
    let orders = state.composer().compose(&inputs);
    Ok(Json(GreetingResponse { recipient: Recipient { full_name: user.full_name(), email: user.email }, orders }))
}

/// Every order that has left the basket, newest first. Orders that cannot
/// be priced are listed with their error instead of totals.
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_orders(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Vec<OrderOutcome>>> {
    let inputs = PricingRepository::new(&state.db).load_inputs(user.id, &OrderStatus::PLACED, None).await?;
    Ok(Json(state.composer().compose(&inputs)))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_order(State(state): State<AppState>, AuthUser(user): AuthUser, Path(id): Path<i64>) -> Result<Json<PricedOrder>> {
    let order_id = OrderId::new(id);
    let inputs = PricingRepository::new(&state.db).load_inputs(user.id, &OrderStatus::PLACED, Some(order_id)).await?;
    let outcome = state
        .composer()
        .compose(&inputs)
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(outcome.into_result()?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn cancel_order(State(state): State<AppState>, AuthUser(user): AuthUser, Path(id): Path<i64>) -> Result<Json<Value>> {
    let orders = OrderRepository::new(&state.db);
    let mut order = orders
        .get_for_user(user.id, OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let from = order.status();
    order.cancel()?;
    orders.set_status(order.id(), from, order.status()).await?;
    tracing::info!(order_id = %order.id(), %from, "order canceled");
    state.publish(order.take_events()).await;
    Ok(Json(json!({ "status": true, "order_status": order.status() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(city: &str, phone: Option<&str>) -> AcceptOrderRequest {
        AcceptOrderRequest {
            phone: phone.map(Into::into),
            address: AddressFields {
                city: city.into(),
                street: " Tverskaya ".into(),
                house: "1".into(),
                ..AddressFields::default()
            },
        }
    }

    #[test]
    fn test_contact_is_trimmed() {
        let contact = request("Moscow", Some("  ")).into_contact().unwrap();
        assert_eq!(contact.address.street, "Tverskaya");
        assert!(contact.phone.is_none());
    }

    #[test]
    fn test_required_address_fields() {
        let err = request(" ", None).into_contact().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg.contains("city")));
    }

    #[test]
    fn test_phone_length() {
        assert!(request("Moscow", Some("+7 900 000 00 00")).into_contact().is_ok());
        assert!(request("Moscow", Some("+7 900 000 00 00 00 00 00")).into_contact().is_err());
    }

    #[test]
    fn test_address_is_flattened() {
        let req: AcceptOrderRequest =
            serde_json::from_value(json!({"phone": "123", "city": "Moscow", "street": "Arbat", "house": "5"})).unwrap();
        assert_eq!(req.address.city, "Moscow");
        assert_eq!(req.address.apartment, "");
    }
}
