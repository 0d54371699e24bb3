//! Customers and their contact book.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ContactId, OrderId, UserId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Shop,
    #[default]
    Buyer,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shop => "shop",
            Self::Buyer => "buyer",
        }
    }
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub second_name: Option<String>,
    pub last_name: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub user_type: String,
    #[serde(skip)]
    pub discount_factor: i32,
    pub is_active: bool,
    #[serde(skip)]
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        match &self.second_name {
            Some(second) => format!("{} {} {}", self.last_name, self.first_name, second),
            None => format!("{} {}", self.last_name, self.first_name),
        }
    }
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ContactPhone {
    pub id: ContactId,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ContactAddress {
    pub id: ContactId,
    pub city: String,
    pub street: String,
    pub house: String,
    pub structure: String,
    pub building: String,
    pub apartment: String,
}

/// Address fields as submitted at checkout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    pub city: String,
    pub street: String,
    pub house: String,
    #[serde(default)]
    pub structure: String,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub apartment: String,
}

/// Phone and address copied onto an order when it leaves the basket.
///
/// Later edits to the user's contact book do not touch it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderContact {
    pub order_id: OrderId,
    pub phone: Option<String>,
    pub city: String,
    pub street: String,
    pub house: String,
    pub structure: String,
    pub building: String,
    pub apartment: String,
    pub captured_at: DateTime<Utc>,
}
