//! Derived order prices.
//!
//! Nothing here touches storage: callers read a [`PricingInputs`] snapshot
//! and get back item totals, delivery cost and final price per order.
//! These values are never persisted; they are recomputed on every read from
//! the current offer prices, shop distances and the user's discount factor.

pub mod aggregator;
pub mod composer;
pub mod delivery;
mod error;

pub use aggregator::{aggregate, aggregate_order, LineRow, OrderSubtotal, PricedLine, ShopQuantity};
pub use composer::{BasketSummary, Composer, OrderHeader, OrderOutcome, OrderPricing, PricedOrder, PricingInputs};
pub use delivery::{base_rate, delivery_cost};
pub use error::{MissingLine, PricingError};
