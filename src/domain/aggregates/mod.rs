//! Aggregates module
pub mod basket;
pub mod order;
pub mod product;
pub mod user;

pub use basket::{plan_additions, plan_removals, plan_updates, BasketAddition, BasketError, BasketUpdate};
pub use order::{Order, OrderError, OrderStatus};
pub use product::{check_stock, ProductCard, ProductError, ProductInfo, ProductParameter, ProductSummary};
pub use user::{AddressFields, ContactAddress, ContactPhone, OrderContact, User, UserType};
