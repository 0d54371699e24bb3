//! Order repository: basket mutations, placement and status changes.
//!
//! Every basket write is scoped to the caller's order in status `basket`;
//! placed orders are never touched by these statements.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use super::RepositoryError;
use crate::domain::aggregates::{check_stock, AddressFields, BasketUpdate, Order, OrderStatus, ProductInfo};
use crate::domain::value_objects::{raw_ids, OrderId, OrderItemId, ProductInfoId, Quantity, UserId};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", row.id)))?;
        Ok(Order::restore(row.id, row.user_id, status, row.created_at))
    }
}

/// Contact details submitted when a basket is placed.
#[derive(Debug, Clone)]
pub struct PlacementContact {
    pub phone: Option<String>,
    pub address: AddressFields,
}

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's active basket and the number of lines in it.
    pub async fn find_basket(&self, user_id: UserId) -> Result<Option<(Order, i64)>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, status, created_at FROM orders WHERE user_id = $1 AND status = 'basket'",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        let Some(row) = row else { return Ok(None) };
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE order_id = $1")
            .bind(row.id)
            .fetch_one(self.pool)
            .await?;
        Ok(Some((row.try_into()?, count)))
    }

    /// A user's order by id, in any status.
    pub async fn get_for_user(&self, user_id: UserId, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>("SELECT id, user_id, status, created_at FROM orders WHERE id = $1 AND user_id = $2")
            .bind(order_id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    pub async fn get(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>("SELECT id, user_id, status, created_at FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    /// Adds offers to the user's basket, creating the basket on first use.
    /// Repeated offers add to the existing line's quantity; the resulting
    /// line may not exceed the offer's stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Stock` if a line total would exceed stock
    /// and `RepositoryError::NotFound` if an offer disappeared. Nothing is
    /// written in either case.
    #[tracing::instrument(skip(self, additions), fields(lines = additions.len()))]
    pub async fn add_items(&self, user_id: UserId, additions: &[(ProductInfo, Quantity)]) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let basket_id = basket_for_update(&mut tx, user_id).await?;
        for (offer, quantity) in additions {
            let stock: i32 = sqlx::query_scalar("SELECT quantity FROM product_infos WHERE id = $1 AND shop_id = $2 FOR SHARE")
                .bind(offer.id)
                .bind(offer.shop_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;
            let held: i32 = sqlx::query_scalar(
                "SELECT quantity FROM order_items WHERE order_id = $1 AND product_info_id = $2 AND shop_id = $3",
            )
            .bind(basket_id)
            .bind(offer.id)
            .bind(offer.shop_id)
            .fetch_optional(&mut *tx)
            .await?
            .unwrap_or(0);
            check_stock(offer.id, stock, i64::from(held) + i64::from(quantity.value()))?;

            sqlx::query(
                "INSERT INTO order_items (order_id, product_info_id, shop_id, quantity) VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (order_id, product_info_id, shop_id) DO UPDATE SET quantity = order_items.quantity + EXCLUDED.quantity",
            )
            .bind(basket_id)
            .bind(offer.id)
            .bind(offer.shop_id)
            .bind(quantity.as_i32())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(basket_id)
    }

    /// Sets line quantities. Fails without changes if any line is not in
    /// the user's basket or would exceed its offer's stock. A line whose
    /// offer is gone has no stock.
    #[tracing::instrument(skip(self, updates), fields(lines = updates.len()))]
    pub async fn update_items(&self, user_id: UserId, updates: &[BasketUpdate]) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut changed = 0;
        for update in updates {
            let (product_info_id, stock): (ProductInfoId, Option<i32>) = sqlx::query_as(
                "SELECT oi.product_info_id, pi.quantity FROM order_items oi \
                 JOIN orders o ON o.id = oi.order_id \
                 LEFT JOIN product_infos pi ON pi.id = oi.product_info_id AND pi.shop_id = oi.shop_id \
                 WHERE oi.id = $1 AND o.user_id = $2 AND o.status = 'basket' \
                 FOR UPDATE OF oi",
            )
            .bind(update.item_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;
            check_stock(product_info_id, stock.unwrap_or(0), i64::from(update.quantity.value()))?;

            let result = sqlx::query("UPDATE order_items SET quantity = $1 WHERE id = $2")
                .bind(update.quantity.as_i32())
                .bind(update.item_id)
                .execute(&mut *tx)
                .await?;
            changed += result.rows_affected();
        }
        tx.commit().await?;
        Ok(changed)
    }

    /// Removes lines from the user's basket; returns how many were removed.
    #[tracing::instrument(skip(self, ids), fields(lines = ids.len()))]
    pub async fn remove_items(&self, user_id: UserId, ids: &[OrderItemId]) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM order_items oi USING orders o \
             WHERE oi.id = ANY($1) AND oi.order_id = o.id AND o.user_id = $2 AND o.status = 'basket'",
        )
        .bind(raw_ids(ids.iter().copied()))
        .bind(user_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Saves the contact to the user's book, copies it onto the order and
    /// moves the order out of the basket, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order left the basket or
    /// lost all of its lines concurrently.
    #[tracing::instrument(skip(self, order, contact), fields(order_id = %order.id()))]
    pub async fn place(&self, order: &Order, contact: &PlacementContact) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let placed = sqlx::query(
            "UPDATE orders SET status = $1 WHERE id = $2 AND user_id = $3 AND status = 'basket' \
             AND EXISTS (SELECT 1 FROM order_items WHERE order_id = $2)",
        )
        .bind(order.status().as_str())
        .bind(order.id())
        .bind(order.user_id())
        .execute(&mut *tx)
        .await?;
        if placed.rows_affected() == 0 {
            return Err(RepositoryError::Conflict("basket is empty or already placed".to_string()));
        }

        if let Some(phone) = &contact.phone {
            sqlx::query("INSERT INTO contact_phones (user_id, value) VALUES ($1, $2)")
                .bind(order.user_id())
                .bind(phone)
                .execute(&mut *tx)
                .await?;
        }
        let address = &contact.address;
        sqlx::query(
            "INSERT INTO contact_addresses (user_id, city, street, house, structure, building, apartment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(order.user_id())
        .bind(&address.city)
        .bind(&address.street)
        .bind(&address.house)
        .bind(&address.structure)
        .bind(&address.building)
        .bind(&address.apartment)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "INSERT INTO order_contacts (order_id, phone, city, street, house, structure, building, apartment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(order.id())
        .bind(&contact.phone)
        .bind(&address.city)
        .bind(&address.street)
        .bind(&address.house)
        .bind(&address.structure)
        .bind(&address.building)
        .bind(&address.apartment)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Compare-and-set of the order status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the stored status is no longer
    /// `from`.
    #[tracing::instrument(skip(self))]
    pub async fn set_status(&self, order_id: OrderId, from: OrderStatus, to: OrderStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2 AND status = $3")
            .bind(to.as_str())
            .bind(order_id)
            .bind(from.as_str())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!("order {order_id} is no longer {from}")));
        }
        Ok(())
    }
}

async fn basket_for_update(tx: &mut Transaction<'_, Postgres>, user_id: UserId) -> Result<OrderId, RepositoryError> {
    sqlx::query(
        "INSERT INTO orders (user_id, status) VALUES ($1, 'basket') \
         ON CONFLICT (user_id) WHERE status = 'basket' DO NOTHING",
    )
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    let id = sqlx::query_scalar("SELECT id FROM orders WHERE user_id = $1 AND status = 'basket' FOR UPDATE")
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(id)
}
