//! Snapshot reads for order pricing.
//!
//! Headers, lines, shop distances and the discount factor are read in one
//! `REPEATABLE READ` read-only transaction, so a price computed here never
//! mixes rows from before and after a concurrent catalog update.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use super::RepositoryError;
use crate::domain::aggregates::{OrderContact, OrderStatus};
use crate::domain::value_objects::{raw_ids, OrderId, ShopId, UserId};
use crate::pricing::{LineRow, OrderHeader, PricingInputs};

#[derive(Debug, sqlx::FromRow)]
struct HeaderRow {
    id: OrderId,
    status: String,
    created_at: DateTime<Utc>,
    phone: Option<String>,
    city: Option<String>,
    street: Option<String>,
    house: Option<String>,
    structure: Option<String>,
    building: Option<String>,
    apartment: Option<String>,
    captured_at: Option<DateTime<Utc>>,
}

impl TryFrom<HeaderRow> for OrderHeader {
    type Error = RepositoryError;

    fn try_from(row: HeaderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", row.id)))?;
        // A snapshot row exists iff captured_at is set.
        let contact = row.captured_at.map(|captured_at| OrderContact {
            order_id: row.id,
            phone: row.phone,
            city: row.city.unwrap_or_default(),
            street: row.street.unwrap_or_default(),
            house: row.house.unwrap_or_default(),
            structure: row.structure.unwrap_or_default(),
            building: row.building.unwrap_or_default(),
            apartment: row.apartment.unwrap_or_default(),
            captured_at,
        });
        Ok(OrderHeader { id: row.id, status, created_at: row.created_at, contact })
    }
}

pub struct PricingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PricingRepository<'a> {
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reads the user's orders in `statuses` (optionally just `order_id`)
    /// with everything needed to price them, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    #[tracing::instrument(skip(self, statuses))]
    pub async fn load_inputs(
        &self,
        user_id: UserId,
        statuses: &[OrderStatus],
        order_id: Option<OrderId>,
    ) -> Result<PricingInputs, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let discount_factor: Option<i32> = sqlx::query_scalar("SELECT discount_factor FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        let discount_factor = discount_factor.ok_or(RepositoryError::NotFound)?;

        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let orders = sqlx::query_as::<_, HeaderRow>(
            "SELECT o.id, o.status, o.created_at, c.phone, c.city, c.street, c.house, c.structure, \
                    c.building, c.apartment, c.captured_at \
             FROM orders o LEFT JOIN order_contacts c ON c.order_id = o.id \
             WHERE o.user_id = $1 AND o.status = ANY($2) AND ($3::BIGINT IS NULL OR o.id = $3) \
             ORDER BY o.created_at DESC, o.id DESC",
        )
        .bind(user_id)
        .bind(&statuses)
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(OrderHeader::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let ids: Vec<i64> = raw_ids(orders.iter().map(|o| o.id));
        let lines = load_lines(&mut tx, &ids).await?;

        let shop_ids: Vec<i64> = {
            let mut ids: Vec<i64> = lines.iter().map(|l| l.shop_id.get()).collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        let shop_distances: HashMap<ShopId, i64> =
            sqlx::query_as::<_, (ShopId, i64)>("SELECT id, distance::BIGINT FROM shops WHERE id = ANY($1)")
                .bind(&shop_ids)
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .collect();

        tx.commit().await?;
        tracing::debug!(orders = orders.len(), lines = lines.len(), "pricing inputs loaded");
        Ok(PricingInputs { user_id, discount_factor: discount_factor.into(), orders, lines, shop_distances })
    }
}

/// Lines joined with their offer's current price. An offer that is gone or
/// now belongs to another shop yields a `NULL` price.
async fn load_lines(tx: &mut Transaction<'_, Postgres>, order_ids: &[i64]) -> Result<Vec<LineRow>, RepositoryError> {
    if order_ids.is_empty() {
        return Ok(vec![]);
    }
    Ok(sqlx::query_as::<_, LineRow>(
        "SELECT oi.order_id, oi.id AS order_item_id, oi.product_info_id, oi.shop_id, s.name AS shop_name, \
                p.name AS product_name, oi.quantity, pi.price \
         FROM order_items oi \
         JOIN shops s ON s.id = oi.shop_id \
         LEFT JOIN product_infos pi ON pi.id = oi.product_info_id AND pi.shop_id = oi.shop_id \
         LEFT JOIN products p ON p.id = pi.product_id \
         WHERE oi.order_id = ANY($1) \
         ORDER BY oi.order_id, oi.id",
    )
    .bind(order_ids)
    .fetch_all(&mut **tx)
    .await?)
}
