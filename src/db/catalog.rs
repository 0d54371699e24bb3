//! Read-only catalog lookups.

use sqlx::PgPool;

use super::RepositoryError;
use crate::domain::aggregates::{ProductCard, ProductInfo, ProductParameter, ProductSummary};
use crate::domain::value_objects::{raw_ids, ProductId, ProductInfoId, ShopId};

const OFFER_COLUMNS: &str = "pi.id, pi.external_id, pi.model, pi.product_id, pi.shop_id, s.name AS shop_name, \
                             pi.quantity, pi.price, pi.price_rrc";

pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of products ordered by category name, then product name,
    /// plus the total count.
    pub async fn list_products(&self, limit: i64, offset: i64) -> Result<(Vec<ProductSummary>, i64), RepositoryError> {
        let products = sqlx::query_as::<_, ProductSummary>(
            "SELECT p.id, p.name, p.category_id, c.name AS category \
             FROM products p JOIN categories c ON c.id = p.category_id \
             ORDER BY c.name, p.name, p.id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products").fetch_one(self.pool).await?;
        Ok((products, total.0))
    }

    /// The product together with `shop_id`'s offer for it.
    #[tracing::instrument(skip(self))]
    pub async fn product_card(&self, product_id: ProductId, shop_id: ShopId) -> Result<Option<ProductCard>, RepositoryError> {
        let Some(product) = sqlx::query_as::<_, ProductSummary>(
            "SELECT p.id, p.name, p.category_id, c.name AS category \
             FROM products p JOIN categories c ON c.id = p.category_id WHERE p.id = $1",
        )
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT {OFFER_COLUMNS} FROM product_infos pi JOIN shops s ON s.id = pi.shop_id \
             WHERE pi.product_id = $1 AND pi.shop_id = $2 ORDER BY pi.id LIMIT 1"
        );
        let Some(offer) = sqlx::query_as::<_, ProductInfo>(&sql)
            .bind(product_id)
            .bind(shop_id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let parameters = sqlx::query_as::<_, ProductParameter>(
            "SELECT pp.product_info_id, pa.name AS parameter, pp.value \
             FROM product_parameters pp JOIN parameters pa ON pa.id = pp.parameter_id \
             WHERE pp.product_info_id = $1 ORDER BY pa.name",
        )
        .bind(offer.id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(ProductCard { product, offer, parameters }))
    }

    /// Offers by id; unknown ids are simply absent from the result.
    pub async fn offers(&self, ids: &[ProductInfoId]) -> Result<Vec<ProductInfo>, RepositoryError> {
        let sql = format!("SELECT {OFFER_COLUMNS} FROM product_infos pi JOIN shops s ON s.id = pi.shop_id WHERE pi.id = ANY($1)");
        Ok(sqlx::query_as::<_, ProductInfo>(&sql)
            .bind(raw_ids(ids.iter().copied()))
            .fetch_all(self.pool)
            .await?)
    }
}
