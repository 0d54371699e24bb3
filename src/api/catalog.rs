//! Product list and product card.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::CatalogRepository;
use crate::domain::aggregates::{ProductCard, ProductSummary};
use crate::domain::value_objects::{ProductId, ShopId};
use crate::error::{AppError, Result};
use crate::state::AppState;

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListParams {
    /// `(page, limit, offset)` with the page clamped to at least 1.
    fn window(&self) -> (u32, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        (page, i64::from(per_page), i64::from(page - 1) * i64::from(per_page))
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

pub async fn list_products(State(state): State<AppState>, Query(params): Query<ListParams>) -> Result<Json<PaginatedResponse<ProductSummary>>> {
    let (page, limit, offset) = params.window();
    let (data, total) = CatalogRepository::new(&state.db).list_products(limit, offset).await?;
    Ok(Json(PaginatedResponse { data, total, page }))
}

#[derive(Debug, Deserialize)]
pub struct ShopParam {
    pub shop_id: Option<i64>,
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(param): Query<ShopParam>,
) -> Result<Json<ProductCard>> {
    let shop_id = param.shop_id.ok_or_else(|| AppError::BadRequest("shop_id is required".to_string()))?;
    CatalogRepository::new(&state.db)
        .product_card(ProductId::new(id), ShopId::new(shop_id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id} in shop {shop_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window() {
        assert_eq!(ListParams::default().window(), (1, 20, 0));
        assert_eq!(ListParams { page: Some(3), per_page: Some(10) }.window(), (3, 10, 20));
        assert_eq!(ListParams { page: Some(0), per_page: Some(1000) }.window(), (1, 100, 0));
        assert_eq!(ListParams { page: None, per_page: Some(0) }.window(), (1, 1, 0));
    }
}
