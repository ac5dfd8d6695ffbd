//! Product API Handlers
//!
//! The list endpoint is the front end's availability view: each product
//! carries the quantity reserved by pending orders and what is left to
//! offer. Both figures are advisory; finalize re-validates.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::models::Product;

use crate::core::{Result, ServerError, ServerState};

/// 商品及其实时可用量
#[derive(Debug, Serialize)]
pub struct ProductAvailability {
    #[serde(flatten)]
    pub product: Product,
    /// 所有桌台挂单中占用的数量
    pub reserved: u32,
    /// stock_quantity 减去 reserved (饱和到 0)
    pub available: u32,
}

/// 缓存刷新响应
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub products: usize,
}

/// GET /api/products - 获取所有商品及实时可用量
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ProductAvailability>>> {
    let mut reserved: HashMap<String, u32> = HashMap::new();
    for order in state.tables.pending_orders()? {
        for item in &order.line_items {
            *reserved.entry(item.product_id.clone()).or_insert(0) += item.quantity;
        }
    }

    let entries = state
        .catalog
        .list()
        .into_iter()
        .map(|product| {
            let held = reserved.get(&product.id).copied().unwrap_or(0);
            ProductAvailability {
                available: product.stock_quantity.saturating_sub(held),
                reserved: held,
                product,
            }
        })
        .collect();

    Ok(Json(entries))
}

/// GET /api/products/:id - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let product = state
        .catalog
        .lookup(&id)
        .ok_or_else(|| ServerError::NotFound(format!("Product {} not found", id)))?;
    Ok(Json(product))
}

/// POST /api/catalog/refresh - 重新加载商品目录缓存
///
/// 外部库存模块改完商品后调用，让目录视图立即跟上。
pub async fn refresh(State(state): State<ServerState>) -> Result<Json<RefreshResponse>> {
    let products = state.catalog.refresh()?;
    tracing::info!(products, "Catalog cache refreshed on demand");
    Ok(Json(RefreshResponse { products }))
}
