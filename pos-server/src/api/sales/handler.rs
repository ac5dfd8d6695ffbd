//! Sales API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::{PaymentSplit, Sale};
use shared::util;

use crate::core::{Result, ServerState};

/// POST /api/sales 请求体
#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    pub table_id: String,
    pub payment: PaymentSplit,
}

/// GET /api/sales 查询参数 (毫秒时间戳, 闭区间)
#[derive(Debug, Deserialize)]
pub struct SalesRange {
    #[serde(default)]
    pub from: i64,
    pub to: Option<i64>,
}

/// POST /api/sales - 结账: 把桌台挂单原子地转成销售记录
pub async fn finalize(
    State(state): State<ServerState>,
    Json(payload): Json<FinalizeRequest>,
) -> Result<Json<Sale>> {
    let sale = state
        .tables
        .finalize_order(&payload.table_id, payload.payment)
        .await?;
    Ok(Json(sale))
}

/// GET /api/sales?from=&to= - 按时间范围查询销售记录
pub async fn list(
    State(state): State<ServerState>,
    Query(range): Query<SalesRange>,
) -> Result<Json<Vec<Sale>>> {
    let to = range.to.unwrap_or_else(util::now_millis);
    Ok(Json(state.storage.list_sales_between(range.from, to)?))
}
