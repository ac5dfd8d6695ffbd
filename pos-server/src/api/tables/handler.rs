//! Table API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{PendingOrder, Table, TableCreate, TableRename};

use crate::core::{Result, ServerState};
use crate::sales::Reservation;

/// POST /api/tables/:id/order/items 请求体
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// PUT /api/tables/:id/order/items/:product_id 请求体
#[derive(Debug, Deserialize)]
pub struct EditItemRequest {
    pub quantity: u32,
    /// 可选改价 (分)
    pub unit_price: Option<i64>,
}

/// GET /api/tables/:id/check 查询参数
#[derive(Debug, Deserialize)]
pub struct ReservationQuery {
    pub product_id: String,
    pub quantity: u32,
}

/// GET /api/tables - 获取所有桌台
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Table>>> {
    Ok(Json(state.tables.list_tables()?))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TableCreate>,
) -> Result<Json<Table>> {
    Ok(Json(state.tables.create_table(&payload.name)?))
}

/// PUT /api/tables/:id - 重命名桌台
pub async fn rename(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<TableRename>,
) -> Result<Json<Table>> {
    Ok(Json(state.tables.rename_table(&id, &payload.name)?))
}

/// DELETE /api/tables/:id - 删除桌台 (挂单非空时拒绝)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<bool>> {
    state.tables.delete_table(&id)?;
    Ok(Json(true))
}

/// GET /api/tables/:id/order - 当前挂单 (没有则为 null)
pub async fn get_order(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Option<PendingOrder>>> {
    Ok(Json(state.tables.get_order(&id)?))
}

/// DELETE /api/tables/:id/order - 取消挂单 (不动库存)
pub async fn cancel_order(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<bool>> {
    state.tables.cancel_order(&id)?;
    Ok(Json(true))
}

/// POST /api/tables/:id/order/items - 加一项 (同品合并)
pub async fn add_item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<PendingOrder>> {
    let order = state
        .tables
        .add_line_item(&id, &payload.product_id, payload.quantity)?;
    Ok(Json(order))
}

/// PUT /api/tables/:id/order/items/:product_id - 改数量/改价
pub async fn edit_item(
    State(state): State<ServerState>,
    Path((id, product_id)): Path<(String, String)>,
    Json(payload): Json<EditItemRequest>,
) -> Result<Json<PendingOrder>> {
    let order =
        state
            .tables
            .edit_line_item(&id, &product_id, payload.quantity, payload.unit_price)?;
    Ok(Json(order))
}

/// DELETE /api/tables/:id/order/items/:product_id - 移除一项
pub async fn remove_item(
    State(state): State<ServerState>,
    Path((id, product_id)): Path<(String, String)>,
) -> Result<Json<PendingOrder>> {
    Ok(Json(state.tables.remove_line_item(&id, &product_id)?))
}

/// GET /api/tables/:id/check - 咨询性库存校验
pub async fn check_reservable(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<ReservationQuery>,
) -> Result<Json<Reservation>> {
    let reservation = state
        .tables
        .check_reservable(&query.product_id, query.quantity, &id)?;
    Ok(Json(reservation))
}
