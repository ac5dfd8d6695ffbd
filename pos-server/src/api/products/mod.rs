//! Product API 模块
//!
//! 只读接口：商品本身由外部库存模块维护，这里只暴露目录视图
//! 和缓存刷新。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/products", routes())
        .route("/api/catalog/refresh", post(handler::refresh))
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
}
