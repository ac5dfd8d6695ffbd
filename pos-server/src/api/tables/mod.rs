//! Table API 模块
//!
//! 桌台生命周期和挂单编辑的全部 HTTP 入口。

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", put(handler::rename).delete(handler::delete))
        .route(
            "/{id}/order",
            get(handler::get_order).delete(handler::cancel_order),
        )
        .route("/{id}/order/items", post(handler::add_item))
        .route(
            "/{id}/order/items/{product_id}",
            put(handler::edit_item).delete(handler::remove_item),
        )
        .route("/{id}/check", get(handler::check_reservable))
}
