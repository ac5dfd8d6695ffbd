//! POS Server - 酒吧/餐厅销售点后端
//!
//! # 架构概述
//!
//! 单店边缘部署的销售点后端，提供以下核心功能：
//!
//! - **商品目录** (`catalog`): 内存缓存的商品目录，库存以存储为准
//! - **数据库** (`db`): 嵌入式 redb 存储 (商品、桌台、挂单、销售记录)
//! - **桌台会话** (`tables`): 桌台生命周期与挂单编辑
//! - **结账引擎** (`sales`): 咨询性库存校验 + 原子结账提交
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── db/            # 数据库层 (redb)
//! ├── catalog/       # 商品目录缓存
//! ├── sales/         # 库存校验与结账提交
//! ├── tables/        # 桌台会话管理
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志等工具
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod db;
pub mod sales;
pub mod tables;
pub mod utils;

// Re-export 公共类型
pub use catalog::CatalogService;
pub use core::{Config, Server, ServerError, ServerState};
pub use db::{PosStorage, StorageError};
pub use sales::{Reservation, SaleCommitEngine, SaleError, StockValidator};
pub use tables::TableSessionManager;

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: dotenv、工作目录、日志
pub fn setup_environment() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = config.log_dir();
    init_logger_with_file(log_level.as_deref(), log_dir.to_str());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  _____    _____
   / __ \/ __ \/ ___/   / ___/___  ______   _____  _____
  / /_/ / / / /\__ \    \__ \/ _ \/ ___/ | / / _ \/ ___/
 / ____/ /_/ /___/ /   ___/ /  __/ /   | |/ /  __/ /
/_/    \____//____/   /____/\___/_/    |___/\___/_/
    "#
    );
}
