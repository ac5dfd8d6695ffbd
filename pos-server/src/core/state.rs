use std::time::Duration;

use crate::catalog::CatalogService;
use crate::core::Config;
use crate::db::PosStorage;
use crate::sales::SaleCommitEngine;
use crate::tables::TableSessionManager;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是 POS 后端的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | storage | PosStorage | 嵌入式数据库 (redb) |
/// | catalog | CatalogService | 商品目录缓存 |
/// | tables | TableSessionManager | 桌台会话与订单编辑 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库
    pub storage: PosStorage,
    /// 商品目录缓存
    pub catalog: CatalogService,
    /// 桌台会话管理
    pub tables: TableSessionManager,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/pos.redb)
    /// 3. 商品目录缓存预热
    /// 4. 结账引擎和桌台管理器
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        config.ensure_work_dir_structure()?;

        let storage = PosStorage::open(config.database_path())?;
        let catalog = CatalogService::new(storage.clone());
        let cached = catalog.refresh()?;
        tracing::info!(products = cached, "Catalog cache warmed up");

        let engine = SaleCommitEngine::new(storage.clone()).with_retry(
            config.commit_max_retries,
            Duration::from_millis(config.commit_backoff_ms),
        );
        let tables = TableSessionManager::new(storage.clone(), catalog.clone(), engine);

        Ok(Self {
            config: config.clone(),
            storage,
            catalog,
            tables,
        })
    }

    /// 获取存储实例
    pub fn get_storage(&self) -> PosStorage {
        self.storage.clone()
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
