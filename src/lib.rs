// ==========================================
// 商城数据导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 商城商品/客户数据的文件与队列导入引擎
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 导入器、注册表与文件解析
pub mod importer;

// 队列层 - 队列传输与读取器
pub mod queue;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 导入编排
pub mod api;

// 应用层 - 组合根与报告
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DuplicatePolicy, RowIdentifier};

// 领域实体与结果模型
pub use domain::{Customer, ImporterResult, Product, RowFailure, RowOutcome};

// 导入层
pub use importer::{ImportError, ImportResult, Importer, ImporterRegistry};

// 队列层
pub use queue::{build_queue_name, QueueItemReader, QueueTransport, SqliteQueueTransport};

// API
pub use api::{ApiError, ImportApi, ImportRunReport};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "商城数据导入系统";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
