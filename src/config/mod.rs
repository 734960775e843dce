// ==========================================
// 商城数据导入系统 - 配置层
// ==========================================
// 职责: 配置读取契约与基于 config_kv 表的实现
// ==========================================

// 模块声明
pub mod config_manager;
pub mod import_config_trait;

// 重导出核心类型
pub use config_manager::ConfigManager;
pub use import_config_trait::ImportConfigReader;
