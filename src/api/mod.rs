// ==========================================
// 商城数据导入系统 - API层
// ==========================================
// 职责: 导入编排入口与对外错误类型
// ==========================================

// 模块声明
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportRunReport};
