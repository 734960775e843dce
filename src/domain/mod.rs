// ==========================================
// 商城数据导入系统 - 领域层
// ==========================================
// 职责: 实体与基础类型定义，不含持久化与业务流程
// ==========================================

pub mod customer;
pub mod import;
pub mod product;
pub mod types;

pub use customer::Customer;
pub use import::{ImporterResult, RowFailure, RowOutcome};
pub use product::Product;
pub use types::{DuplicatePolicy, RowIdentifier};
