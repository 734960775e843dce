// ==========================================
// 商城数据导入系统 - 仓储层
// ==========================================
// 职责: 目标库数据访问（SQLite），不含导入流程逻辑
// ==========================================

pub mod customer_repo;
pub mod customer_repo_impl;
pub mod error;
pub mod product_repo;
pub mod product_repo_impl;

pub use customer_repo::CustomerRepository;
pub use customer_repo_impl::CustomerRepositoryImpl;
pub use error::{RepositoryError, RepositoryResult};
pub use product_repo::ProductRepository;
pub use product_repo_impl::ProductRepositoryImpl;
