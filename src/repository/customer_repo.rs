// ==========================================
// 商城数据导入系统 - 客户仓储 Trait
// ==========================================
// 职责: 定义客户数据访问接口（不包含业务逻辑）
// 红线: Repository 不含行分类规则，只做数据 CRUD
// ==========================================

use crate::domain::customer::Customer;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CustomerRepository Trait
// ==========================================
// 用途: 客户导入相关数据访问
// 实现者: CustomerRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// 按邮箱判断客户是否已存在
    async fn exists(&self, email: &str) -> RepositoryResult<bool>;

    /// 插入客户（逐行落库，不包裹整次导入事务）
    async fn insert(&self, customer: &Customer) -> RepositoryResult<()>;

    /// 按邮箱覆盖已有客户（Overwrite 策略使用）
    async fn update(&self, customer: &Customer) -> RepositoryResult<()>;

    /// 按邮箱查询客户
    async fn get(&self, email: &str) -> RepositoryResult<Option<Customer>>;

    /// 客户总数
    async fn count(&self) -> RepositoryResult<i64>;
}
