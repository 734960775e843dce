// ==========================================
// 商城数据导入系统 - 商品仓储 Trait
// ==========================================
// 职责: 定义商品数据访问接口（不包含业务逻辑）
// 红线: Repository 不含行分类规则，只做数据 CRUD
// ==========================================

use crate::domain::product::Product;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ProductRepository Trait
// ==========================================
// 用途: 商品导入相关数据访问
// 实现者: ProductRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 按商品编码判断是否已存在
    ///
    /// # 参数
    /// - code: 商品编码
    async fn exists(&self, code: &str) -> RepositoryResult<bool>;

    /// 插入商品（逐行落库，不包裹整次导入事务）
    ///
    /// # 参数
    /// - product: 商品主数据
    async fn insert(&self, product: &Product) -> RepositoryResult<()>;

    /// 按编码覆盖已有商品（Overwrite 策略使用）
    ///
    /// # 参数
    /// - product: 商品主数据
    async fn update(&self, product: &Product) -> RepositoryResult<()>;

    /// 按编码查询商品
    ///
    /// # 参数
    /// - code: 商品编码
    async fn get(&self, code: &str) -> RepositoryResult<Option<Product>>;

    /// 商品总数
    async fn count(&self) -> RepositoryResult<i64>;
}
