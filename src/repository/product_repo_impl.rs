// ==========================================
// 商城数据导入系统 - 商品仓储实现
// ==========================================
// 职责: product 表的数据访问（rusqlite）
// 存储: SQLite product 表（code 主键）
// ==========================================

use crate::domain::product::Product;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::product_repo::ProductRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// ProductRepositoryImpl
// ==========================================
pub struct ProductRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepositoryImpl {
    /// 从共享连接创建仓储实例
    ///
    /// # 参数
    /// - conn: 共享数据库连接（调用方负责已初始化 schema）
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl ProductRepository for ProductRepositoryImpl {
    async fn exists(&self, code: &str) -> RepositoryResult<bool> {
        let conn = self.lock_conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM product WHERE code = ?1 LIMIT 1",
                params![code],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    async fn insert(&self, product: &Product) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO product (code, name, price_cents, description, enabled, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                product.code,
                product.name,
                product.price_cents,
                product.description,
                if product.enabled { 1 } else { 0 },
                product.created_at.to_rfc3339(),
                product.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE product
               SET name = ?2, price_cents = ?3, description = ?4, enabled = ?5, updated_at = ?6
             WHERE code = ?1
            "#,
            params![
                product.code,
                product.name,
                product.price_cents,
                product.description,
                if product.enabled { 1 } else { 0 },
                Utc::now().to_rfc3339(),
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: product.code.clone(),
            });
        }
        Ok(())
    }

    async fn get(&self, code: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.lock_conn()?;
        let product = conn
            .query_row(
                r#"
                SELECT code, name, price_cents, description, enabled, created_at, updated_at
                  FROM product
                 WHERE code = ?1
                "#,
                params![code],
                |row| {
                    let created_at: String = row.get(5)?;
                    let updated_at: String = row.get(6)?;
                    let enabled: i64 = row.get(4)?;
                    Ok(Product {
                        code: row.get(0)?,
                        name: row.get(1)?,
                        price_cents: row.get(2)?,
                        description: row.get(3)?,
                        enabled: enabled != 0,
                        created_at: parse_rfc3339(&created_at),
                        updated_at: parse_rfc3339(&updated_at),
                    })
                },
            )
            .optional()?;
        Ok(product)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM product", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// 解析 RFC3339 时间戳，非法值回退为当前时刻
fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
