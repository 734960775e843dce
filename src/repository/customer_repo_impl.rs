// ==========================================
// 商城数据导入系统 - 客户仓储实现
// ==========================================
// 职责: customer 表的数据访问（rusqlite）
// 存储: SQLite customer 表（email 主键）
// ==========================================

use crate::domain::customer::Customer;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::customer_repo::CustomerRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// CustomerRepositoryImpl
// ==========================================
pub struct CustomerRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CustomerRepositoryImpl {
    /// 从共享连接创建仓储实例
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
impl CustomerRepository for CustomerRepositoryImpl {
    async fn exists(&self, email: &str) -> RepositoryResult<bool> {
        let conn = self.lock_conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM customer WHERE email = ?1 LIMIT 1",
                params![email],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    async fn insert(&self, customer: &Customer) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO customer (email, first_name, last_name, phone, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                customer.email,
                customer.first_name,
                customer.last_name,
                customer.phone,
                customer.created_at.to_rfc3339(),
                customer.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn update(&self, customer: &Customer) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE customer
               SET first_name = ?2, last_name = ?3, phone = ?4, updated_at = ?5
             WHERE email = ?1
            "#,
            params![
                customer.email,
                customer.first_name,
                customer.last_name,
                customer.phone,
                Utc::now().to_rfc3339(),
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Customer".to_string(),
                id: customer.email.clone(),
            });
        }
        Ok(())
    }

    async fn get(&self, email: &str) -> RepositoryResult<Option<Customer>> {
        let conn = self.lock_conn()?;
        let customer = conn
            .query_row(
                r#"
                SELECT email, first_name, last_name, phone, created_at, updated_at
                  FROM customer
                 WHERE email = ?1
                "#,
                params![email],
                |row| {
                    let created_at: String = row.get(4)?;
                    let updated_at: String = row.get(5)?;
                    Ok(Customer {
                        email: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        phone: row.get(3)?,
                        created_at: parse_rfc3339(&created_at),
                        updated_at: parse_rfc3339(&updated_at),
                    })
                },
            )
            .optional()?;
        Ok(customer)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM customer", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// 解析 RFC3339 时间戳，非法值回退为当前时刻
fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_repo() -> CustomerRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        CustomerRepositoryImpl::new(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = setup_repo();
        let mut customer = Customer::new("zhang.san@example.com".to_string());
        customer.first_name = Some("三".to_string());
        customer.last_name = Some("张".to_string());

        repo.insert(&customer).await.unwrap();
        assert!(repo.exists("zhang.san@example.com").await.unwrap());

        let loaded = repo.get("zhang.san@example.com").await.unwrap().unwrap();
        assert_eq!(loaded.first_name.as_deref(), Some("三"));
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
