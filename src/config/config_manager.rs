// ==========================================
// 商城数据导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载与查询
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::DuplicatePolicy;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ImportError::ConfigReadError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ImportError::ConfigReadError(format!("锁获取失败: {}", e)))?;
            crate::db::configure_sqlite_connection(&conn_guard)
                .map_err(|e| ImportError::ConfigReadError(e.to_string()))?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::ConfigReadError(format!("锁获取失败: {}", e)))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ImportError::ConfigReadError(e.to_string())),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ImportResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::ConfigReadError(format!("锁获取失败: {}", e)))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )
        .map_err(|e| ImportError::ConfigReadError(e.to_string()))?;
        Ok(())
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_queue_idle_timeout_ms(&self) -> ImportResult<u64> {
        let value = self.get_config_or_default(config_keys::QUEUE_IDLE_TIMEOUT_MS, "2000")?;
        Ok(value.parse::<u64>().unwrap_or(2000))
    }

    async fn get_queue_poll_interval_ms(&self) -> ImportResult<u64> {
        let value = self.get_config_or_default(config_keys::QUEUE_POLL_INTERVAL_MS, "50")?;
        Ok(value.parse::<u64>().unwrap_or(50))
    }

    async fn get_queue_namespace(&self) -> ImportResult<String> {
        let value = self.get_config_or_default(config_keys::QUEUE_NAMESPACE, "store")?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok("store".to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    async fn get_duplicate_policy(&self) -> ImportResult<DuplicatePolicy> {
        let value = self.get_config_or_default(config_keys::DUPLICATE_POLICY, "SKIP")?;
        Ok(DuplicatePolicy::from_str(&value))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 队列
    pub const QUEUE_IDLE_TIMEOUT_MS: &str = "queue_idle_timeout_ms";
    pub const QUEUE_POLL_INTERVAL_MS: &str = "queue_poll_interval_ms";
    pub const QUEUE_NAMESPACE: &str = "queue_namespace";

    // 导入行为
    pub const DUPLICATE_POLICY: &str = "duplicate_policy";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_config_absent() {
        let manager = setup_manager();
        assert_eq!(manager.get_queue_idle_timeout_ms().await.unwrap(), 2000);
        assert_eq!(manager.get_queue_poll_interval_ms().await.unwrap(), 50);
        assert_eq!(manager.get_queue_namespace().await.unwrap(), "store");
        assert_eq!(
            manager.get_duplicate_policy().await.unwrap(),
            DuplicatePolicy::Skip
        );
    }

    #[tokio::test]
    async fn test_set_then_read_back() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::QUEUE_NAMESPACE, "sylius")
            .unwrap();
        manager
            .set_global_config_value(config_keys::DUPLICATE_POLICY, "OVERWRITE")
            .unwrap();

        assert_eq!(manager.get_queue_namespace().await.unwrap(), "sylius");
        assert_eq!(
            manager.get_duplicate_policy().await.unwrap(),
            DuplicatePolicy::Overwrite
        );
    }

    #[tokio::test]
    async fn test_malformed_number_falls_back_to_default() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::QUEUE_IDLE_TIMEOUT_MS, "not-a-number")
            .unwrap();
        assert_eq!(manager.get_queue_idle_timeout_ms().await.unwrap(), 2000);
    }
}
