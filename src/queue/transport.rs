// ==========================================
// 商城数据导入系统 - 队列传输层
// ==========================================
// 职责: 定义队列收取/确认接口，并提供 SQLite 队列实现
// 语义: 至少一次投递 —— receive 不移除任务，ack 才移除；
//       处理后、确认前进程崩溃则任务会被重新投递
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// 构造约定队列名: `"<namespace>.export.queue.<kind>"`
///
/// 导出侧按同一约定发布，导入侧据此定位通道
pub fn build_queue_name(namespace: &str, kind: &str) -> String {
    format!("{}.export.queue.{}", namespace, kind)
}

// ==========================================
// QueueJob - 队列任务
// ==========================================

/// 一条待导入的队列任务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueJob {
    /// 任务 ID（兜底行标识）
    pub job_id: String,
    /// 所属队列名
    pub queue_name: String,
    /// 序列化载荷（一条行数据的 JSON）
    pub payload: String,
    /// 入队时间
    pub created_at: String,
}

// ==========================================
// QueueTransport Trait
// ==========================================
// 用途: 队列收取/确认抽象（连接建立由实现方负责）
// 实现者: SqliteQueueTransport；测试中可注入故障实现
#[async_trait::async_trait]
pub trait QueueTransport: Send + Sync {
    /// 有界等待地收取下一条任务
    ///
    /// # 参数
    /// - queue_name: 队列名
    /// - wait: 最大等待时长（空闲超时）
    ///
    /// # 返回
    /// - Ok(Some(job)): 收到任务（尚未从队列移除）
    /// - Ok(None): 等待期内无任务到达
    /// - Err(QueueTransport): 传输层故障，调用方应中止
    async fn receive(&self, queue_name: &str, wait: Duration) -> ImportResult<Option<QueueJob>>;

    /// 确认任务已处理，从队列移除
    async fn ack(&self, job: &QueueJob) -> ImportResult<()>;
}

// ==========================================
// SqliteQueueTransport - SQLite 队列实现
// ==========================================
// 存储: import_queue 表，按 rowid 先进先出
pub struct SqliteQueueTransport {
    conn: Arc<Mutex<Connection>>,
    /// 无任务时的轮询间隔
    poll_interval: Duration,
}

impl SqliteQueueTransport {
    /// 创建队列传输实例并确保队列表存在
    ///
    /// # 参数
    /// - conn: 共享数据库连接
    /// - poll_interval: 无任务时的轮询间隔
    pub fn new(conn: Arc<Mutex<Connection>>, poll_interval: Duration) -> ImportResult<Self> {
        let transport = Self {
            conn,
            poll_interval,
        };
        transport.ensure_queue_table()?;
        Ok(transport)
    }

    fn lock_conn(&self) -> ImportResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ImportError::QueueTransport(format!("锁获取失败: {}", e)))
    }

    /// 确保队列表存在
    fn ensure_queue_table(&self) -> ImportResult<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS import_queue (
                job_id TEXT PRIMARY KEY,
                queue_name TEXT NOT NULL,
                payload TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_import_queue_name
              ON import_queue(queue_name);
            "#,
        )
        .map_err(|e| ImportError::QueueTransport(e.to_string()))?;
        Ok(())
    }

    /// 入队一条任务（导出侧/测试使用）
    ///
    /// # 返回
    /// - Ok(String): 任务 ID
    pub fn enqueue(&self, queue_name: &str, payload: &str) -> ImportResult<String> {
        let job_id = Uuid::new_v4().to_string();
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_queue (job_id, queue_name, payload, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![job_id, queue_name, payload, Utc::now().to_rfc3339()],
        )
        .map_err(|e| ImportError::QueueTransport(e.to_string()))?;

        debug!(job_id = %job_id, queue = %queue_name, "任务已入队");
        Ok(job_id)
    }

    /// 指定队列的积压任务数
    pub fn pending_count(&self, queue_name: &str) -> ImportResult<i64> {
        let conn = self.lock_conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM import_queue WHERE queue_name = ?1",
                params![queue_name],
                |row| row.get(0),
            )
            .map_err(|e| ImportError::QueueTransport(e.to_string()))?;
        Ok(count)
    }

    /// 读取最早入队的任务（不移除）
    fn peek_earliest(&self, queue_name: &str) -> ImportResult<Option<QueueJob>> {
        let conn = self.lock_conn()?;
        let job = conn
            .query_row(
                r#"
                SELECT job_id, queue_name, payload, created_at
                  FROM import_queue
                 WHERE queue_name = ?1
                 ORDER BY rowid ASC
                 LIMIT 1
                "#,
                params![queue_name],
                |row| {
                    Ok(QueueJob {
                        job_id: row.get(0)?,
                        queue_name: row.get(1)?,
                        payload: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(|e| ImportError::QueueTransport(e.to_string()))?;
        Ok(job)
    }
}

#[async_trait::async_trait]
impl QueueTransport for SqliteQueueTransport {
    async fn receive(&self, queue_name: &str, wait: Duration) -> ImportResult<Option<QueueJob>> {
        let deadline = Instant::now() + wait;

        loop {
            if let Some(job) = self.peek_earliest(queue_name)? {
                return Ok(Some(job));
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn ack(&self, job: &QueueJob) -> ImportResult<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "DELETE FROM import_queue WHERE job_id = ?1",
            params![job.job_id],
        )
        .map_err(|e| ImportError::QueueTransport(e.to_string()))?;

        debug!(job_id = %job.job_id, "任务已确认并移除");
        Ok(())
    }
}
