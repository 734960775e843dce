// ==========================================
// 数据导入API
// ==========================================
// 职责: 导入编排 —— 定位导入器、执行文件/队列导入、汇总报告
// 说明: 自身不解析文件、不校验行，全部委托给已注册的导入器
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::importer::ImporterRegistry;
use crate::queue::{build_queue_name, QueueItemReader, SqliteQueueTransport};
use crate::domain::import::ImporterResult;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// 单次导入运行的报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRunReport {
    /// 实际命中的导入器规范名
    pub importer_name: String,
    /// 数据来源（文件路径或队列名）
    pub source: String,
    /// 行级汇总结果
    pub result: ImporterResult,
    /// 编排层总耗时（毫秒，含导入器定位）
    pub elapsed_ms: i64,
}

/// 导入API
pub struct ImportApi {
    registry: Arc<ImporterRegistry>,
    conn: Arc<Mutex<Connection>>,
    config: Arc<ConfigManager>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    ///
    /// # 参数
    /// - registry: 已完成注册的导入器注册表
    /// - conn: 共享数据库连接（队列传输复用）
    /// - config: 配置管理器
    pub fn new(
        registry: Arc<ImporterRegistry>,
        conn: Arc<Mutex<Connection>>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            registry,
            conn,
            config,
        }
    }

    /// 执行文件导入
    ///
    /// # 参数
    /// - kind: 数据种类（如 "product"）
    /// - format: 文件格式（如 "csv"）
    /// - file_path: 数据文件路径
    ///
    /// # 返回
    /// - Ok(ImportRunReport): 含行级汇总的运行报告
    /// - Err(ApiError::UnknownImporter): 未注册，错误携带可用列表
    #[instrument(skip(self))]
    pub async fn run_file_import(
        &self,
        kind: &str,
        format: &str,
        file_path: &str,
    ) -> ApiResult<ImportRunReport> {
        let start = Instant::now();
        let name = ImporterRegistry::build_canonical_name(kind, format);
        let importer = self.registry.get(&name)?;

        info!(importer = %name, file = %file_path, "开始文件导入");
        let result = importer.import(Path::new(file_path)).await?;

        Ok(ImportRunReport {
            importer_name: name,
            source: file_path.to_string(),
            result,
            elapsed_ms: start.elapsed().as_millis() as i64,
        })
    }

    /// 执行队列导入：排空一条队列通道并逐条导入
    ///
    /// # 参数
    /// - kind: 数据种类
    /// - format: 文件格式（决定命中的导入器；队列数据项本身是 JSON）
    /// - queue_name: 队列名；None 时按约定 `"<namespace>.export.queue.<kind>"` 推导
    #[instrument(skip(self))]
    pub async fn run_queue_import(
        &self,
        kind: &str,
        format: &str,
        queue_name: Option<&str>,
    ) -> ApiResult<ImportRunReport> {
        let start = Instant::now();
        let name = ImporterRegistry::build_canonical_name(kind, format);
        let importer = self.registry.get(&name)?;

        let queue_name = match queue_name {
            Some(q) => q.to_string(),
            None => {
                let namespace = self.config.get_queue_namespace().await?;
                build_queue_name(&namespace, kind)
            }
        };
        let idle_timeout_ms = self.config.get_queue_idle_timeout_ms().await?;
        let poll_interval_ms = self.config.get_queue_poll_interval_ms().await?;

        let transport = SqliteQueueTransport::new(
            Arc::clone(&self.conn),
            Duration::from_millis(poll_interval_ms),
        )?;
        let mut reader = QueueItemReader::new(
            transport,
            importer,
            Duration::from_millis(idle_timeout_ms),
        );
        reader.init_queue(&queue_name);

        info!(importer = %name, queue = %queue_name, "开始队列导入");
        let result = reader.read_and_import().await?;

        Ok(ImportRunReport {
            importer_name: name,
            source: queue_name,
            result,
            elapsed_ms: start.elapsed().as_millis() as i64,
        })
    }

    /// 并发执行多个文件导入
    ///
    /// # 参数
    /// - requests: (kind, format, file_path) 三元组列表
    ///
    /// # 返回
    /// 与输入同序的逐项结果，单项失败不影响其余项
    pub async fn batch_import_files(
        &self,
        requests: &[(String, String, String)],
    ) -> Vec<ApiResult<ImportRunReport>> {
        let futures = requests
            .iter()
            .map(|(kind, format, path)| self.run_file_import(kind, format, path));
        futures::future::join_all(futures).await
    }

    /// 按数据种类分组的可用导入器列表
    pub fn list_importers(&self) -> Vec<(String, Vec<String>)> {
        self.registry.available_by_kind()
    }
}
