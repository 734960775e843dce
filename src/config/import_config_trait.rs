// ==========================================
// 商城数据导入系统 - 导入配置接口
// ==========================================
// 职责: 定义导入流程所需的配置读取契约
// 实现者: ConfigManager
// ==========================================

use crate::domain::types::DuplicatePolicy;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 队列配置 =====

    /// 队列空闲超时（毫秒，默认 2000）
    ///
    /// 该时长内无新任务则认为队列已排空
    async fn get_queue_idle_timeout_ms(&self) -> ImportResult<u64>;

    /// 队列轮询间隔（毫秒，默认 50）
    async fn get_queue_poll_interval_ms(&self) -> ImportResult<u64>;

    /// 队列命名空间（默认 "store"）
    ///
    /// 用于构造约定队列名 `"<namespace>.export.queue.<kind>"`
    async fn get_queue_namespace(&self) -> ImportResult<String>;

    // ===== 导入行为配置 =====

    /// 重复数据处理策略（默认 Skip）
    async fn get_duplicate_policy(&self) -> ImportResult<DuplicatePolicy>;
}
