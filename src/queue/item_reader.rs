// ==========================================
// 商城数据导入系统 - 队列读取器
// ==========================================
// 职责: 把一条队列通道桥接到一个导入器，排空队列并逐条导入
// 状态机: Idle → Draining → Finished / Failed
// ==========================================
// 语义:
// - 行级问题（载荷非法、校验失败）记入结果并确认任务，不中止排空
// - 传输级故障立即转入 Failed 并作为致命错误上抛，不在本层重试
// - 空闲超时内无新任务视为排空完成
// ==========================================

use crate::domain::import::{ImporterResult, RowOutcome};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::Importer;
use crate::queue::transport::QueueTransport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

// ==========================================
// ReaderState - 读取器状态
// ==========================================

/// 队列读取器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// 已创建，未开始排空
    Idle,
    /// 排空中
    Draining,
    /// 队列已排空（空闲超时或收到停止信号）
    Finished,
    /// 传输级故障
    Failed,
}

// ==========================================
// QueueItemReader
// ==========================================

/// 队列读取器：一条队列通道绑定一个导入器
pub struct QueueItemReader<T: QueueTransport> {
    transport: T,
    importer: Arc<dyn Importer>,
    queue_name: Option<String>,
    state: ReaderState,
    /// 空闲超时：该时长内无新任务则认为队列已排空
    idle_timeout: Duration,
    /// 停止信号：置位后处理完在途任务即退出排空
    stop_flag: Arc<AtomicBool>,
}

impl<T: QueueTransport> QueueItemReader<T> {
    /// 创建队列读取器
    ///
    /// # 参数
    /// - transport: 队列传输实现
    /// - importer: 目标导入器
    /// - idle_timeout: 空闲超时
    pub fn new(transport: T, importer: Arc<dyn Importer>, idle_timeout: Duration) -> Self {
        Self {
            transport,
            importer,
            queue_name: None,
            state: ReaderState::Idle,
            idle_timeout,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 当前状态
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// 停止句柄：置位后读取器在处理完当前任务后干净退出
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    /// 绑定到指定队列（实际排空延迟到 read_and_import）
    ///
    /// # 参数
    /// - queue_name: 队列名（按 build_queue_name 约定构造）
    pub fn init_queue(&mut self, queue_name: &str) {
        self.queue_name = Some(queue_name.to_string());
        debug!(queue = %queue_name, "队列读取器已绑定");
    }

    /// 排空队列并逐条导入
    ///
    /// # 返回
    /// - Ok(ImporterResult): 本次排空产生的独立结果（由调用方决定上报或丢弃）
    /// - Err(QueueTransport): 传输级故障（致命，不自动重试）
    ///
    /// # 行为
    /// - 每条任务: 反序列化载荷 → Importer::import_item → 记录结果 → 确认移除
    /// - 确认前崩溃会导致重新投递（至少一次），导入器以 Skip 策略保证幂等
    pub async fn read_and_import(&mut self) -> ImportResult<ImporterResult> {
        let queue_name = self
            .queue_name
            .clone()
            .ok_or_else(|| ImportError::QueueTransport("队列未绑定，请先调用 init_queue".to_string()))?;

        self.state = ReaderState::Draining;
        let start = Instant::now();
        let mut result = ImporterResult::new();
        info!(queue = %queue_name, "开始排空队列");

        loop {
            // 停止信号在任务间检查，保证在途任务处理完整
            if self.stop_flag.load(Ordering::SeqCst) {
                info!(queue = %queue_name, "收到停止信号，退出排空");
                break;
            }

            let job = match self.transport.receive(&queue_name, self.idle_timeout).await {
                Ok(Some(job)) => job,
                Ok(None) => {
                    debug!(queue = %queue_name, "空闲超时，队列视为已排空");
                    break;
                }
                Err(e) => {
                    self.state = ReaderState::Failed;
                    error!(queue = %queue_name, error = %e, "队列读取失败");
                    return Err(e);
                }
            };

            let outcome = match serde_json::from_str::<serde_json::Value>(&job.payload) {
                Ok(item) => self.importer.import_item(&item, &job.job_id).await,
                Err(e) => {
                    // 载荷非法属行级问题: 记录失败并照常确认，避免毒消息阻塞队列
                    warn!(job_id = %job.job_id, error = %e, "载荷反序列化失败");
                    RowOutcome::Failed {
                        row_id: job.job_id.clone(),
                        reason: format!("载荷反序列化失败: {}", e),
                    }
                }
            };
            result.record(outcome);

            if let Err(e) = self.transport.ack(&job).await {
                self.state = ReaderState::Failed;
                error!(job_id = %job.job_id, error = %e, "任务确认失败");
                return Err(e);
            }
        }

        self.state = ReaderState::Finished;
        result.finish(start.elapsed());
        info!(
            queue = %queue_name,
            success = result.success_rows.len(),
            skipped = result.skipped_rows.len(),
            failed = result.failed_rows.len(),
            duration_ms = result.duration_ms,
            "队列排空完成"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::transport::QueueJob;
    use std::sync::Mutex;

    /// 内存队列传输（测试用）
    struct VecTransport {
        jobs: Mutex<Vec<QueueJob>>,
    }

    impl VecTransport {
        fn with_payloads(queue: &str, payloads: &[&str]) -> Self {
            let jobs = payloads
                .iter()
                .enumerate()
                .map(|(i, p)| QueueJob {
                    job_id: format!("job-{}", i + 1),
                    queue_name: queue.to_string(),
                    payload: p.to_string(),
                    created_at: String::new(),
                })
                .collect();
            Self {
                jobs: Mutex::new(jobs),
            }
        }
    }

    #[async_trait::async_trait]
    impl QueueTransport for VecTransport {
        async fn receive(
            &self,
            queue_name: &str,
            _wait: Duration,
        ) -> ImportResult<Option<QueueJob>> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs.iter().find(|j| j.queue_name == queue_name).cloned())
        }

        async fn ack(&self, job: &QueueJob) -> ImportResult<()> {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.retain(|j| j.job_id != job.job_id);
            Ok(())
        }
    }

    /// 记录处理顺序的导入器（测试用）
    struct RecordingImporter {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Importer for RecordingImporter {
        async fn import(
            &self,
            _file_path: &std::path::Path,
        ) -> ImportResult<ImporterResult> {
            Ok(ImporterResult::new())
        }

        async fn import_item(&self, item: &serde_json::Value, row_ref: &str) -> RowOutcome {
            let row_id = item
                .get("code")
                .and_then(|v| v.as_str())
                .unwrap_or(row_ref)
                .to_string();
            self.seen.lock().unwrap().push(row_id.clone());
            RowOutcome::Success { row_id }
        }
    }

    #[tokio::test]
    async fn test_reader_state_transitions() {
        let transport = VecTransport::with_payloads("q", &[r#"{"code":"P001"}"#]);
        let importer = Arc::new(RecordingImporter {
            seen: Mutex::new(Vec::new()),
        });
        let mut reader =
            QueueItemReader::new(transport, importer, Duration::from_millis(10));

        assert_eq!(reader.state(), ReaderState::Idle);
        reader.init_queue("q");
        assert_eq!(reader.state(), ReaderState::Idle);

        let result = reader.read_and_import().await.unwrap();
        assert_eq!(reader.state(), ReaderState::Finished);
        assert_eq!(result.success_rows, vec!["P001"]);
    }

    #[tokio::test]
    async fn test_read_without_init_fails() {
        let transport = VecTransport::with_payloads("q", &[]);
        let importer = Arc::new(RecordingImporter {
            seen: Mutex::new(Vec::new()),
        });
        let mut reader =
            QueueItemReader::new(transport, importer, Duration::from_millis(10));

        let err = reader.read_and_import().await.unwrap_err();
        assert!(matches!(err, ImportError::QueueTransport(_)));
    }

    #[tokio::test]
    async fn test_invalid_payload_recorded_as_failed_row() {
        let transport =
            VecTransport::with_payloads("q", &[r#"{"code":"P001"}"#, "not-json"]);
        let importer = Arc::new(RecordingImporter {
            seen: Mutex::new(Vec::new()),
        });
        let mut reader =
            QueueItemReader::new(transport, importer, Duration::from_millis(10));
        reader.init_queue("q");

        let result = reader.read_and_import().await.unwrap();
        assert_eq!(result.success_rows, vec!["P001"]);
        assert_eq!(result.failed_rows, vec!["job-2"]);
        // 毒消息也应被确认移除，不阻塞队列
        assert_eq!(reader.state(), ReaderState::Finished);
    }

    #[tokio::test]
    async fn test_stop_signal_exits_cleanly() {
        let transport = VecTransport::with_payloads("q", &[r#"{"code":"P001"}"#]);
        let importer = Arc::new(RecordingImporter {
            seen: Mutex::new(Vec::new()),
        });
        let mut reader =
            QueueItemReader::new(transport, importer, Duration::from_millis(10));
        reader.init_queue("q");

        // 排空前置位停止信号: 不应再拉取任何任务
        reader.stop_handle().store(true, Ordering::SeqCst);
        let result = reader.read_and_import().await.unwrap();
        assert_eq!(result.total_rows(), 0);
        assert_eq!(reader.state(), ReaderState::Finished);
    }
}
