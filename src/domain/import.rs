// ==========================================
// 商城数据导入系统 - 导入结果模型
// ==========================================
// 职责: 定义单行处理结果与整次导入运行的汇总结果
// 不变量: 同一行标识至多出现在 success/skipped/failed 之一
// ==========================================

use crate::domain::types::RowIdentifier;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

// ==========================================
// RowOutcome - 单行处理结果
// ==========================================

/// 单行处理结果
///
/// 行级失败只记录、不向上传播，保证单行问题不会中断整次导入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowOutcome {
    /// 校验通过且已落库
    Success { row_id: RowIdentifier },
    /// 按领域规则主动跳过（如重复数据 + Skip 策略）
    Skipped {
        row_id: RowIdentifier,
        reason: String,
    },
    /// 校验失败、落库失败或行级异常
    Failed {
        row_id: RowIdentifier,
        reason: String,
    },
}

impl RowOutcome {
    pub fn row_id(&self) -> &str {
        match self {
            RowOutcome::Success { row_id }
            | RowOutcome::Skipped { row_id, .. }
            | RowOutcome::Failed { row_id, .. } => row_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Success { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RowOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RowOutcome::Failed { .. })
    }
}

// ==========================================
// RowFailure - 失败明细
// ==========================================

/// 失败行明细（供报表定位问题行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub row_id: RowIdentifier,
    pub reason: String,
}

// ==========================================
// ImporterResult - 导入运行汇总结果
// ==========================================

/// 整次导入运行的汇总结果
///
/// # 生命周期
/// - 运行开始时由导入器/队列读取器创建为空
/// - 运行期间仅由该持有者通过 record() 累加
/// - finish() 写入耗时后返回给调用方，此后视为只读
///
/// # 顺序保证
/// 顺序执行时三个桶各自保持源文件中的相对顺序
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImporterResult {
    /// 运行耗时（毫秒），finish() 时一次性写入
    pub duration_ms: i64,
    /// 成功落库的行标识（按处理顺序）
    pub success_rows: Vec<RowIdentifier>,
    /// 主动跳过的行标识（按处理顺序）
    pub skipped_rows: Vec<RowIdentifier>,
    /// 处理失败的行标识（按处理顺序）
    pub failed_rows: Vec<RowIdentifier>,
    /// 失败明细
    pub failures: Vec<RowFailure>,
    /// 已记录的行标识（分桶互斥保护）
    #[serde(skip)]
    seen: HashSet<RowIdentifier>,
}

impl ImporterResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一行处理结果
    ///
    /// # 说明
    /// 同一行标识重复记录时忽略后到的结果并告警，
    /// 保证三个桶两两不相交
    pub fn record(&mut self, outcome: RowOutcome) {
        if !self.seen.insert(outcome.row_id().to_string()) {
            warn!(row_id = %outcome.row_id(), "行结果重复记录，已忽略");
            return;
        }

        match outcome {
            RowOutcome::Success { row_id } => self.success_rows.push(row_id),
            RowOutcome::Skipped { row_id, .. } => self.skipped_rows.push(row_id),
            RowOutcome::Failed { row_id, reason } => {
                self.failed_rows.push(row_id.clone());
                self.failures.push(RowFailure { row_id, reason });
            }
        }
    }

    /// 完成运行，写入耗时
    pub fn finish(&mut self, elapsed: Duration) {
        self.duration_ms = elapsed.as_millis() as i64;
    }

    /// 已处理的总行数
    pub fn total_rows(&self) -> usize {
        self.success_rows.len() + self.skipped_rows.len() + self.failed_rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_partitions_rows() {
        let mut result = ImporterResult::new();
        result.record(RowOutcome::Success {
            row_id: "P001".to_string(),
        });
        result.record(RowOutcome::Skipped {
            row_id: "P002".to_string(),
            reason: "已存在".to_string(),
        });
        result.record(RowOutcome::Failed {
            row_id: "P003".to_string(),
            reason: "价格非法".to_string(),
        });

        assert_eq!(result.success_rows, vec!["P001"]);
        assert_eq!(result.skipped_rows, vec!["P002"]);
        assert_eq!(result.failed_rows, vec!["P003"]);
        assert_eq!(result.total_rows(), 3);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].reason, "价格非法");
    }

    #[test]
    fn test_duplicate_row_id_recorded_once() {
        let mut result = ImporterResult::new();
        result.record(RowOutcome::Success {
            row_id: "P001".to_string(),
        });
        // 同一行标识再次记录应被忽略
        result.record(RowOutcome::Failed {
            row_id: "P001".to_string(),
            reason: "重复".to_string(),
        });

        assert_eq!(result.success_rows.len(), 1);
        assert!(result.failed_rows.is_empty());
        assert_eq!(result.total_rows(), 1);
    }

    #[test]
    fn test_finish_sets_duration() {
        let mut result = ImporterResult::new();
        result.finish(Duration::from_millis(42));
        assert_eq!(result.duration_ms, 42);
        assert!(result.duration_ms >= 0);
    }
}
