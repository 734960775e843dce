// ==========================================
// 商城数据导入系统 - 导入器 Trait
// ==========================================
// 职责: 定义导入器统一接口（不包含实现）
// 实现者: ProductImporter, CustomerImporter
// ==========================================

use crate::domain::import::{ImporterResult, RowOutcome};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// Importer Trait
// ==========================================
// 用途: 一个"数据种类 × 文件格式"组合的导入单元
// 约定: 实例在组合根构建一次后只读共享；
//       每次运行的结果在调用栈内累积，实例自身无运行期状态
#[async_trait]
pub trait Importer: Send + Sync {
    /// 从文件导入全部数据行
    ///
    /// # 参数
    /// - file_path: 数据文件路径（存在性/可读性由导入器校验）
    ///
    /// # 返回
    /// - Ok(ImporterResult): 每行已分类为 success/skipped/failed 的完整结果
    /// - Err: 仅限结构性错误（文件缺失、格式整体非法）
    ///
    /// # 行为
    /// - 按源文件顺序逐行处理，逐行落库，无整体事务
    /// - 单行失败只记录，不中止运行
    async fn import(&self, file_path: &Path) -> ImportResult<ImporterResult>;

    /// 导入单条已反序列化的数据项（队列路径入口）
    ///
    /// # 参数
    /// - item: 一条行数据（JSON 对象，schema 由具体导入器约定）
    /// - row_ref: 兜底行标识（数据项缺少自然键时使用，如队列任务 ID）
    ///
    /// # 返回
    /// - RowOutcome: 与 import() 相同的行分类规则；
    ///   单行问题一律折叠为 Failed/Skipped，不抛出错误
    async fn import_item(&self, item: &serde_json::Value, row_ref: &str) -> RowOutcome;
}

impl std::fmt::Debug for dyn Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Importer")
    }
}
