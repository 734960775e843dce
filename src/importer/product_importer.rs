// ==========================================
// 商城数据导入系统 - 商品导入器
// ==========================================
// 职责: 商品数据的逐行导入，从文件或队列数据项到 product 表
// 流程: 解析 → 逐行校验 → 判重 → 落库 → 分桶记录
// ==========================================
// 行分类规则:
// - Success: 必填字段齐全、价格合法，且落库成功
// - Skipped: 商品编码已存在且策略为 Skip
// - Failed:  校验失败或落库失败（仅记录，不中止运行）
// ==========================================

use crate::domain::import::{ImporterResult, RowOutcome};
use crate::domain::product::Product;
use crate::domain::types::DuplicatePolicy;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{json_object_to_row, FileParser};
use crate::importer::importer_trait::Importer;
use crate::repository::ProductRepository;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument};

// ==========================================
// ProductImporter
// ==========================================
pub struct ProductImporter<R: ProductRepository> {
    repo: R,
    parser: Box<dyn FileParser>,
    policy: DuplicatePolicy,
}

impl<R: ProductRepository> ProductImporter<R> {
    /// 创建商品导入器
    ///
    /// # 参数
    /// - repo: 商品仓储
    /// - parser: 文件解析器（决定该导入器绑定的格式）
    /// - policy: 重复数据处理策略
    pub fn new(repo: R, parser: Box<dyn FileParser>, policy: DuplicatePolicy) -> Self {
        Self {
            repo,
            parser,
            policy,
        }
    }

    /// 处理单行数据（文件路径与队列路径共用）
    ///
    /// # 参数
    /// - row: 原始行记录（列名 → 值）
    /// - row_ref: 兜底行标识（缺少商品编码时使用）
    async fn process_row(&self, row: &HashMap<String, String>, row_ref: &str) -> RowOutcome {
        let code = row.get("code").map(|s| s.trim()).unwrap_or("");
        let row_id = if code.is_empty() {
            row_ref.to_string()
        } else {
            code.to_string()
        };

        // ===== 字段校验 =====
        if code.is_empty() {
            return RowOutcome::Failed {
                row_id,
                reason: "商品编码缺失".to_string(),
            };
        }

        let name = row.get("name").map(|s| s.trim()).unwrap_or("");
        if name.is_empty() {
            return RowOutcome::Failed {
                row_id,
                reason: "商品名称缺失".to_string(),
            };
        }

        let price_raw = row.get("price_cents").map(|s| s.trim()).unwrap_or("");
        let price_cents = match price_raw.parse::<i64>() {
            Ok(v) if v >= 0 => v,
            Ok(v) => {
                return RowOutcome::Failed {
                    row_id,
                    reason: format!("价格不能为负数: {}", v),
                }
            }
            Err(_) => {
                return RowOutcome::Failed {
                    row_id,
                    reason: format!("价格非法: '{}'", price_raw),
                }
            }
        };

        let mut product = Product::new(code.to_string(), name.to_string(), price_cents);
        product.description = row
            .get("description")
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_string());
        if let Some(enabled) = row.get("enabled") {
            product.enabled = matches!(enabled.trim(), "1" | "true" | "TRUE" | "是");
        }

        // ===== 判重 =====
        let exists = match self.repo.exists(code).await {
            Ok(v) => v,
            Err(e) => {
                return RowOutcome::Failed {
                    row_id,
                    reason: format!("判重查询失败: {}", e),
                }
            }
        };

        if exists {
            match self.policy {
                DuplicatePolicy::Skip => {
                    debug!(code = %code, "商品已存在，按 Skip 策略跳过");
                    return RowOutcome::Skipped {
                        row_id,
                        reason: "商品编码已存在".to_string(),
                    };
                }
                DuplicatePolicy::Overwrite => {
                    return match self.repo.update(&product).await {
                        Ok(()) => RowOutcome::Success { row_id },
                        Err(e) => RowOutcome::Failed {
                            row_id,
                            reason: format!("覆盖落库失败: {}", e),
                        },
                    };
                }
            }
        }

        // ===== 落库 =====
        match self.repo.insert(&product).await {
            Ok(()) => RowOutcome::Success { row_id },
            Err(e) => RowOutcome::Failed {
                row_id,
                reason: format!("落库失败: {}", e),
            },
        }
    }
}

#[async_trait::async_trait]
impl<R: ProductRepository> Importer for ProductImporter<R> {
    #[instrument(skip(self, file_path))]
    async fn import(&self, file_path: &Path) -> ImportResult<ImporterResult> {
        let start = Instant::now();
        let file_path_str = file_path.display().to_string();
        info!(file_path = %file_path_str, "开始导入商品数据");

        // 结构性错误直接中止整次运行
        let rows = self.parser.parse_to_raw_records(file_path)?;
        let total_rows = rows.len();

        let mut result = ImporterResult::new();
        for (idx, row) in rows.iter().enumerate() {
            // 兜底行标识为数据行序号（从 1 开始）
            let row_ref = (idx + 1).to_string();
            let outcome = self.process_row(row, &row_ref).await;
            result.record(outcome);
        }

        result.finish(start.elapsed());
        info!(
            total = total_rows,
            success = result.success_rows.len(),
            skipped = result.skipped_rows.len(),
            failed = result.failed_rows.len(),
            duration_ms = result.duration_ms,
            "商品数据导入完成"
        );
        Ok(result)
    }

    async fn import_item(&self, item: &serde_json::Value, row_ref: &str) -> RowOutcome {
        let obj = match item.as_object() {
            Some(obj) => obj,
            None => {
                return RowOutcome::Failed {
                    row_id: row_ref.to_string(),
                    reason: "数据项必须是 JSON 对象".to_string(),
                }
            }
        };

        let row = json_object_to_row(obj);
        self.process_row(&row, row_ref).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::importer::file_parser::CsvParser;
    use crate::repository::{ProductRepositoryImpl, ProductRepository};
    use rusqlite::Connection;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn setup_importer(policy: DuplicatePolicy) -> (ProductImporter<ProductRepositoryImpl>, Arc<Mutex<Connection>>) {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let repo = ProductRepositoryImpl::new(conn.clone());
        (
            ProductImporter::new(repo, Box::new(CsvParser), policy),
            conn,
        )
    }

    #[tokio::test]
    async fn test_import_item_success_then_skip() {
        let (importer, _conn) = setup_importer(DuplicatePolicy::Skip);
        let item = json!({"code": "P001", "name": "马克杯", "price_cents": 1990});

        let first = importer.import_item(&item, "job-1").await;
        assert!(first.is_success());
        assert_eq!(first.row_id(), "P001");

        // 至少一次投递: 重复处理同一行应落入 skipped 桶
        let second = importer.import_item(&item, "job-2").await;
        assert!(second.is_skipped());
    }

    #[tokio::test]
    async fn test_import_item_invalid_price_fails() {
        let (importer, _conn) = setup_importer(DuplicatePolicy::Skip);
        let item = json!({"code": "P002", "name": "保温壶", "price_cents": "abc"});

        let outcome = importer.import_item(&item, "job-1").await;
        assert!(outcome.is_failed());
        assert_eq!(outcome.row_id(), "P002");
    }

    #[tokio::test]
    async fn test_import_item_missing_code_uses_fallback_id() {
        let (importer, _conn) = setup_importer(DuplicatePolicy::Skip);
        let item = json!({"name": "无编码商品", "price_cents": 100});

        let outcome = importer.import_item(&item, "job-9").await;
        assert!(outcome.is_failed());
        assert_eq!(outcome.row_id(), "job-9");
    }

    #[tokio::test]
    async fn test_overwrite_policy_updates_existing() {
        let (importer, conn) = setup_importer(DuplicatePolicy::Overwrite);
        let item = json!({"code": "P001", "name": "马克杯", "price_cents": 1990});
        assert!(importer.import_item(&item, "job-1").await.is_success());

        let updated = json!({"code": "P001", "name": "马克杯(新款)", "price_cents": 2090});
        assert!(importer.import_item(&updated, "job-2").await.is_success());

        let repo = ProductRepositoryImpl::new(conn);
        let loaded = repo.get("P001").await.unwrap().unwrap();
        assert_eq!(loaded.name, "马克杯(新款)");
        assert_eq!(loaded.price_cents, 2090);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
