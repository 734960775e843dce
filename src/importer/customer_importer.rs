// ==========================================
// 商城数据导入系统 - 客户导入器
// ==========================================
// 职责: 客户数据的逐行导入，从文件或队列数据项到 customer 表
// ==========================================
// 行分类规则:
// - Success: 邮箱格式合法且落库成功
// - Skipped: 邮箱已存在且策略为 Skip
// - Failed:  邮箱缺失/非法或落库失败
// ==========================================

use crate::domain::customer::Customer;
use crate::domain::import::{ImporterResult, RowOutcome};
use crate::domain::types::DuplicatePolicy;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{json_object_to_row, FileParser};
use crate::importer::importer_trait::Importer;
use crate::repository::CustomerRepository;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument};

// ==========================================
// CustomerImporter
// ==========================================
pub struct CustomerImporter<R: CustomerRepository> {
    repo: R,
    parser: Box<dyn FileParser>,
    policy: DuplicatePolicy,
}

impl<R: CustomerRepository> CustomerImporter<R> {
    /// 创建客户导入器
    pub fn new(repo: R, parser: Box<dyn FileParser>, policy: DuplicatePolicy) -> Self {
        Self {
            repo,
            parser,
            policy,
        }
    }

    /// 处理单行数据（文件路径与队列路径共用）
    async fn process_row(&self, row: &HashMap<String, String>, row_ref: &str) -> RowOutcome {
        let email = row.get("email").map(|s| s.trim()).unwrap_or("");
        let row_id = if email.is_empty() {
            row_ref.to_string()
        } else {
            email.to_string()
        };

        // ===== 字段校验 =====
        if email.is_empty() {
            return RowOutcome::Failed {
                row_id,
                reason: "客户邮箱缺失".to_string(),
            };
        }
        if !email.contains('@') {
            return RowOutcome::Failed {
                row_id,
                reason: format!("邮箱格式非法: '{}'", email),
            };
        }

        let mut customer = Customer::new(email.to_string());
        customer.first_name = non_empty(row.get("first_name"));
        customer.last_name = non_empty(row.get("last_name"));
        customer.phone = non_empty(row.get("phone"));

        // ===== 判重 =====
        let exists = match self.repo.exists(email).await {
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
                    debug!(email = %email, "客户已存在，按 Skip 策略跳过");
                    return RowOutcome::Skipped {
                        row_id,
                        reason: "客户邮箱已存在".to_string(),
                    };
                }
                DuplicatePolicy::Overwrite => {
                    return match self.repo.update(&customer).await {
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
        match self.repo.insert(&customer).await {
            Ok(()) => RowOutcome::Success { row_id },
            Err(e) => RowOutcome::Failed {
                row_id,
                reason: format!("落库失败: {}", e),
            },
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[async_trait::async_trait]
impl<R: CustomerRepository> Importer for CustomerImporter<R> {
    #[instrument(skip(self, file_path))]
    async fn import(&self, file_path: &Path) -> ImportResult<ImporterResult> {
        let start = Instant::now();
        info!(file_path = %file_path.display(), "开始导入客户数据");

        let rows = self.parser.parse_to_raw_records(file_path)?;
        let total_rows = rows.len();

        let mut result = ImporterResult::new();
        for (idx, row) in rows.iter().enumerate() {
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
            "客户数据导入完成"
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
    use crate::repository::CustomerRepositoryImpl;
    use rusqlite::Connection;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn setup_importer() -> CustomerImporter<CustomerRepositoryImpl> {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        let repo = CustomerRepositoryImpl::new(Arc::new(Mutex::new(conn)));
        CustomerImporter::new(repo, Box::new(CsvParser), DuplicatePolicy::Skip)
    }

    #[tokio::test]
    async fn test_import_item_validates_email() {
        let importer = setup_importer();

        let valid = json!({"email": "li.si@example.com", "first_name": "四"});
        assert!(importer.import_item(&valid, "job-1").await.is_success());

        let invalid = json!({"email": "not-an-email"});
        let outcome = importer.import_item(&invalid, "job-2").await;
        assert!(outcome.is_failed());
        assert_eq!(outcome.row_id(), "not-an-email");
    }

    #[tokio::test]
    async fn test_redelivered_customer_is_skipped() {
        let importer = setup_importer();
        let item = json!({"email": "wang.wu@example.com"});

        assert!(importer.import_item(&item, "job-1").await.is_success());
        assert!(importer.import_item(&item, "job-1").await.is_skipped());
    }
}
