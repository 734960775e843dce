// ==========================================
// 商城数据导入系统 - 应用层
// ==========================================
// 职责: 组合根 —— 打开数据库、初始化表结构、注册全部导入器
// ==========================================

// 模块声明
pub mod report;

pub use report::render_report;

use crate::api::ImportApi;
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db;
use crate::domain::types::DuplicatePolicy;
use crate::importer::{
    CsvParser, CustomerImporter, ExcelParser, ImporterRegistry, JsonParser, ProductImporter,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::FileParser;
use crate::importer::importer_trait::Importer;
use crate::repository::{CustomerRepositoryImpl, ProductRepositoryImpl};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

// ==========================================
// AppState - 应用状态
// ==========================================

/// 应用状态：持有共享连接与已组装的导入API
pub struct AppState {
    pub conn: Arc<Mutex<Connection>>,
    pub registry: Arc<ImporterRegistry>,
    pub config: Arc<ConfigManager>,
    pub import_api: ImportApi,
}

impl AppState {
    /// 初始化应用状态
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 打开连接、建表、读取重复策略配置、注册全部导入器
    pub async fn init(db_path: &str) -> ImportResult<Self> {
        let conn = db::open_sqlite_connection(db_path)
            .map_err(|e| ImportError::InternalError(format!("数据库打开失败: {}", e)))?;
        db::init_schema(&conn)
            .map_err(|e| ImportError::InternalError(format!("表结构初始化失败: {}", e)))?;
        let conn = Arc::new(Mutex::new(conn));

        let config = Arc::new(ConfigManager::from_connection(Arc::clone(&conn))?);
        let policy = config.get_duplicate_policy().await?;

        let registry = Arc::new(build_registry(Arc::clone(&conn), policy)?);
        info!(
            db_path = %db_path,
            importers = registry.len(),
            policy = policy.as_str(),
            "应用状态初始化完成"
        );

        let import_api = ImportApi::new(
            Arc::clone(&registry),
            Arc::clone(&conn),
            Arc::clone(&config),
        );

        Ok(Self {
            conn,
            registry,
            config,
            import_api,
        })
    }
}

/// 注册全部导入器：商品与客户 × CSV/Excel/JSON
///
/// # 返回
/// - Ok(ImporterRegistry): 完成注册的注册表（此后只读共享）
pub fn build_registry(
    conn: Arc<Mutex<Connection>>,
    policy: DuplicatePolicy,
) -> ImportResult<ImporterRegistry> {
    let mut registry = ImporterRegistry::new();

    let formats: [(&str, fn() -> Box<dyn FileParser>); 3] = [
        ("csv", || Box::new(CsvParser)),
        ("xlsx", || Box::new(ExcelParser)),
        ("json", || Box::new(JsonParser)),
    ];

    for (format, make_parser) in formats {
        let repo = ProductRepositoryImpl::new(Arc::clone(&conn));
        let importer: Arc<dyn Importer> =
            Arc::new(ProductImporter::new(repo, make_parser(), policy));
        registry.register(
            ImporterRegistry::build_canonical_name("product", format),
            importer,
        )?;
    }

    for (format, make_parser) in formats {
        let repo = CustomerRepositoryImpl::new(Arc::clone(&conn));
        let importer: Arc<dyn Importer> =
            Arc::new(CustomerImporter::new(repo, make_parser(), policy));
        registry.register(
            ImporterRegistry::build_canonical_name("customer", format),
            importer,
        )?;
    }

    Ok(registry)
}

/// 默认数据库路径: `<用户数据目录>/store-data-import/store.db`
///
/// 数据目录不可用时退化为当前目录
pub fn get_default_db_path() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("store-data-import").join("store.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_registry_registers_all_combinations() {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        let registry =
            build_registry(Arc::new(Mutex::new(conn)), DuplicatePolicy::Skip).unwrap();

        assert_eq!(registry.len(), 6);
        for name in [
            "product.csv",
            "product.xlsx",
            "product.json",
            "customer.csv",
            "customer.xlsx",
            "customer.json",
        ] {
            assert!(registry.has(name), "缺少导入器: {}", name);
        }
    }

    #[test]
    fn test_default_db_path_has_app_dir() {
        let path = get_default_db_path();
        assert!(path.to_string_lossy().contains("store-data-import"));
    }
}
