// ==========================================
// 商城数据导入系统 - 导入层
// ==========================================
// 职责: 导入器契约、具体导入器、注册表与文件解析
// 支持: CSV, Excel, JSON
// ==========================================

// 模块声明
pub mod customer_importer;
pub mod error;
pub mod file_parser;
pub mod importer_trait;
pub mod product_importer;
pub mod registry;

// 重导出核心类型
pub use customer_importer::CustomerImporter;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, JsonParser};
pub use product_importer::ProductImporter;
pub use registry::ImporterRegistry;

// 重导出 Trait 接口
pub use importer_trait::Importer;
