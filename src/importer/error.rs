// ==========================================
// 商城数据导入系统 - 导入模块错误类型
// ==========================================
// 职责: 定义导入引擎的结构性错误
// 工具: thiserror 派生宏
// ==========================================
// 说明: 行级问题不在此建模 —— 单行失败以 RowOutcome::Failed
//       记入结果，永不作为 Err 越过导入器边界；
//       此处仅包含会中止整次运行的错误
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 注册表错误 =====
    #[error("未找到导入器 '{name}'，可用导入器: {}", .available.join(", "))]
    UnknownImporter {
        name: String,
        available: Vec<String>,
    },

    #[error("导入器重复注册: {0}")]
    DuplicateImporter(String),

    // ===== 数据源错误（整次运行中止）=====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv/.xlsx/.json）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("JSON 解析失败: {0}")]
    JsonParseError(String),

    // ===== 队列传输错误（整次运行中止）=====
    #[error("队列传输失败: {0}")]
    QueueTransport(String),

    // ===== 配置错误 =====
    #[error("配置读取失败: {0}")]
    ConfigReadError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::JsonParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
