// ==========================================
// 商城数据导入系统 - 文件解析器实现
// ==========================================
// 职责: 把数据文件解析为原始行记录（列名 → 值）
// 支持: CSV (.csv) / Excel (.xlsx/.xls) / JSON (.json)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（导入流程的第 0 阶段）
// 实现者: CsvParser, ExcelParser, JsonParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录（HashMap<列名, 值>）
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(Vec<HashMap<String, String>>): 行记录列表（保持文件顺序）
    /// - Err: 文件缺失、格式整体非法等结构性错误
    fn parse_to_raw_records(
        &self,
        file_path: &Path,
    ) -> ImportResult<Vec<HashMap<String, String>>>;
}

fn ensure_file_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(
        &self,
        file_path: &Path,
    ) -> ImportResult<Vec<HashMap<String, String>>> {
        ensure_file_exists(file_path)?;

        // 检查扩展名
        if let Some(ext) = file_path.extension() {
            if ext != "csv" {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(row_map);
        }

        Ok(records)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(
        &self,
        file_path: &Path,
    ) -> ImportResult<Vec<HashMap<String, String>>> {
        ensure_file_exists(file_path)?;

        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext.to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(file_path)
            .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError(
                "Excel 文件无工作表".to_string(),
            ));
        }

        let sheet_name = sheet_names[0].clone();
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut records = Vec::new();
        for data_row in rows {
            let mut row_map = HashMap::new();

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    let value = cell.to_string().trim().to_string();
                    row_map.insert(header.clone(), value);
                }
            }

            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(row_map);
        }

        Ok(records)
    }
}

// ==========================================
// JSON Parser 实现
// ==========================================
// 约定: 文件内容为对象数组，每个对象为一行；
//       标量值统一转为字符串，null 转为空串
pub struct JsonParser;

impl FileParser for JsonParser {
    fn parse_to_raw_records(
        &self,
        file_path: &Path,
    ) -> ImportResult<Vec<HashMap<String, String>>> {
        ensure_file_exists(file_path)?;

        if let Some(ext) = file_path.extension() {
            if ext != "json" {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let content = std::fs::read_to_string(file_path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;

        let items = value
            .as_array()
            .ok_or_else(|| ImportError::JsonParseError("顶层结构必须是对象数组".to_string()))?;

        let mut records = Vec::new();
        for item in items {
            let obj = item.as_object().ok_or_else(|| {
                ImportError::JsonParseError("数组元素必须是对象".to_string())
            })?;

            let row_map = json_object_to_row(obj);
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }
            records.push(row_map);
        }

        Ok(records)
    }
}

/// 将 JSON 对象转为原始行记录（标量统一字符串化）
///
/// 队列路径反序列化后的数据项也走这条转换，保证两条路径行为一致
pub fn json_object_to_row(
    obj: &serde_json::Map<String, serde_json::Value>,
) -> HashMap<String, String> {
    let mut row_map = HashMap::new();
    for (key, value) in obj {
        let s = match value {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Null => String::new(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        };
        row_map.insert(key.clone(), s);
    }
    row_map
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "code,name,price_cents").unwrap();
        writeln!(temp_file, "P001,白色马克杯,1990").unwrap();
        writeln!(temp_file, "P002,保温壶,5990").unwrap();

        let parser = CsvParser;
        let records = parser.parse_to_raw_records(temp_file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("code"), Some(&"P001".to_string()));
        assert_eq!(records[1].get("price_cents"), Some(&"5990".to_string()));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let parser = CsvParser;
        let result = parser.parse_to_raw_records(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "code,name").unwrap();
        writeln!(temp_file, "P001,马克杯").unwrap();
        writeln!(temp_file, ",").unwrap(); // 空行
        writeln!(temp_file, "P002,保温壶").unwrap();

        let parser = CsvParser;
        let records = parser.parse_to_raw_records(temp_file.path()).unwrap();

        // 应跳过空行
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_json_parser_valid_file() {
        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            temp_file,
            r#"[{{"code":"P001","name":"马克杯","price_cents":1990,"enabled":true}},
                {{"code":"P002","name":"保温壶","price_cents":null}}]"#
        )
        .unwrap();

        let parser = JsonParser;
        let records = parser.parse_to_raw_records(temp_file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("price_cents"), Some(&"1990".to_string()));
        assert_eq!(records[0].get("enabled"), Some(&"true".to_string()));
        // null 转为空串
        assert_eq!(records[1].get("price_cents"), Some(&String::new()));
    }

    #[test]
    fn test_json_parser_rejects_non_array() {
        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(temp_file, r#"{{"code":"P001"}}"#).unwrap();

        let parser = JsonParser;
        let result = parser.parse_to_raw_records(temp_file.path());
        assert!(matches!(result, Err(ImportError::JsonParseError(_))));
    }
}
