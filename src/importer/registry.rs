// ==========================================
// 商城数据导入系统 - 导入器注册表
// ==========================================
// 职责: 规范名 → 导入器实例的只读查找表
// 约定: 在组合根一次性注册，此后只读共享（无锁并发读安全）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::Importer;
use std::collections::HashMap;
use std::sync::Arc;

// ==========================================
// ImporterRegistry
// ==========================================

/// 导入器注册表
///
/// # 规范名
/// 格式为 `"<数据种类>.<文件格式>"`（如 `"product.csv"`），
/// 一律通过 build_canonical_name() 构造，调用方不得手拼
///
/// # 枚举顺序
/// all() 按注册顺序稳定遍历
#[derive(Default)]
pub struct ImporterRegistry {
    /// 注册顺序保持的条目表
    entries: Vec<(String, Arc<dyn Importer>)>,
    /// 规范名 → entries 下标（O(1) 存在性检查）
    index: HashMap<String, usize>,
}

impl ImporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构造规范名（唯一入口）
    ///
    /// # 参数
    /// - kind: 数据种类（如 "product"）
    /// - format: 文件格式（如 "csv"）
    pub fn build_canonical_name(kind: &str, format: &str) -> String {
        format!(
            "{}.{}",
            kind.trim().to_lowercase(),
            format.trim().to_lowercase()
        )
    }

    /// 注册一个导入器
    ///
    /// # 返回
    /// - Err(DuplicateImporter): 规范名已被占用（注册表内规范名唯一）
    pub fn register(
        &mut self,
        name: impl Into<String>,
        importer: Arc<dyn Importer>,
    ) -> ImportResult<()> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(ImportError::DuplicateImporter(name));
        }

        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, importer));
        Ok(())
    }

    /// 存在性检查，O(1)
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// 按规范名查找导入器
    ///
    /// # 返回
    /// - Err(UnknownImporter): 未注册，错误携带全部可用规范名
    pub fn get(&self, name: &str) -> ImportResult<Arc<dyn Importer>> {
        match self.index.get(name) {
            Some(&idx) => Ok(Arc::clone(&self.entries[idx].1)),
            None => Err(ImportError::UnknownImporter {
                name: name.to_string(),
                available: self.names(),
            }),
        }
    }

    /// 按注册顺序遍历全部条目
    pub fn all(&self) -> impl Iterator<Item = (&str, &Arc<dyn Importer>)> {
        self.entries
            .iter()
            .map(|(name, importer)| (name.as_str(), importer))
    }

    /// 全部规范名（按注册顺序）
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    /// 按数据种类分组的可用格式列表（按注册顺序）
    ///
    /// # 用途
    /// "未找到导入器"时的恢复提示与 CLI 列表展示
    pub fn available_by_kind(&self) -> Vec<(String, Vec<String>)> {
        let mut kinds: Vec<(String, Vec<String>)> = Vec::new();
        for (name, _) in &self.entries {
            let (kind, format) = match name.split_once('.') {
                Some(pair) => pair,
                None => (name.as_str(), ""),
            };

            match kinds.iter_mut().find(|(k, _)| k == kind) {
                Some((_, formats)) => formats.push(format.to_string()),
                None => kinds.push((kind.to_string(), vec![format.to_string()])),
            }
        }
        kinds
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
