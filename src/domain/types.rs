// ==========================================
// 商城数据导入系统 - 公共类型定义
// ==========================================
// 职责: 定义跨层共享的枚举与基础类型
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// RowIdentifier - 行标识
// ==========================================
// 说明: 优先使用自然键（商品编码/客户邮箱），
//       无法取得自然键时退化为数据行序号（从 1 开始）
pub type RowIdentifier = String;

// ==========================================
// DuplicatePolicy - 重复数据处理策略
// ==========================================

/// 重复数据处理策略
///
/// 队列路径按"至少一次"投递，同一行可能被重复投递；
/// Skip 策略保证重复处理落入 skipped 桶而非重复落库
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// 已存在则跳过（默认）
    Skip,
    /// 已存在则用导入数据覆盖
    Overwrite,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &str {
        match self {
            DuplicatePolicy::Skip => "SKIP",
            DuplicatePolicy::Overwrite => "OVERWRITE",
        }
    }

    /// 从配置值解析，无法识别时回退为 Skip
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "OVERWRITE" => DuplicatePolicy::Overwrite,
            _ => DuplicatePolicy::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_policy_roundtrip() {
        assert_eq!(
            DuplicatePolicy::from_str("overwrite"),
            DuplicatePolicy::Overwrite
        );
        assert_eq!(DuplicatePolicy::from_str("SKIP"), DuplicatePolicy::Skip);
        // 未知值回退为 Skip
        assert_eq!(DuplicatePolicy::from_str("merge"), DuplicatePolicy::Skip);
    }
}
