// ==========================================
// 商城数据导入系统 - 客户实体
// ==========================================
// 职责: 客户主数据定义（导入目标表 customer）
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 客户主数据
///
/// 自然键: email（客户邮箱），导入时据此判重
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// 客户邮箱（主键）
    pub email: String,
    /// 名
    pub first_name: Option<String>,
    /// 姓
    pub last_name: Option<String>,
    /// 电话
    pub phone: Option<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// 构造一个当前时刻创建的客户
    pub fn new(email: String) -> Self {
        let now = Utc::now();
        Self {
            email,
            first_name: None,
            last_name: None,
            phone: None,
            created_at: now,
            updated_at: now,
        }
    }
}
