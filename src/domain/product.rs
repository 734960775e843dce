// ==========================================
// 商城数据导入系统 - 商品实体
// ==========================================
// 职责: 商品主数据定义（导入目标表 product）
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 商品主数据
///
/// 自然键: code（商品编码），导入时据此判重
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 商品编码（主键）
    pub code: String,
    /// 商品名称
    pub name: String,
    /// 价格（最小货币单位，如"分"）
    pub price_cents: i64,
    /// 商品描述
    pub description: Option<String>,
    /// 是否上架
    pub enabled: bool,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// 构造一个当前时刻创建的商品
    pub fn new(code: String, name: String, price_cents: i64) -> Self {
        let now = Utc::now();
        Self {
            code,
            name,
            price_cents,
            description: None,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}
