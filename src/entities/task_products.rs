use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 任务商品实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "task_products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub shop_group_id: i64,
    pub name: String,
    pub base_price_cents: i64,
    pub stock: i32,
    /// 额外的等级限制 (NULL 表示组内通用)
    pub vip_level_id: Option<i64>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 是否可被匹配 (启用且有库存)
    pub fn is_available(&self) -> bool {
        self.is_active && self.stock > 0
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
