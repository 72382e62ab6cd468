use crate::entities::vip_level_entity as vip_levels;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VipLevelResponse {
    pub id: i64,
    pub name: String,
    pub min_balance_cents: i64,
    pub commission_rate_bp: i32,
    /// 该等级每日可接任务上限, 0 表示不限
    pub max_orders: i32,
    pub sort_order: i32,
}

impl From<vip_levels::Model> for VipLevelResponse {
    fn from(l: vip_levels::Model) -> Self {
        Self {
            id: l.id,
            name: l.name,
            min_balance_cents: l.min_balance_cents,
            commission_rate_bp: l.commission_rate_bp,
            max_orders: l.max_orders,
            sort_order: l.sort_order,
        }
    }
}
