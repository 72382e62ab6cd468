use crate::entities::{user_entity as users, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
    /// 余额(美分)
    pub balance_cents: i64,
    pub completed_orders: i64,
    pub free_spins: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<users::Model> for UserResponse {
    fn from(u: users::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            role: u.role,
            balance_cents: u.balance_cents,
            completed_orders: u.completed_orders,
            free_spins: u.free_spins,
            created_at: u.created_at,
        }
    }
}

/// 个人资料: 用户信息 + 当前等级快照
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
    /// 当前 VIP 等级名称, 未达到任何等级时为 None
    pub vip_level: Option<VipLevelBrief>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VipLevelBrief {
    pub id: i64,
    pub name: String,
    pub min_balance_cents: i64,
    pub commission_rate_bp: i32,
}

impl From<crate::entities::vip_level_entity::Model> for VipLevelBrief {
    fn from(l: crate::entities::vip_level_entity::Model) -> Self {
        Self {
            id: l.id,
            name: l.name,
            min_balance_cents: l.min_balance_cents,
            commission_rate_bp: l.commission_rate_bp,
        }
    }
}
