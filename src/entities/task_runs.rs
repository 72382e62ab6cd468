use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum TaskRunState {
    /// 已分配商品 (创建即进入此状态)
    #[sea_orm(string_value = "assigned")]
    Assigned,
    /// 用户已提交, 押金已扣
    #[sea_orm(string_value = "submitted")]
    Submitted,
    /// 审批通过, 本金+佣金已返还 (终态)
    #[sea_orm(string_value = "completed")]
    Completed,
    /// 已取消 (终态)
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl TaskRunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskRunState::Completed | TaskRunState::Cancelled)
    }
}

impl std::fmt::Display for TaskRunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskRunState::Assigned => write!(f, "assigned"),
            TaskRunState::Submitted => write!(f, "submitted"),
            TaskRunState::Completed => write!(f, "completed"),
            TaskRunState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 任务执行记录实体
/// assigned_price / commission_rate 在分配时快照, 此后不随商品价格或用户等级变化
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "task_runs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub task_id: i64,
    pub task_product_id: i64,
    pub state: TaskRunState,
    pub assigned_price_cents: i64,
    pub commission_rate_bp: i32,
    /// assigned_price * rate / 10000 (向下取整)
    pub reward_amount_cents: i64,
    /// assigned_price + reward
    pub total_refund_cents: i64,
    pub idempotency_key: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// 审批人 (仅完成时写入; 自动审批为空)
    pub approved_by: Option<i64>,
    /// 取消操作人 (管理端取消时写入; 用户自取消为空)
    pub cancelled_by: Option<i64>,
    pub cancel_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
