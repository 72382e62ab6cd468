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
pub enum TransactionType {
    /// 充值入账
    #[sea_orm(string_value = "deposit")]
    Deposit,
    /// 提现出账
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    /// 任务押金扣款
    #[sea_orm(string_value = "task_deposit")]
    TaskDeposit,
    /// 任务完成返还 (本金+佣金) 或转盘现金奖
    #[sea_orm(string_value = "reward")]
    Reward,
    /// 管理员手工调账
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    /// 冲正 (取消已扣款的任务)
    #[sea_orm(string_value = "reversal")]
    Reversal,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "deposit"),
            TransactionType::Withdrawal => write!(f, "withdrawal"),
            TransactionType::TaskDeposit => write!(f, "task_deposit"),
            TransactionType::Reward => write!(f, "reward"),
            TransactionType::Adjustment => write!(f, "adjustment"),
            TransactionType::Reversal => write!(f, "reversal"),
        }
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "posted")]
    Posted,
    #[sea_orm(string_value = "reversed")]
    Reversed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Posted => write!(f, "posted"),
            TransactionStatus::Reversed => write!(f, "reversed"),
        }
    }
}

/// 账本流水实体 (append-only)
/// 不变量: balance_after = balance_before + amount_cents;
/// 已入账的行不可修改, 冲正通过新的反向流水表达。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub txn_type: TransactionType,
    /// 带符号金额(美分), 正为入账负为出账
    pub amount_cents: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub status: TransactionStatus,
    /// 全局唯一幂等键, 由稳定标识派生 (例如 task_complete:{run_id})
    pub idempotency_key: String,
    /// 关联来源 (任务运行ID / 申请单ID 等)
    pub reference_id: Option<i64>,
    pub created_by: Option<i64>,
    pub description: Option<String>,
    /// 自由格式审计上下文
    pub metadata: Option<Json>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
