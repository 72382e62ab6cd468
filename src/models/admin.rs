use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 管理员手工调账请求
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdjustBalanceRequest {
    /// 带符号金额(美分), 负数为扣减
    #[schema(example = -500)]
    pub amount_cents: i64,
    /// 幂等键, 由管理端生成并在重试时复用
    pub idempotency_key: String,
    pub description: Option<String>,
    /// 显式允许扣成负余额 (默认 false)
    #[serde(default)]
    pub allow_negative: bool,
}

/// 审批策略设置 (值对象, 每次请求从库中加载)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApprovalSettings {
    /// 为 true 时所有任务完成免人工审批
    pub auto_approve_all: bool,
    /// 单价不超过该值(美分)的任务自动审批; None 表示不启用
    pub auto_approve_threshold_cents: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub auto_approve_all: Option<bool>,
    /// Some(None) 无法经 JSON 表达, 因此用显式开关清除阈值
    pub auto_approve_threshold_cents: Option<i64>,
    #[serde(default)]
    pub clear_threshold: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PendingRunQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
