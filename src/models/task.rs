use crate::entities::{task_entity as tasks, task_run_entity as task_runs, TaskRunState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    /// 接取门槛: 要求用户当前等级的 min_balance 不低于该值
    pub required_min_balance_cents: i64,
}

impl From<tasks::Model> for TaskResponse {
    fn from(t: tasks::Model) -> Self {
        Self {
            id: t.id,
            title: t.title,
            required_min_balance_cents: t.required_min_balance_cents,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartTaskRequest {
    /// 指定商品ID (可选, 不填则在商店组内随机匹配)
    pub product_id: Option<i64>,
    /// 客户端提供的幂等键 (可选), 重试同一次创建请求时必须携带相同的键
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskRunResponse {
    pub id: i64,
    pub task_id: i64,
    pub task_product_id: i64,
    pub state: TaskRunState,
    pub assigned_price_cents: i64,
    pub commission_rate_bp: i32,
    pub reward_amount_cents: i64,
    pub total_refund_cents: i64,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<task_runs::Model> for TaskRunResponse {
    fn from(r: task_runs::Model) -> Self {
        Self {
            id: r.id,
            task_id: r.task_id,
            task_product_id: r.task_product_id,
            state: r.state,
            assigned_price_cents: r.assigned_price_cents,
            commission_rate_bp: r.commission_rate_bp,
            reward_amount_cents: r.reward_amount_cents,
            total_refund_cents: r.total_refund_cents,
            submitted_at: r.submitted_at,
            completed_at: r.completed_at,
            created_at: r.created_at,
        }
    }
}

/// submit 的结果: 提交后的运行状态, 以及是否被自动审批直接完成
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitTaskResponse {
    pub run: TaskRunResponse,
    pub auto_approved: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskRunQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub state: Option<TaskRunState>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelTaskRequest {
    #[schema(example = "requested by user")]
    pub reason: Option<String>,
}
