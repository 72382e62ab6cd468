use crate::entities::{
    task_entity as tasks, task_run_entity as task_runs, user_entity as users, TaskRunState,
    TransactionType,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    ApprovalSettings, SubmitTaskResponse, TaskResponse, TaskRunQuery, TaskRunResponse,
};
use crate::services::approval::should_auto_approve;
use crate::services::{CatalogService, LedgerService, VipService};
use crate::utils::{PaginatedResponse, PaginationParams};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

/// 佣金 = 价格 × 费率(bp) / 10000, 向下取整
pub fn compute_reward(price_cents: i64, rate_bp: i32) -> i64 {
    price_cents * rate_bp as i64 / 10_000
}

/// 任务执行状态机: assigned -> submitted -> completed, 非终态均可 cancelled。
/// 所有触账转换与状态写入在同一事务内, 并用
/// `UPDATE ... WHERE state = ...` 式守卫关闭并发竞争。
#[derive(Clone)]
pub struct TaskRunService {
    pool: DatabaseConnection,
    ledger: LedgerService,
    vip: VipService,
    catalog: CatalogService,
}

impl TaskRunService {
    pub fn new(
        pool: DatabaseConnection,
        ledger: LedgerService,
        vip: VipService,
        catalog: CatalogService,
    ) -> Self {
        Self {
            pool,
            ledger,
            vip,
            catalog,
        }
    }

    /// 接取任务: 校验等级门槛, 匹配商品, 快照价格与当前等级佣金率,
    /// 直接以 assigned 状态落库 (分配与开始合并)。
    pub async fn start(
        &self,
        user_id: i64,
        task_id: i64,
        product_id: Option<i64>,
        client_idempotency_key: Option<String>,
    ) -> AppResult<task_runs::Model> {
        let txn = self.pool.begin().await?;

        // 客户端带幂等键重试: 返回已创建的运行。
        // 重放只对键的归属者生效, 他人的键直接拒绝, 不泄露其运行。
        let idempotency_key = match client_idempotency_key {
            Some(key) => {
                if let Some(existing) = task_runs::Entity::find()
                    .filter(task_runs::Column::IdempotencyKey.eq(key.clone()))
                    .one(&txn)
                    .await?
                {
                    if existing.user_id != user_id {
                        return Err(AppError::ValidationError(
                            "Idempotency key already used".to_string(),
                        ));
                    }
                    txn.commit().await?;
                    return Ok(existing);
                }
                key
            }
            None => format!("task_start:{}", Uuid::new_v4()),
        };

        let task = tasks::Entity::find_by_id(task_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;
        if !task.is_active {
            return Err(AppError::ValidationError("Task is not active".to_string()));
        }

        let user = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        // 等级与佣金率以事务内读到的余额为准
        let tier = self
            .vip
            .resolve_tier_in(&txn, user.balance_cents)
            .await?
            .ok_or_else(|| {
                AppError::InsufficientTier("No VIP tier for current balance".to_string())
            })?;

        if tier.min_balance_cents < task.required_min_balance_cents {
            return Err(AppError::InsufficientTier(format!(
                "Task requires tier threshold {} cents, current tier {} starts at {}",
                task.required_min_balance_cents, tier.name, tier.min_balance_cents
            )));
        }

        if tier.max_orders > 0 && user.completed_orders >= tier.max_orders as i64 {
            return Err(AppError::ValidationError(
                "Order limit reached for current VIP tier".to_string(),
            ));
        }

        let product = self
            .catalog
            .find_eligible_product_in(&txn, &tier, product_id)
            .await?;

        // 经济参数在此刻冻结, 之后商品调价/等级变化不回溯
        let assigned_price = product.base_price_cents;
        let reward = compute_reward(assigned_price, tier.commission_rate_bp);

        let run = task_runs::ActiveModel {
            user_id: Set(user_id),
            task_id: Set(task_id),
            task_product_id: Set(product.id),
            state: Set(TaskRunState::Assigned),
            assigned_price_cents: Set(assigned_price),
            commission_rate_bp: Set(tier.commission_rate_bp),
            reward_amount_cents: Set(reward),
            total_refund_cents: Set(assigned_price + reward),
            idempotency_key: Set(idempotency_key),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        log::info!(
            "Task run {} assigned: user {} product {} price {} reward {}",
            run.id,
            user_id,
            product.id,
            assigned_price,
            reward
        );
        Ok(run)
    }

    /// 提交任务: 扣除押金 (assigned_price) 并转入 submitted。
    /// 审批设置按请求加载传入; 命中自动审批策略时直接走 complete。
    pub async fn submit(
        &self,
        run_id: i64,
        user_id: i64,
        settings: &ApprovalSettings,
    ) -> AppResult<SubmitTaskResponse> {
        let txn = self.pool.begin().await?;

        let run = task_runs::Entity::find_by_id(run_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Task run not found".to_string()))?;

        if run.user_id != user_id {
            return Err(AppError::NotOwner);
        }
        if run.state != TaskRunState::Assigned {
            return Err(AppError::StateConflict(format!(
                "Cannot submit a task run in state {}",
                run.state
            )));
        }

        // 押金扣款与状态转换同一事务
        self.ledger
            .apply_in(
                &txn,
                crate::services::LedgerEntry::new(
                    user_id,
                    TransactionType::TaskDeposit,
                    -run.assigned_price_cents,
                    format!("task_submit:{run_id}"),
                )
                .reference(run_id)
                .description("Task deposit"),
            )
            .await?;

        let update_result = task_runs::Entity::update_many()
            .col_expr(task_runs::Column::State, Expr::value(TaskRunState::Submitted))
            .col_expr(task_runs::Column::SubmittedAt, Expr::value(Some(Utc::now())))
            .col_expr(task_runs::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(task_runs::Column::Id.eq(run_id))
            .filter(task_runs::Column::State.eq(TaskRunState::Assigned))
            .exec(&txn)
            .await?;

        if update_result.rows_affected != 1 {
            // 并发提交/取消抢先, 回滚押金扣款
            return Err(AppError::StateConflict(
                "Task run was modified concurrently".to_string(),
            ));
        }

        txn.commit().await?;

        let submitted = self.get_run(run_id).await?;

        // 自动审批策略命中则立即完成 (approved_by 为空表示系统审批)
        if should_auto_approve(&submitted, settings) {
            let completed = self.complete(run_id, None).await?;
            return Ok(SubmitTaskResponse {
                run: completed.into(),
                auto_approved: true,
            });
        }

        Ok(SubmitTaskResponse {
            run: submitted.into(),
            auto_approved: false,
        })
    }

    /// 完成任务: 从 assigned 或 submitted 进入 completed (容忍先于提交的自动审批)。
    /// 返还 total_refund, completed_orders/free_spins 各 +1,
    /// 全部写入在同一事务, 状态守卫保证并发双审批只有一方成功。
    pub async fn complete(
        &self,
        run_id: i64,
        approver_id: Option<i64>,
    ) -> AppResult<task_runs::Model> {
        let txn = self.pool.begin().await?;

        let run = task_runs::Entity::find_by_id(run_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Task run not found".to_string()))?;

        match run.state {
            TaskRunState::Completed => {
                return Err(AppError::StateConflict(
                    "Task run already completed".to_string(),
                ));
            }
            TaskRunState::Cancelled => {
                return Err(AppError::StateConflict(
                    "Task run already cancelled".to_string(),
                ));
            }
            TaskRunState::Assigned | TaskRunState::Submitted => {}
        }

        // 状态守卫在事务内重查: 两个管理员并发审批, 后到者在此失败
        let update_result = task_runs::Entity::update_many()
            .col_expr(task_runs::Column::State, Expr::value(TaskRunState::Completed))
            .col_expr(task_runs::Column::CompletedAt, Expr::value(Some(Utc::now())))
            .col_expr(task_runs::Column::ApprovedBy, Expr::value(approver_id))
            .col_expr(task_runs::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(task_runs::Column::Id.eq(run_id))
            .filter(task_runs::Column::State.is_in([
                TaskRunState::Assigned,
                TaskRunState::Submitted,
            ]))
            .exec(&txn)
            .await?;

        if update_result.rows_affected != 1 {
            return Err(AppError::StateConflict(
                "Task run already completed".to_string(),
            ));
        }

        // 返还本金+佣金, 幂等键由 run_id 派生, 重试不会双付。
        // 管理员审批时流水同时记录审批人。
        let mut entry = crate::services::LedgerEntry::new(
            run.user_id,
            TransactionType::Reward,
            run.total_refund_cents,
            format!("task_complete:{run_id}"),
        )
        .reference(run_id)
        .description("Task refund and commission");
        if let Some(approver) = approver_id {
            entry = entry.created_by(approver);
        }
        self.ledger.apply_in(&txn, entry).await?;

        // 完成计数 + 发放一次转盘机会
        users::Entity::update_many()
            .col_expr(
                users::Column::CompletedOrders,
                Expr::col(users::Column::CompletedOrders).add(1),
            )
            .col_expr(
                users::Column::FreeSpins,
                Expr::col(users::Column::FreeSpins).add(1),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(users::Column::Id.eq(run.user_id))
            .exec(&txn)
            .await?;

        let completed = task_runs::Entity::find_by_id(run_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::InternalError("Task run vanished mid-update".to_string()))?;

        txn.commit().await?;

        log::info!(
            "Task run {} completed, refunded {} cents to user {}",
            run_id,
            run.total_refund_cents,
            run.user_id
        );
        Ok(completed)
    }

    /// 取消任务: 任何非终态可取消。
    /// 若已提交 (押金已扣), 先以冲正流水退回押金, 再标记 cancelled。
    pub async fn cancel(
        &self,
        run_id: i64,
        reason: Option<String>,
        actor_id: Option<i64>,
    ) -> AppResult<task_runs::Model> {
        let txn = self.pool.begin().await?;

        let run = task_runs::Entity::find_by_id(run_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Task run not found".to_string()))?;

        if run.state.is_terminal() {
            return Err(AppError::StateConflict(format!(
                "Cannot cancel a task run in state {}",
                run.state
            )));
        }

        if run.state == TaskRunState::Submitted {
            self.ledger
                .apply_in(
                    &txn,
                    crate::services::LedgerEntry::new(
                        run.user_id,
                        TransactionType::Reversal,
                        run.assigned_price_cents,
                        format!("task_cancel:{run_id}"),
                    )
                    .reference(run_id)
                    .description("Deposit reversal on cancellation"),
                )
                .await?;
        }

        let update_result = task_runs::Entity::update_many()
            .col_expr(task_runs::Column::State, Expr::value(TaskRunState::Cancelled))
            .col_expr(task_runs::Column::CancelReason, Expr::value(reason))
            .col_expr(task_runs::Column::CancelledBy, Expr::value(actor_id))
            .col_expr(task_runs::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(task_runs::Column::Id.eq(run_id))
            .filter(task_runs::Column::State.is_in([
                TaskRunState::Assigned,
                TaskRunState::Submitted,
            ]))
            .exec(&txn)
            .await?;

        if update_result.rows_affected != 1 {
            return Err(AppError::StateConflict(
                "Task run was modified concurrently".to_string(),
            ));
        }

        let cancelled = task_runs::Entity::find_by_id(run_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::InternalError("Task run vanished mid-update".to_string()))?;

        txn.commit().await?;
        Ok(cancelled)
    }

    /// 当前可接取的任务
    pub async fn list_tasks(&self) -> AppResult<Vec<TaskResponse>> {
        let list = tasks::Entity::find()
            .filter(tasks::Column::IsActive.eq(true))
            .order_by(tasks::Column::Id, Order::Asc)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn get_run(&self, run_id: i64) -> AppResult<task_runs::Model> {
        task_runs::Entity::find_by_id(run_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Task run not found".to_string()))
    }

    /// 用户自己的运行记录 (分页, 倒序)
    pub async fn list_runs(
        &self,
        user_id: i64,
        query: &TaskRunQuery,
    ) -> AppResult<PaginatedResponse<TaskRunResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = task_runs::Entity::find().filter(task_runs::Column::UserId.eq(user_id));
        if let Some(state) = &query.state {
            base_query = base_query.filter(task_runs::Column::State.eq(state.clone()));
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(task_runs::Column::Id, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<TaskRunResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// 待审批队列 (submitted 状态, 管理端)
    pub async fn list_pending(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<TaskRunResponse>> {
        let base_query = task_runs::Entity::find()
            .filter(task_runs::Column::State.eq(TaskRunState::Submitted));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(task_runs::Column::Id, Order::Asc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<TaskRunResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(items, params, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_reward_floors() {
        // $100 × 0.5% = $0.50
        assert_eq!(compute_reward(10_000, 50), 50);
        // $150 × 0.6% = $0.90
        assert_eq!(compute_reward(15_000, 60), 90);
        // 向下取整: 99 cents × 0.5% = 0
        assert_eq!(compute_reward(99, 50), 0);
    }
}
