use crate::entities::{
    transaction_entity as transactions, user_entity as users, TransactionStatus, TransactionType,
};
use crate::error::{AppError, AppResult};
use crate::models::{AdjustBalanceRequest, TransactionQuery, TransactionResponse};
use crate::utils::{PaginatedResponse, PaginationParams};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 一次账本操作的全部输入
/// idempotency_key 必须由稳定标识派生 (operation + 来源ID),
/// 绝不能追加随机后缀, 否则重试去重失效
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub user_id: i64,
    pub txn_type: TransactionType,
    /// 带符号金额(美分), 正为入账负为出账
    pub amount_cents: i64,
    pub idempotency_key: String,
    pub reference_id: Option<i64>,
    pub created_by: Option<i64>,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
    /// 仅管理员调账允许显式扣成负数
    pub allow_negative: bool,
}

impl LedgerEntry {
    pub fn new(user_id: i64, txn_type: TransactionType, amount_cents: i64, key: String) -> Self {
        Self {
            user_id,
            txn_type,
            amount_cents,
            idempotency_key: key,
            reference_id: None,
            created_by: None,
            description: None,
            metadata: None,
            allow_negative: false,
        }
    }

    pub fn reference(mut self, id: i64) -> Self {
        self.reference_id = Some(id);
        self
    }

    pub fn created_by(mut self, actor: i64) -> Self {
        self.created_by = Some(actor);
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

/// 账本服务: 用户余额的唯一写入方。
/// 所有资金变动 (充值/提现/任务押金/返还/调账/冲正) 都经由 apply 落账,
/// 余额写入与流水追加在同一事务内完成。
#[derive(Clone)]
pub struct LedgerService {
    pool: DatabaseConnection,
}

impl LedgerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 独立落账 (自开事务)。外部协作方 (充值/提现审批) 的入口。
    pub async fn apply(&self, entry: LedgerEntry) -> AppResult<transactions::Model> {
        let txn = self.pool.begin().await?;
        let model = self.apply_in(&txn, entry).await?;
        txn.commit().await?;
        Ok(model)
    }

    /// 在调用方事务内落账, 供任务状态机 / 转盘在同一原子单元内组合余额变动。
    ///
    /// 步骤 (全部在 conn 所属事务内):
    /// 1. 幂等键查重, 命中则原样返回已有流水 (重放不是错误)
    /// 2. 读取用户当前余额
    /// 3. 负余额守卫 (除非显式 allow_negative)
    /// 4. 乐观 CAS 写回新余额 (where balance = 旧值)
    /// 5. 追加流水行, balance_before/after 链保持单调一致
    pub async fn apply_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        entry: LedgerEntry,
    ) -> AppResult<transactions::Model> {
        if entry.idempotency_key.is_empty() {
            return Err(AppError::ValidationError(
                "idempotency_key must not be empty".to_string(),
            ));
        }

        // 幂等重放: 返回已入账的结果
        if let Some(existing) = transactions::Entity::find()
            .filter(transactions::Column::IdempotencyKey.eq(entry.idempotency_key.clone()))
            .one(conn)
            .await?
        {
            log::info!(
                "Ledger replay for key {} (txn {})",
                entry.idempotency_key,
                existing.id
            );
            return Ok(existing);
        }

        let user = users::Entity::find_by_id(entry.user_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let balance_before = user.balance_cents;
        let balance_after = balance_before + entry.amount_cents;

        if balance_after < 0 && !entry.allow_negative {
            return Err(AppError::InsufficientFunds {
                balance_cents: balance_before,
                required_cents: -entry.amount_cents,
            });
        }

        // 乐观锁: 余额在读取后被并发修改则整个事务失败, 调用方重试时幂等键兜底
        let update_result = users::Entity::update_many()
            .col_expr(users::Column::BalanceCents, Expr::value(balance_after))
            .col_expr(users::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(users::Column::Id.eq(entry.user_id))
            .filter(users::Column::BalanceCents.eq(balance_before))
            .exec(conn)
            .await?;

        if update_result.rows_affected != 1 {
            return Err(AppError::StateConflict(
                "Balance changed concurrently, retry the operation".to_string(),
            ));
        }

        let model = transactions::ActiveModel {
            user_id: Set(entry.user_id),
            txn_type: Set(entry.txn_type),
            amount_cents: Set(entry.amount_cents),
            balance_before: Set(balance_before),
            balance_after: Set(balance_after),
            status: Set(TransactionStatus::Posted),
            idempotency_key: Set(entry.idempotency_key),
            reference_id: Set(entry.reference_id),
            created_by: Set(entry.created_by),
            description: Set(entry.description),
            metadata: Set(entry.metadata),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        Ok(model)
    }

    /// 管理员手工调账 (唯一允许 allow_negative 的路径)
    pub async fn admin_adjust(
        &self,
        user_id: i64,
        request: AdjustBalanceRequest,
        admin_id: i64,
    ) -> AppResult<transactions::Model> {
        if request.amount_cents == 0 {
            return Err(AppError::ValidationError(
                "Adjustment amount must not be zero".to_string(),
            ));
        }

        let mut entry = LedgerEntry::new(
            user_id,
            TransactionType::Adjustment,
            request.amount_cents,
            request.idempotency_key,
        )
        .created_by(admin_id);
        entry.description = request.description;
        entry.allow_negative = request.allow_negative;

        self.apply(entry).await
    }

    /// 用户流水 (分页, 倒序)
    pub async fn list_transactions(
        &self,
        user_id: i64,
        query: &TransactionQuery,
    ) -> AppResult<PaginatedResponse<TransactionResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query =
            transactions::Entity::find().filter(transactions::Column::UserId.eq(user_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(transactions::Column::Id, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<TransactionResponse> =
            items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }
}
