use crate::entities::{
    fund_request_entity as fund_requests, user_entity as users, FundDirection, FundRequestStatus,
    TransactionType,
};
use crate::error::{AppError, AppResult};
use crate::models::{FundRecordQuery, FundRequestResponse};
use crate::services::{LedgerEntry, LedgerService};
use crate::utils::{PaginatedResponse, PaginationParams};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 充值/提现审批队列。申请本身不动账;
/// 审批通过时作为账本的对等消费方调用 LedgerService 入账/出账。
#[derive(Clone)]
pub struct FinanceService {
    pool: DatabaseConnection,
    ledger: LedgerService,
}

impl FinanceService {
    pub fn new(pool: DatabaseConnection, ledger: LedgerService) -> Self {
        Self { pool, ledger }
    }

    /// 创建申请 (pending)。提现做余额预检, 真正的扣款守卫在审批落账时。
    pub async fn create_request(
        &self,
        user_id: i64,
        direction: FundDirection,
        amount_cents: i64,
    ) -> AppResult<fund_requests::Model> {
        if amount_cents <= 0 {
            return Err(AppError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }

        if direction == FundDirection::Withdrawal {
            let user = users::Entity::find_by_id(user_id)
                .one(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            if user.balance_cents < amount_cents {
                return Err(AppError::InsufficientFunds {
                    balance_cents: user.balance_cents,
                    required_cents: amount_cents,
                });
            }
        }

        let request = fund_requests::ActiveModel {
            user_id: Set(user_id),
            direction: Set(direction),
            amount_cents: Set(amount_cents),
            status: Set(FundRequestStatus::Pending),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(request)
    }

    /// 审批通过: 状态守卫 + 账本落账在同一事务。
    /// 幂等键 fund_approve:{id} 保证审批重试不重复入账。
    pub async fn approve(
        &self,
        request_id: i64,
        admin_id: i64,
        note: Option<String>,
    ) -> AppResult<fund_requests::Model> {
        let txn = self.pool.begin().await?;

        let request = fund_requests::Entity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Fund request not found".to_string()))?;

        if request.status != FundRequestStatus::Pending {
            return Err(AppError::StateConflict(format!(
                "Fund request already {}",
                request.status
            )));
        }

        let update_result = fund_requests::Entity::update_many()
            .col_expr(
                fund_requests::Column::Status,
                Expr::value(FundRequestStatus::Approved),
            )
            .col_expr(fund_requests::Column::ReviewedBy, Expr::value(Some(admin_id)))
            .col_expr(fund_requests::Column::ReviewNote, Expr::value(note))
            .col_expr(fund_requests::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(fund_requests::Column::Id.eq(request_id))
            .filter(fund_requests::Column::Status.eq(FundRequestStatus::Pending))
            .exec(&txn)
            .await?;

        if update_result.rows_affected != 1 {
            return Err(AppError::StateConflict(
                "Fund request was reviewed concurrently".to_string(),
            ));
        }

        let (txn_type, signed_amount) = match request.direction {
            FundDirection::Deposit => (TransactionType::Deposit, request.amount_cents),
            FundDirection::Withdrawal => (TransactionType::Withdrawal, -request.amount_cents),
        };

        // 提现余额不足时 InsufficientFunds 上抛, 状态更新一并回滚
        self.ledger
            .apply_in(
                &txn,
                LedgerEntry::new(
                    request.user_id,
                    txn_type,
                    signed_amount,
                    format!("fund_approve:{request_id}"),
                )
                .reference(request_id)
                .created_by(admin_id)
                .description(format!("{} request approved", request.direction)),
            )
            .await?;

        let approved = fund_requests::Entity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::InternalError("Fund request vanished".to_string()))?;

        txn.commit().await?;
        Ok(approved)
    }

    /// 驳回: 仅状态流转, 不触账
    pub async fn reject(
        &self,
        request_id: i64,
        admin_id: i64,
        note: Option<String>,
    ) -> AppResult<fund_requests::Model> {
        let txn = self.pool.begin().await?;

        let request = fund_requests::Entity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Fund request not found".to_string()))?;

        if request.status != FundRequestStatus::Pending {
            return Err(AppError::StateConflict(format!(
                "Fund request already {}",
                request.status
            )));
        }

        let update_result = fund_requests::Entity::update_many()
            .col_expr(
                fund_requests::Column::Status,
                Expr::value(FundRequestStatus::Rejected),
            )
            .col_expr(fund_requests::Column::ReviewedBy, Expr::value(Some(admin_id)))
            .col_expr(fund_requests::Column::ReviewNote, Expr::value(note))
            .col_expr(fund_requests::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(fund_requests::Column::Id.eq(request_id))
            .filter(fund_requests::Column::Status.eq(FundRequestStatus::Pending))
            .exec(&txn)
            .await?;

        if update_result.rows_affected != 1 {
            return Err(AppError::StateConflict(
                "Fund request was reviewed concurrently".to_string(),
            ));
        }

        let rejected = fund_requests::Entity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::InternalError("Fund request vanished".to_string()))?;

        txn.commit().await?;
        Ok(rejected)
    }

    /// 用户自己的申请记录 (分页, 倒序)
    pub async fn list_requests(
        &self,
        user_id: i64,
        query: &FundRecordQuery,
    ) -> AppResult<PaginatedResponse<FundRequestResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query =
            fund_requests::Entity::find().filter(fund_requests::Column::UserId.eq(user_id));
        if let Some(status) = &query.status {
            base_query = base_query.filter(fund_requests::Column::Status.eq(status.clone()));
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(fund_requests::Column::Id, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<FundRequestResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// 待审批申请 (管理端)
    pub async fn list_pending(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<FundRequestResponse>> {
        let base_query = fund_requests::Entity::find()
            .filter(fund_requests::Column::Status.eq(FundRequestStatus::Pending));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(fund_requests::Column::Id, Order::Asc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<FundRequestResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(items, params, total))
    }
}
