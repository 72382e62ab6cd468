use crate::entities::{
    user_entity as users, wheel_prize_entity as prizes, wheel_spin_entity as spins,
    TransactionType,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    WheelPrizeBrief, WheelPrizeResponse, WheelRecordQuery, WheelSpinRecordResponse,
    WheelSpinResponse,
};
use crate::services::{LedgerEntry, LedgerService};
use crate::utils::{PaginatedResponse, PaginationParams};
use chrono::Utc;
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 按权重在 [0, sum) 上抽取奖品。
/// 权重按总和归一化, 因此 probability_bp 不要求合计 10000。
pub fn pick_prize(prize_list: &[prizes::Model], roll: i64) -> Option<&prizes::Model> {
    let total: i64 = prize_list.iter().map(|p| p.probability_bp as i64).sum();
    if total <= 0 || roll < 0 || roll >= total {
        return None;
    }
    let mut acc = 0i64;
    for p in prize_list {
        acc += p.probability_bp as i64;
        if roll < acc {
            return Some(p);
        }
    }
    None
}

/// 转盘服务: 消耗任务完成发放的免费次数, 按权重抽奖,
/// 现金奖品在同一事务内经账本入账。
#[derive(Clone)]
pub struct WheelService {
    pool: DatabaseConnection,
    ledger: LedgerService,
}

impl WheelService {
    pub fn new(pool: DatabaseConnection, ledger: LedgerService) -> Self {
        Self { pool, ledger }
    }

    /// 抽奖:
    /// 1. 校验剩余免费次数
    /// 2. 读取启用奖品并按权重抽取
    /// 3. 原子扣减次数 (update where free_spins > 0)
    /// 4. 写抽奖记录; 现金奖品同事务入账
    pub async fn spin(&self, user_id: i64) -> AppResult<WheelSpinResponse> {
        let txn = self.pool.begin().await?;

        let user = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.free_spins <= 0 {
            return Err(AppError::NoFreeSpins);
        }

        let prize_list = prizes::Entity::find()
            .filter(prizes::Column::IsActive.eq(true))
            .order_by_asc(prizes::Column::Id)
            .all(&txn)
            .await?;

        if prize_list.is_empty() {
            return Err(AppError::InternalError(
                "No active wheel prizes configured".to_string(),
            ));
        }

        let selected = {
            let total: i64 = prize_list.iter().map(|p| p.probability_bp as i64).sum();
            if total <= 0 {
                return Err(AppError::InternalError(
                    "Wheel prize weights sum to zero".to_string(),
                ));
            }
            let roll = {
                let mut rng = rand::thread_rng();
                rng.gen_range(0..total)
            };
            pick_prize(&prize_list, roll)
                .ok_or_else(|| AppError::InternalError("Prize selection failed".to_string()))?
                .clone()
        };

        // 次数扣减与抽奖记录同一事务; 并发抽奖由守卫兜底
        let update_result = users::Entity::update_many()
            .col_expr(
                users::Column::FreeSpins,
                Expr::col(users::Column::FreeSpins).sub(1),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(users::Column::Id.eq(user_id))
            .filter(users::Column::FreeSpins.gt(0))
            .exec(&txn)
            .await?;

        if update_result.rows_affected != 1 {
            return Err(AppError::NoFreeSpins);
        }

        let spin = spins::ActiveModel {
            user_id: Set(user_id),
            prize_id: Set(selected.id),
            prize_name: Set(selected.name.clone()),
            value_cents: Set(selected.value_cents),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // 现金奖品入账, 幂等键由抽奖记录ID派生
        if selected.is_cash() {
            self.ledger
                .apply_in(
                    &txn,
                    LedgerEntry::new(
                        user_id,
                        TransactionType::Reward,
                        selected.value_cents,
                        format!("wheel_prize:{}", spin.id),
                    )
                    .reference(spin.id)
                    .description(format!("Wheel prize: {}", selected.name)),
                )
                .await?;
        }

        // 剩余次数以扣减后的行为准, 并发抽奖时事务前读到的值可能已过期
        let remaining = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::InternalError("User vanished mid-update".to_string()))?
            .free_spins;

        txn.commit().await?;

        log::info!(
            "User {} spun the wheel: prize {} ({} cents)",
            user_id,
            selected.name,
            selected.value_cents
        );

        Ok(WheelSpinResponse {
            spin_id: spin.id,
            prize: WheelPrizeBrief {
                id: selected.id,
                name: selected.name,
                value_cents: selected.value_cents,
            },
            free_spins_remaining: remaining,
        })
    }

    /// 启用奖品列表
    pub async fn list_prizes(&self) -> AppResult<Vec<WheelPrizeResponse>> {
        let list = prizes::Entity::find()
            .filter(prizes::Column::IsActive.eq(true))
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 用户抽奖记录 (分页, 倒序)
    pub async fn list_records(
        &self,
        user_id: i64,
        query: &WheelRecordQuery,
    ) -> AppResult<PaginatedResponse<WheelSpinRecordResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query = spins::Entity::find().filter(spins::Column::UserId.eq(user_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(spins::Column::Id, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<WheelSpinRecordResponse> =
            items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }
}
