use crate::entities::vip_level_entity as vip_levels;
use crate::error::AppResult;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
};

/// VIP 等级解析: 等级是余额的纯函数, 不缓存, 每次按当前余额解析
#[derive(Clone)]
pub struct VipService {
    pool: DatabaseConnection,
}

/// 在已按 (min_balance DESC, sort_order ASC) 排序的启用等级中
/// 选取第一个门槛不超过余额的等级。
/// min_balance 相同时 sort_order 小者优先, 保证决胜结果确定。
pub fn pick_level(sorted_levels: &[vip_levels::Model], balance_cents: i64) -> Option<&vip_levels::Model> {
    sorted_levels
        .iter()
        .find(|l| l.min_balance_cents <= balance_cents)
}

impl VipService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 按当前余额解析等级 (独立读)
    pub async fn resolve_tier(&self, balance_cents: i64) -> AppResult<Option<vip_levels::Model>> {
        self.resolve_tier_in(&self.pool, balance_cents).await
    }

    /// 在调用方事务内解析等级, 保证与余额读取一致
    pub async fn resolve_tier_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        balance_cents: i64,
    ) -> AppResult<Option<vip_levels::Model>> {
        let levels = self.active_levels_in(conn).await?;
        Ok(pick_level(&levels, balance_cents).cloned())
    }

    /// 启用等级, 按 (min_balance DESC, sort_order ASC) 排序
    pub async fn active_levels_in<C: ConnectionTrait>(
        &self,
        conn: &C,
    ) -> AppResult<Vec<vip_levels::Model>> {
        let levels = vip_levels::Entity::find()
            .filter(vip_levels::Column::IsActive.eq(true))
            .order_by(vip_levels::Column::MinBalanceCents, Order::Desc)
            .order_by(vip_levels::Column::SortOrder, Order::Asc)
            .all(conn)
            .await?;
        Ok(levels)
    }

    /// 全部等级列表 (管理端展示)
    pub async fn list_levels(&self) -> AppResult<Vec<vip_levels::Model>> {
        let levels = vip_levels::Entity::find()
            .order_by(vip_levels::Column::SortOrder, Order::Asc)
            .all(&self.pool)
            .await?;
        Ok(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(id: i64, min_balance: i64, sort_order: i32) -> vip_levels::Model {
        vip_levels::Model {
            id,
            name: format!("L{id}"),
            min_balance_cents: min_balance,
            commission_rate_bp: 50,
            max_orders: 0,
            auto_approve_limit_cents: None,
            is_active: true,
            sort_order,
            created_at: None,
            updated_at: None,
        }
    }

    fn sorted(mut levels: Vec<vip_levels::Model>) -> Vec<vip_levels::Model> {
        levels.sort_by(|a, b| {
            b.min_balance_cents
                .cmp(&a.min_balance_cents)
                .then(a.sort_order.cmp(&b.sort_order))
        });
        levels
    }

    #[test]
    fn test_highest_qualifying_level_wins() {
        let levels = sorted(vec![level(1, 0, 1), level(2, 10_000, 2), level(3, 50_000, 3)]);
        assert_eq!(pick_level(&levels, 15_000).unwrap().id, 2);
        assert_eq!(pick_level(&levels, 50_000).unwrap().id, 3);
        assert_eq!(pick_level(&levels, 0).unwrap().id, 1);
    }

    #[test]
    fn test_no_level_below_lowest_threshold() {
        let levels = sorted(vec![level(1, 100, 1)]);
        assert!(pick_level(&levels, 99).is_none());
    }

    #[test]
    fn test_equal_threshold_tiebreak_by_sort_order() {
        // min_balance 相同, sort_order 小者稳定胜出
        let levels = sorted(vec![level(2, 10_000, 5), level(7, 10_000, 1)]);
        assert_eq!(pick_level(&levels, 20_000).unwrap().id, 7);
    }

    #[test]
    fn test_determinism() {
        let levels = sorted(vec![level(1, 0, 1), level(2, 10_000, 2)]);
        for _ in 0..10 {
            assert_eq!(pick_level(&levels, 10_000).unwrap().id, 2);
        }
    }
}
