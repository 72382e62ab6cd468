use crate::entities::{
    shop_group_entity as shop_groups, task_product_entity as task_products,
    vip_level_entity as vip_levels,
};
use crate::error::{AppError, AppResult};
use rand::Rng;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// 任务商品目录: 等级 -> 商店组 -> 商品池。
/// 用户只能在所属等级绑定的商店组内被匹配, 没有绑定就是硬失败, 不降级。
#[derive(Clone)]
pub struct CatalogService {
    pool: DatabaseConnection,
}

impl CatalogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 为用户等级解析一个可用商品。
    /// - 指定商品ID: 校验启用/库存/等级限制, 不符合报 ProductNotEligible
    /// - 未指定: 在等级绑定的商店组内均匀随机选取
    pub async fn find_eligible_product_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        tier: &vip_levels::Model,
        explicit_product_id: Option<i64>,
    ) -> AppResult<task_products::Model> {
        if let Some(product_id) = explicit_product_id {
            let product = task_products::Entity::find_by_id(product_id)
                .one(conn)
                .await?
                .ok_or_else(|| AppError::NotFound("Task product not found".to_string()))?;

            if !product.is_active {
                return Err(AppError::ProductNotEligible(
                    "product is not active".to_string(),
                ));
            }
            if product.stock <= 0 {
                return Err(AppError::ProductNotEligible(
                    "product is out of stock".to_string(),
                ));
            }
            if let Some(required_level) = product.vip_level_id {
                if required_level != tier.id {
                    return Err(AppError::ProductNotEligible(
                        "product is restricted to another VIP tier".to_string(),
                    ));
                }
            }
            return Ok(product);
        }

        // 等级绑定的启用商店组
        let group = shop_groups::Entity::find()
            .filter(shop_groups::Column::VipLevelId.eq(tier.id))
            .filter(shop_groups::Column::IsActive.eq(true))
            .one(conn)
            .await?
            .ok_or(AppError::NoShopGroupConfigured)?;

        let mut pool_products = task_products::Entity::find()
            .filter(task_products::Column::ShopGroupId.eq(group.id))
            .filter(task_products::Column::IsActive.eq(true))
            .filter(task_products::Column::Stock.gt(0))
            .all(conn)
            .await?;

        // 组内商品若带等级限制, 也必须匹配当前等级
        pool_products.retain(|p| p.vip_level_id.map_or(true, |lvl| lvl == tier.id));

        if pool_products.is_empty() {
            return Err(AppError::NoProductsAvailable);
        }

        let idx = {
            let mut rng = rand::thread_rng();
            rng.gen_range(0..pool_products.len())
        };
        Ok(pool_products.swap_remove(idx))
    }
}
