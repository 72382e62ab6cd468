use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::{ProfileResponse, UserResponse};
use crate::services::VipService;
use sea_orm::{DatabaseConnection, EntityTrait};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
    vip: VipService,
}

impl UserService {
    pub fn new(pool: DatabaseConnection, vip: VipService) -> Self {
        Self { pool, vip }
    }

    /// 个人资料: 用户信息 + 按当前余额解析的等级快照
    pub async fn get_profile(&self, user_id: i64) -> AppResult<ProfileResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let tier = self.vip.resolve_tier(user.balance_cents).await?;

        Ok(ProfileResponse {
            user: UserResponse::from(user),
            vip_level: tier.map(Into::into),
        })
    }
}
