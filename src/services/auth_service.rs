use crate::entities::{user_entity as users, UserRole};
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::utils::{hash_password, verify_password, JwtService};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// 注册/登录/续签。身份校验之外的业务调用一律信任中间件注入的身份。
#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        if request.username.len() < 2 || request.username.len() > 32 {
            return Err(AppError::ValidationError(
                "Username length must be between 2 and 32 characters".to_string(),
            ));
        }
        if request.password.len() < 6 {
            return Err(AppError::ValidationError(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        let existing = users::Entity::find()
            .filter(users::Column::Username.eq(request.username.clone()))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "Username already taken".to_string(),
            ));
        }

        let user = users::ActiveModel {
            username: Set(request.username),
            password_hash: Set(hash_password(&request.password)?),
            role: Set(UserRole::User),
            balance_cents: Set(0),
            completed_orders: Set(0),
            free_spins: Set(0),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(request.username))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        self.issue_tokens(user)
    }

    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

        // 重新读取用户, 角色变更在续签时生效
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        self.issue_tokens(user)
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self
            .jwt_service
            .generate_access_token(user.id, user.role.clone())?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(user.id, user.role)?;

        Ok(AuthResponse {
            user_id: user.id,
            username: user.username,
            access_token,
            refresh_token,
        })
    }
}
