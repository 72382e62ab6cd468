use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not owner of this resource")]
    NotOwner,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("State conflict: {0}")]
    StateConflict(String),

    #[error("Insufficient funds: balance {balance_cents} cents, need {required_cents} cents")]
    InsufficientFunds {
        balance_cents: i64,
        required_cents: i64,
    },

    #[error("Insufficient VIP tier: {0}")]
    InsufficientTier(String),

    #[error("No free spins remaining")]
    NoFreeSpins,

    #[error("No shop group configured for this VIP tier")]
    NoShopGroupConfigured,

    #[error("No products available in the bound shop group")]
    NoProductsAvailable,

    #[error("Product not eligible: {0}")]
    ProductNotEligible(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::NotOwner => (
                actix_web::http::StatusCode::FORBIDDEN,
                "NOT_OWNER",
                "Not owner of this resource".to_string(),
            ),
            AppError::PermissionDenied => {
                log::warn!("Permission denied");
                (
                    actix_web::http::StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Permission denied".to_string(),
                )
            }
            AppError::StateConflict(msg) => {
                log::warn!("State conflict: {msg}");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "STATE_CONFLICT",
                    msg.clone(),
                )
            }
            AppError::InsufficientFunds { .. } => (
                actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
                "INSUFFICIENT_FUNDS",
                self.to_string(),
            ),
            AppError::InsufficientTier(msg) => (
                actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
                "INSUFFICIENT_TIER",
                msg.clone(),
            ),
            AppError::NoFreeSpins => (
                actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
                "NO_FREE_SPINS",
                self.to_string(),
            ),
            AppError::NoShopGroupConfigured => (
                actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
                "NO_SHOP_GROUP",
                self.to_string(),
            ),
            AppError::NoProductsAvailable => (
                actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
                "NO_PRODUCTS_AVAILABLE",
                self.to_string(),
            ),
            AppError::ProductNotEligible(msg) => (
                actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
                "PRODUCT_NOT_ELIGIBLE",
                msg.clone(),
            ),
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
