use crate::error::AppError;
use crate::middlewares::AuthenticatedUser;
use crate::models::*;
use crate::services::{LedgerService, UserService};
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

/// 从请求扩展中获取身份（中间件在鉴权后注入）
fn current_user(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    req.extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing identity".to_string()))
}

#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取个人资料成功", body = ProfileResponse),
        (status = 401, description = "未授权")
    )
)]
/// 个人资料: 余额/计数器 + 当前 VIP 等级
pub async fn get_profile(
    service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service.get_profile(user.id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/transactions",
    tag = "user",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取流水成功"),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取本人账本流水（倒序）
pub async fn get_transactions(
    ledger: web::Data<LedgerService>,
    req: HttpRequest,
    query: web::Query<TransactionQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match ledger.list_transactions(user.id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/profile", web::get().to(get_profile))
            .route("/transactions", web::get().to(get_transactions)),
    );
}
