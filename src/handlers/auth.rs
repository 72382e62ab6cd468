use crate::models::*;
use crate::services::AuthService;
use actix_web::{web, HttpResponse, ResponseError, Result};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "注册成功", body = AuthResponse),
        (status = 400, description = "用户名已存在或参数非法")
    )
)]
/// 注册新用户并签发令牌
pub async fn register(
    service: web::Data<AuthService>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    match service.register(body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = AuthResponse),
        (status = 401, description = "用户名或密码错误")
    )
)]
/// 登录并签发令牌
pub async fn login(
    service: web::Data<AuthService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match service.login(body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "续签成功", body = AuthResponse),
        (status = 401, description = "refresh token 无效")
    )
)]
/// 用 refresh token 换发新令牌对
pub async fn refresh(
    service: web::Data<AuthService>,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    match service.refresh(&body.refresh_token).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh)),
    );
}
