use crate::error::AppError;
use crate::middlewares::AuthenticatedUser;
use crate::models::*;
use crate::services::WheelService;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

fn current_user(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    req.extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing identity".to_string()))
}

#[utoipa::path(
    get,
    path = "/wheel/prizes",
    tag = "wheel",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取奖品列表成功")
    )
)]
/// 转盘奖品列表 (含权重, 供前端渲染)
pub async fn list_prizes(service: web::Data<WheelService>) -> Result<HttpResponse> {
    match service.list_prizes().await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wheel/spin",
    tag = "wheel",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽奖成功", body = WheelSpinResponse),
        (status = 422, description = "免费次数不足")
    )
)]
/// 消耗一次免费机会抽奖, 现金奖品即时入账
pub async fn spin(service: web::Data<WheelService>, req: HttpRequest) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service.spin(user.id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wheel/records",
    tag = "wheel",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取抽奖记录成功")
    )
)]
/// 本人抽奖历史 (分页, 倒序)
pub async fn list_records(
    service: web::Data<WheelService>,
    req: HttpRequest,
    query: web::Query<WheelRecordQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list_records(user.id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wheel_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wheel")
            .route("/prizes", web::get().to(list_prizes))
            .route("/spin", web::post().to(spin))
            .route("/records", web::get().to(list_records)),
    );
}
