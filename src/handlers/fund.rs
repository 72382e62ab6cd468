use crate::entities::FundDirection;
use crate::error::AppError;
use crate::middlewares::AuthenticatedUser;
use crate::models::*;
use crate::services::{FinanceService, VipService};
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

fn current_user(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    req.extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing identity".to_string()))
}

#[utoipa::path(
    post,
    path = "/funds/deposit",
    tag = "fund",
    request_body = CreateFundRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "充值申请已创建", body = FundRequestResponse),
        (status = 400, description = "金额非法")
    )
)]
/// 发起充值申请, 待管理员审批后入账
pub async fn create_deposit(
    service: web::Data<FinanceService>,
    req: HttpRequest,
    body: web::Json<CreateFundRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service
        .create_request(user.id, FundDirection::Deposit, body.amount_cents)
        .await
    {
        Ok(r) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": FundRequestResponse::from(r)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/funds/withdraw",
    tag = "fund",
    request_body = CreateFundRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "提现申请已创建", body = FundRequestResponse),
        (status = 422, description = "余额不足")
    )
)]
/// 发起提现申请, 审批通过时才真正扣款
pub async fn create_withdrawal(
    service: web::Data<FinanceService>,
    req: HttpRequest,
    body: web::Json<CreateFundRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service
        .create_request(user.id, FundDirection::Withdrawal, body.amount_cents)
        .await
    {
        Ok(r) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": FundRequestResponse::from(r)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/funds/records",
    tag = "fund",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)"),
        ("status" = Option<String>, Query, description = "按状态过滤")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取资金申请记录成功")
    )
)]
/// 本人资金申请记录 (分页)
pub async fn list_records(
    service: web::Data<FinanceService>,
    req: HttpRequest,
    query: web::Query<FundRecordQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list_requests(user.id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/vip/levels",
    tag = "fund",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取等级列表成功")
    )
)]
/// 启用的 VIP 等级 (按达标门槛升序)
pub async fn list_vip_levels(service: web::Data<VipService>) -> Result<HttpResponse> {
    match service.list_levels().await {
        Ok(levels) => {
            let data: Vec<VipLevelResponse> = levels.into_iter().map(Into::into).collect();
            Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn fund_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/funds")
            .route("/deposit", web::post().to(create_deposit))
            .route("/withdraw", web::post().to(create_withdrawal))
            .route("/records", web::get().to(list_records)),
    )
    .service(web::scope("/vip").route("/levels", web::get().to(list_vip_levels)));
}
