use crate::error::AppError;
use crate::middlewares::AuthenticatedUser;
use crate::models::*;
use crate::services::{FinanceService, LedgerService, SettingsService, TaskRunService};
use crate::utils::PaginationParams;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

/// 管理端统一入口校验: 非 admin 一律 403
fn require_admin(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let user = req
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing identity".to_string()))?;
    if !user.is_admin() {
        return Err(AppError::PermissionDenied);
    }
    Ok(user)
}

#[utoipa::path(
    get,
    path = "/admin/task-runs/pending",
    tag = "admin",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "待审批任务列表"),
        (status = 403, description = "需要管理员权限")
    )
)]
/// 待人工审批的任务 (submitted, 先到先审)
pub async fn list_pending_runs(
    service: web::Data<TaskRunService>,
    req: HttpRequest,
    query: web::Query<PendingRunQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    let params = PaginationParams::new(query.page, query.per_page);
    match service.list_pending(&params).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/task-runs/{id}/complete",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "运行记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "审批完成", body = TaskRunResponse),
        (status = 409, description = "已被并发审批或已终态")
    )
)]
/// 人工审批通过: 返还本金+佣金并计数
pub async fn complete_run(
    service: web::Data<TaskRunService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let admin = match require_admin(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service.complete(path.into_inner(), Some(admin.id)).await {
        Ok(run) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": TaskRunResponse::from(run)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/task-runs/{id}/cancel",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "运行记录ID")
    ),
    request_body = CancelTaskRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "取消成功", body = TaskRunResponse),
        (status = 409, description = "已处于终态")
    )
)]
/// 管理员取消任意用户的任务, 已扣押金冲正退回
pub async fn cancel_run(
    service: web::Data<TaskRunService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CancelTaskRequest>,
) -> Result<HttpResponse> {
    let admin = match require_admin(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service
        .cancel(path.into_inner(), body.into_inner().reason, Some(admin.id))
        .await
    {
        Ok(run) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": TaskRunResponse::from(run)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/funds/pending",
    tag = "admin",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "待审批资金申请列表"),
        (status = 403, description = "需要管理员权限")
    )
)]
/// 待审批的充值/提现申请
pub async fn list_pending_funds(
    service: web::Data<FinanceService>,
    req: HttpRequest,
    query: web::Query<PendingRunQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    let params = PaginationParams::new(query.page, query.per_page);
    match service.list_pending(&params).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/funds/{id}/approve",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "资金申请ID")
    ),
    request_body = ReviewFundRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "审批通过并入账", body = FundRequestResponse),
        (status = 409, description = "已被审批"),
        (status = 422, description = "提现时余额不足")
    )
)]
/// 审批通过资金申请, 同一事务内落账
pub async fn approve_fund(
    service: web::Data<FinanceService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ReviewFundRequest>,
) -> Result<HttpResponse> {
    let admin = match require_admin(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service
        .approve(path.into_inner(), admin.id, body.into_inner().note)
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
    path = "/admin/funds/{id}/reject",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "资金申请ID")
    ),
    request_body = ReviewFundRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已驳回", body = FundRequestResponse),
        (status = 409, description = "已被审批")
    )
)]
/// 驳回资金申请 (不触账)
pub async fn reject_fund(
    service: web::Data<FinanceService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ReviewFundRequest>,
) -> Result<HttpResponse> {
    let admin = match require_admin(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service
        .reject(path.into_inner(), admin.id, body.into_inner().note)
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
    path = "/admin/users/{id}/adjust",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "用户ID")
    ),
    request_body = AdjustBalanceRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "调账成功"),
        (status = 409, description = "余额被并发修改"),
        (status = 422, description = "未允许负余额时扣减超出余额")
    )
)]
/// 管理员手工调账, 幂等键由管理端提供
pub async fn adjust_balance(
    ledger: web::Data<LedgerService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<AdjustBalanceRequest>,
) -> Result<HttpResponse> {
    let admin = match require_admin(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match ledger
        .admin_adjust(path.into_inner(), body.into_inner(), admin.id)
        .await
    {
        Ok(txn) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": TransactionResponse::from(txn)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/settings",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前审批策略", body = ApprovalSettings)
    )
)]
/// 当前平台审批策略
pub async fn get_settings(
    service: web::Data<SettingsService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.load().await {
        Ok(settings) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": settings }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/settings",
    tag = "admin",
    request_body = UpdateSettingsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新后的审批策略", body = ApprovalSettings)
    )
)]
/// 更新审批策略, 对后续提交即时生效
pub async fn update_settings(
    service: web::Data<SettingsService>,
    req: HttpRequest,
    body: web::Json<UpdateSettingsRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.update(body.into_inner()).await {
        Ok(settings) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": settings }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/task-runs/pending", web::get().to(list_pending_runs))
            .route("/task-runs/{id}/complete", web::post().to(complete_run))
            .route("/task-runs/{id}/cancel", web::post().to(cancel_run))
            .route("/funds/pending", web::get().to(list_pending_funds))
            .route("/funds/{id}/approve", web::post().to(approve_fund))
            .route("/funds/{id}/reject", web::post().to(reject_fund))
            .route("/users/{id}/adjust", web::post().to(adjust_balance))
            .route("/settings", web::get().to(get_settings))
            .route("/settings", web::put().to(update_settings)),
    );
}
