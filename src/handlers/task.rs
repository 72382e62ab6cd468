use crate::error::AppError;
use crate::middlewares::AuthenticatedUser;
use crate::models::*;
use crate::services::{SettingsService, TaskRunService};
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
    path = "/tasks",
    tag = "task",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取任务列表成功")
    )
)]
/// 当前上架的任务
pub async fn list_tasks(service: web::Data<TaskRunService>) -> Result<HttpResponse> {
    match service.list_tasks().await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/tasks/{id}/start",
    tag = "task",
    params(
        ("id" = i64, Path, description = "任务ID")
    ),
    request_body = StartTaskRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "接取成功, 返回运行记录", body = TaskRunResponse),
        (status = 422, description = "等级不足 / 无可用商品")
    )
)]
/// 接取任务: 匹配商品并冻结价格与佣金率
pub async fn start_task(
    service: web::Data<TaskRunService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<StartTaskRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    let task_id = path.into_inner();
    let body = body.into_inner();

    match service
        .start(user.id, task_id, body.product_id, body.idempotency_key)
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
    post,
    path = "/task-runs/{id}/submit",
    tag = "task",
    params(
        ("id" = i64, Path, description = "运行记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "提交成功", body = SubmitTaskResponse),
        (status = 409, description = "状态冲突"),
        (status = 422, description = "余额不足以扣押金")
    )
)]
/// 提交任务: 扣押金, 命中自动审批则直接完成
pub async fn submit_task(
    service: web::Data<TaskRunService>,
    settings: web::Data<SettingsService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    let run_id = path.into_inner();

    // 审批设置每次请求重新加载, 管理端改动即时生效
    let approval = match settings.load().await {
        Ok(s) => s,
        Err(e) => return Ok(e.error_response()),
    };

    match service.submit(run_id, user.id, &approval).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/task-runs/{id}/cancel",
    tag = "task",
    params(
        ("id" = i64, Path, description = "运行记录ID")
    ),
    request_body = CancelTaskRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "取消成功", body = TaskRunResponse),
        (status = 403, description = "不是本人的运行记录"),
        (status = 409, description = "已处于终态")
    )
)]
/// 用户取消自己的任务, 已扣押金会冲正退回
pub async fn cancel_task(
    service: web::Data<TaskRunService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CancelTaskRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    let run_id = path.into_inner();

    // 归属校验在服务层取消前完成
    let run = match service.get_run(run_id).await {
        Ok(r) => r,
        Err(e) => return Ok(e.error_response()),
    };
    if run.user_id != user.id {
        return Ok(AppError::NotOwner.error_response());
    }

    match service.cancel(run_id, body.into_inner().reason, None).await {
        Ok(run) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": TaskRunResponse::from(run)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/task-runs",
    tag = "task",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)"),
        ("state" = Option<String>, Query, description = "按状态过滤")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取运行记录成功")
    )
)]
/// 本人的任务运行记录 (分页)
pub async fn list_runs(
    service: web::Data<TaskRunService>,
    req: HttpRequest,
    query: web::Query<TaskRunQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list_runs(user.id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/task-runs/{id}",
    tag = "task",
    params(
        ("id" = i64, Path, description = "运行记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取运行详情成功", body = TaskRunResponse),
        (status = 403, description = "不是本人的运行记录")
    )
)]
/// 单条运行详情
pub async fn get_run(
    service: web::Data<TaskRunService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service.get_run(path.into_inner()).await {
        Ok(run) => {
            if run.user_id != user.id && !user.is_admin() {
                return Ok(AppError::NotOwner.error_response());
            }
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": TaskRunResponse::from(run)
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn task_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tasks")
            .route("", web::get().to(list_tasks))
            .route("/{id}/start", web::post().to(start_task)),
    )
    .service(
        web::scope("/task-runs")
            .route("", web::get().to(list_runs))
            .route("/{id}", web::get().to(get_run))
            .route("/{id}/submit", web::post().to(submit_task))
            .route("/{id}/cancel", web::post().to(cancel_task)),
    );
}
