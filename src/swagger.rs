use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    FundDirection, FundRequestStatus, TaskRunState, TransactionStatus, TransactionType, UserRole,
};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::user::get_profile,
        handlers::user::get_transactions,
        handlers::task::list_tasks,
        handlers::task::start_task,
        handlers::task::submit_task,
        handlers::task::cancel_task,
        handlers::task::list_runs,
        handlers::task::get_run,
        handlers::wheel::list_prizes,
        handlers::wheel::spin,
        handlers::wheel::list_records,
        handlers::fund::create_deposit,
        handlers::fund::create_withdrawal,
        handlers::fund::list_records,
        handlers::fund::list_vip_levels,
        handlers::admin::list_pending_runs,
        handlers::admin::complete_run,
        handlers::admin::cancel_run,
        handlers::admin::list_pending_funds,
        handlers::admin::approve_fund,
        handlers::admin::reject_fund,
        handlers::admin::adjust_balance,
        handlers::admin::get_settings,
        handlers::admin::update_settings,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            AuthResponse,
            UserRole,
            UserResponse,
            ProfileResponse,
            VipLevelBrief,
            VipLevelResponse,
            TransactionType,
            TransactionStatus,
            TransactionResponse,
            TaskResponse,
            TaskRunState,
            StartTaskRequest,
            TaskRunResponse,
            SubmitTaskResponse,
            CancelTaskRequest,
            WheelPrizeResponse,
            WheelPrizeBrief,
            WheelSpinResponse,
            WheelSpinRecordResponse,
            FundDirection,
            FundRequestStatus,
            CreateFundRequest,
            FundRequestResponse,
            ReviewFundRequest,
            AdjustBalanceRequest,
            ApprovalSettings,
            UpdateSettingsRequest,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "user", description = "User profile and ledger API"),
        (name = "task", description = "Task catalog and run API"),
        (name = "wheel", description = "Lucky wheel API"),
        (name = "fund", description = "Deposit / withdrawal API"),
        (name = "admin", description = "Admin review and settings API"),
    ),
    info(
        title = "VipTask Backend API",
        version = "1.0.0",
        description = "VipTask Backend REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
