use crate::entities::UserRole;
use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};

/// 鉴权后注入请求扩展的身份信息
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// 公开路径: 文档与登录注册续签
fn is_public_path(path: &str) -> bool {
    const EXACT: [&str; 2] = ["/swagger-ui", "/api-docs/openapi.json"];
    const PREFIXES: [&str; 3] = ["/swagger-ui/", "/api-docs/", "/api/v1/auth/"];

    EXACT.contains(&path) || PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if is_public_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let token = match token {
            Some(t) => t,
            None => {
                let error = AppError::AuthError("Missing access token".to_string());
                return Box::pin(async move { Err(error.into()) });
            }
        };

        match self.jwt_service.verify_access_token(token) {
            Ok(claims) => {
                let user_id = claims.sub.parse::<i64>().unwrap_or(0);
                req.extensions_mut().insert(AuthenticatedUser {
                    id: user_id,
                    role: claims.role,
                });
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(_) => {
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}
