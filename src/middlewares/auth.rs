use crate::entities::{UserType, candidate_entity, user_entity};
use crate::error::AppError;
use crate::services::{CandidateService, UserService};
use crate::utils::{Claims, JwtService, TokenRole};
use actix_web::body::EitherBody;
use actix_web::http::Method;
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError, web,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// Decodes the bearer token when one is sent and stores its [`Claims`] in
/// the request extensions. Whether a route needs a caller at all is decided
/// by the guard extractors below.
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
    type Response = ServiceResponse<EitherBody<B>>;
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

impl<S, B> AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    fn forward(
        &self,
        req: ServiceRequest,
    ) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            return self.forward(req);
        }

        let Some(token) = bearer_token(&req) else {
            return self.forward(req);
        };

        match self.jwt_service.verify_access_token(token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                self.forward(req)
            }
            Err(_) => {
                // 以响应返回，外层 CORS 才能补上跨域头
                let error = AppError::AuthError("Invalid or expired token".to_string());
                let response = req
                    .into_response(error.error_response())
                    .map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

fn claims_of(req: &HttpRequest) -> Result<Claims, AppError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

fn user_service(req: &HttpRequest) -> Result<web::Data<UserService>, AppError> {
    req.app_data::<web::Data<UserService>>()
        .cloned()
        .ok_or_else(|| AppError::InternalError("UserService is not registered".to_string()))
}

async fn load_staff(req: HttpRequest) -> Result<user_entity::Model, AppError> {
    let claims = claims_of(&req)?;
    if !claims.role.is_staff() {
        return Err(AppError::Forbidden);
    }
    let id = claims.subject_id()?;
    user_service(&req)?.find_active(id).await
}

/// Signed-in admin or licensee, loaded fresh so blocked accounts are refused.
#[derive(Debug, Clone)]
pub struct CurrentStaff(pub user_entity::Model);

impl FromRequest for CurrentStaff {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { Ok(CurrentStaff(load_staff(req).await?)) })
    }
}

#[derive(Debug, Clone)]
pub struct AdminUser(pub user_entity::Model);

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let user = load_staff(req).await?;
            if user.user_type != UserType::Admin {
                log::warn!("User {} is not an admin", user.id);
                return Err(AppError::Forbidden.into());
            }
            Ok(AdminUser(user))
        })
    }
}

/// Staff caller when a valid token is present, `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct MaybeStaff(pub Option<user_entity::Model>);

impl FromRequest for MaybeStaff {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let is_staff = req
                .extensions()
                .get::<Claims>()
                .is_some_and(|c| c.role.is_staff());
            if !is_staff {
                return Ok(MaybeStaff(None));
            }
            Ok(MaybeStaff(Some(load_staff(req).await?)))
        })
    }
}

#[derive(Debug, Clone)]
pub struct CurrentCandidate(pub candidate_entity::Model);

impl FromRequest for CurrentCandidate {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let claims = claims_of(&req)?;
            if claims.role != TokenRole::Candidate {
                return Err(AppError::Forbidden.into());
            }
            let id = claims.subject_id()?;
            let service = req
                .app_data::<web::Data<CandidateService>>()
                .cloned()
                .ok_or_else(|| {
                    AppError::InternalError("CandidateService is not registered".to_string())
                })?;
            Ok(CurrentCandidate(service.find_active(id).await?))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::StatusCode, test};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match req.extensions().get::<Claims>() {
            Some(c) => HttpResponse::Ok().body(c.sub.clone()),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[actix_web::test]
    async fn test_token_is_optional_but_must_be_valid() {
        let jwt = JwtService::new("test-secret", 3600);
        let token = jwt.generate_access_token(7, TokenRole::Admin).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(test::read_body(resp).await, "anonymous");

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(test::read_body(resp).await, "7");

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_rejected_token_keeps_cors_headers() {
        let jwt = JwtService::new("test-secret", 3600);
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt))
                .wrap(crate::middlewares::create_cors())
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("Origin", "https://portal.example.com"))
            .insert_header(("Authorization", "Bearer expired"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(
            resp.headers()
                .contains_key(actix_web::http::header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "AUTH_ERROR");
    }

    #[actix_web::test]
    async fn test_candidate_token_is_not_staff() {
        let jwt = JwtService::new("test-secret", 3600);
        let token = jwt.generate_access_token(3, TokenRole::Candidate).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .route(
                    "/staff",
                    web::get().to(|_: CurrentStaff| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/staff")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/staff").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
