use actix_web::{
    Error, HttpMessage, ResponseError,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    web,
};
use sqlx::PgPool;

use super::identity::Identity;
use super::token::TokenKeys;
use crate::errors::AppError;
use crate::models::revoked_token;

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

async fn authenticate(req: &ServiceRequest) -> Result<Identity, AppError> {
    let raw = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_string()))?;
    let token = bearer_token(raw)
        .ok_or_else(|| AppError::Unauthorized("not a bearer token".to_string()))?;

    let keys = req
        .app_data::<web::Data<TokenKeys>>()
        .ok_or_else(|| AppError::Token("token keys not configured".to_string()))?;
    let claims = keys.verify(token)?;

    let pool = req
        .app_data::<web::Data<PgPool>>()
        .ok_or_else(|| AppError::Token("database pool not configured".to_string()))?;
    if revoked_token::is_revoked(pool, &claims.jti).await? {
        return Err(AppError::Unauthorized("token has been revoked".to_string()));
    }

    Ok(Identity::from(claims))
}

/// Middleware function that requires a valid, unrevoked bearer token.
/// Responds 401 otherwise; on success the `Identity` is stored in request extensions.
pub async fn require_bearer(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    match authenticate(&req).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.call(req).await.map(|res| res.map_into_left_body())
        }
        Err(e) => {
            let response = e.error_response();
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}
