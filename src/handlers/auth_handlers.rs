use std::net::{IpAddr, Ipv4Addr};

use actix_web::{HttpRequest, HttpResponse, web};
use sqlx::PgPool;

use crate::auth::identity::Identity;
use crate::auth::rate_limit::LoginLimiter;
use crate::auth::token::{Role, TokenKeys};
use crate::auth::{password, validate};
use crate::dto::{LoginRequest, MeResponse, TokenResponse};
use crate::errors::{AppError, ApiErrorResponse, is_unique_violation};
use crate::handlers::check;
use crate::models::user::{self, NewUser, SignupRequest};
use crate::models::{revoked_token, staff, supervisor};

/// POST /api/auth/signup - Register a citizen and log them in
pub async fn signup(
    pool: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let mut errors = Vec::new();
    errors.extend(validate::validate_name(&body.name));
    errors.extend(validate::validate_email(&body.email));
    errors.extend(validate::validate_phone(&body.phone));
    errors.extend(validate::validate_password(&body.password));
    errors.extend(validate::validate_optional(&body.address, "Address", 500));
    errors.extend(validate::validate_pincode(&body.pincode));
    check(errors)?;

    let new = NewUser {
        name: body.name.trim().to_string(),
        email: body.email.trim().to_lowercase(),
        phone: body.phone.trim().to_string(),
        password: password::hash_password(&body.password)?,
        address: body.address.trim().to_string(),
        pincode: body.pincode.trim().to_string(),
    };

    let id = match user::create(&pool, &new).await {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::BadRequest("An account with this email already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    log::info!("New citizen account {} ({})", id, new.email);

    let issued = keys.issue(Role::User, &id.to_string())?;
    Ok(HttpResponse::Created().json(TokenResponse::from(issued)))
}

/// Subject and password hash of the account `identifier` names for `role`.
async fn find_credentials(
    pool: &PgPool,
    role: Role,
    identifier: &str,
) -> Result<Option<(String, String)>, AppError> {
    let found = match role {
        Role::User => user::find_by_email(pool, identifier)
            .await?
            .map(|u| (u.id.to_string(), u.password)),
        Role::Supervisor => supervisor::find_by_id(pool, identifier)
            .await?
            .map(|s| (s.id, s.password)),
        Role::Admin | Role::Mayor => staff::find(pool, identifier, role)
            .await?
            .map(|s| (s.username, s.password)),
    };
    Ok(found)
}

/// POST /api/auth/login - Exchange credentials for a bearer token
pub async fn login(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
    limiter: web::Data<LoginLimiter>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    // Rate-limit check BEFORE any database access
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        log::warn!("Login blocked for {} after repeated failures", ip);
        return Ok(HttpResponse::TooManyRequests().json(ApiErrorResponse {
            error: "Too many failed login attempts. Please try again later.".to_string(),
            details: None,
        }));
    }

    let found = find_credentials(&pool, body.role, &body.identifier).await?;

    match found {
        Some((subject, hash)) if password::verify_password(&body.password, &hash) => {
            limiter.clear(ip);
            let issued = keys.issue(body.role, &subject)?;
            log::info!("{} '{}' logged in", body.role, subject);
            Ok(HttpResponse::Ok().json(TokenResponse::from(issued)))
        }
        _ => {
            limiter.record_failure(ip);
            Ok(HttpResponse::Unauthorized().json(ApiErrorResponse {
                error: "Invalid credentials".to_string(),
                details: None,
            }))
        }
    }
}

/// POST /api/auth/logout - Revoke the presented token
pub async fn logout(
    pool: web::Data<PgPool>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    revoked_token::revoke(&pool, &identity.jti, identity.expires_at()).await?;
    log::info!("{} '{}' logged out", identity.role, identity.subject);
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/auth/me - Who the token belongs to
pub async fn me(identity: Identity) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        role: identity.role,
        expires_at: identity.expires_at(),
        subject: identity.subject,
    })
}
