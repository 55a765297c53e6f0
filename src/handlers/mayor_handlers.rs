use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::auth::identity::Identity;
use crate::auth::token::Role;
use crate::errors::AppError;
use crate::handlers::{Params, dashboard};
use crate::models::{dashboard as rollup, report};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard/summary", web::get().to(summary))
        .route("/dashboard/pincodes", web::get().to(pincodes))
        .route("/dashboard/daily", web::get().to(daily))
        .route("/complaints", web::get().to(list_complaints))
        .route("/complaints/{id}", web::get().to(complaint_detail))
        .route("/reports", web::get().to(list_reports));
}

/// GET /api/mayor/dashboard/summary - City-wide totals
pub async fn summary(
    pool: web::Data<PgPool>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Mayor])?;
    Ok(HttpResponse::Ok().json(rollup::city_summary(&pool).await?))
}

pub async fn pincodes(
    pool: web::Data<PgPool>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Mayor])?;
    dashboard::pincodes(&pool).await
}

pub async fn daily(
    pool: web::Data<PgPool>,
    identity: Identity,
    query: Params,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Mayor])?;
    dashboard::daily(&pool, &query).await
}

/// GET /api/mayor/complaints
/// Query params: status, pincode, page, per_page
pub async fn list_complaints(
    pool: web::Data<PgPool>,
    identity: Identity,
    query: Params,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Mayor])?;
    dashboard::complaint_page(&pool, &query).await
}

pub async fn complaint_detail(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Mayor])?;
    dashboard::complaint_detail(&pool, path.into_inner()).await
}

/// GET /api/mayor/reports - Every completion report with its cost breakdown
pub async fn list_reports(
    pool: web::Data<PgPool>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Mayor])?;
    Ok(HttpResponse::Ok().json(report::find_all(&pool).await?))
}
