//! Read-only views shared by the admin and mayor dashboards.
//!
//! Each scope checks its own role and then calls into these.

use actix_web::HttpResponse;
use sqlx::PgPool;

use crate::dto::PaginatedResponse;
use crate::errors::AppError;
use crate::handlers::{Params, days_param, page_params, param, status_param};
use crate::models::complaint::{self, ComplaintFilter};
use crate::models::dashboard;

/// Paginated complaint list filtered by `status` and `pincode`.
pub async fn complaint_page(pool: &PgPool, query: &Params) -> Result<HttpResponse, AppError> {
    let filter = ComplaintFilter {
        status: status_param(query)?,
        pincode: param(query, "pincode").map(str::to_string),
        ..Default::default()
    };
    let (page, per_page) = page_params(query);
    let page = complaint::find_paginated(pool, &filter, page, per_page).await?;
    Ok(HttpResponse::Ok().json(PaginatedResponse::from(page)))
}

pub async fn complaint_detail(pool: &PgPool, id: i64) -> Result<HttpResponse, AppError> {
    let detail = complaint::find_detail(pool, id).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(detail))
}

pub async fn pincodes(pool: &PgPool) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(dashboard::pincode_rollup(pool).await?))
}

pub async fn daily(pool: &PgPool, query: &Params) -> Result<HttpResponse, AppError> {
    let days = days_param(query)?;
    Ok(HttpResponse::Ok().json(dashboard::daily_rollup(pool, days).await?))
}
