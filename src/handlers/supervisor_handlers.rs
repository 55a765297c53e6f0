use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::auth::identity::Identity;
use crate::auth::validate;
use crate::errors::AppError;
use crate::handlers::{Params, check, status_param};
use crate::media::MediaClient;
use crate::models::complaint::{
    self, ComplaintFilter, ProgressUpdate, RejectRequest, Rejector, StatusUpdateRequest, parse_status,
};
use crate::models::report::{self, ReportRequest};
use crate::models::{feedback, supervisor};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profile", web::get().to(profile))
        .route("/complaints", web::get().to(list_complaints))
        .route("/complaints/{id}", web::get().to(complaint_detail))
        .route("/complaints/{id}/status", web::post().to(update_status))
        .route("/complaints/{id}/reject", web::post().to(reject))
        .route("/complaints/{id}/report", web::post().to(file_report))
        .route("/feedback", web::get().to(list_feedback));
}

/// GET /api/supervisor/profile - Own record with workload and rating
pub async fn profile(
    pool: web::Data<PgPool>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    let id = identity.supervisor_id()?;
    let workload = supervisor::find_workload(&pool, id).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(workload))
}

/// GET /api/supervisor/complaints - Complaints assigned to the caller
/// Query params: status (optional)
pub async fn list_complaints(
    pool: web::Data<PgPool>,
    identity: Identity,
    query: Params,
) -> Result<HttpResponse, AppError> {
    let filter = ComplaintFilter {
        supervisor_id: Some(identity.supervisor_id()?.to_string()),
        status: status_param(&query)?,
        ..Default::default()
    };
    let complaints = complaint::find_all(&pool, &filter).await?;
    Ok(HttpResponse::Ok().json(complaints))
}

/// GET /api/supervisor/complaints/{id} - Only complaints assigned to the caller
pub async fn complaint_detail(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = identity.supervisor_id()?;
    let detail = complaint::find_detail(&pool, path.into_inner())
        .await?
        .filter(|d| d.supervisor.as_ref().is_some_and(|s| s.id == id))
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/supervisor/complaints/{id}/status - Record progress
///
/// The transition is checked before images are uploaded so an illegal update
/// does not leave files on the media host. It is checked again when stored.
pub async fn update_status(
    pool: web::Data<PgPool>,
    media: web::Data<MediaClient>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let supervisor_id = identity.supervisor_id()?;
    let complaint_id = path.into_inner();

    let mut errors = Vec::new();
    errors.extend(validate::validate_optional(&body.message, "Message", 2000));
    if let Some(expense) = body.estimated_expense {
        errors.extend(validate::validate_non_negative(expense, "Estimated expense"));
    }
    check(errors)?;

    let row = complaint::find_row(&pool, complaint_id).await?.ok_or(AppError::NotFound)?;
    if row.supervisor_id.as_deref() != Some(supervisor_id) {
        return Err(AppError::NotFound);
    }
    let current = row
        .status
        .as_deref()
        .map(parse_status)
        .transpose()?
        .ok_or_else(|| AppError::BadRequest("Complaint has no status history".to_string()))?;
    current.check_progress(body.status).map_err(AppError::BadRequest)?;

    let image_urls = media.upload_all(&body.images).await?;
    let message = match body.message.trim() {
        "" => format!("Status changed to {}", body.status),
        m => m.to_string(),
    };
    let update = ProgressUpdate {
        status: body.status,
        message,
        estimated_expense: body.estimated_expense,
        estimated_end_date: body.estimated_end_date,
        image_urls,
    };
    complaint::update_progress(&pool, complaint_id, supervisor_id, &update).await?;
    log::info!("Complaint {} moved to {} by {}", complaint_id, update.status, supervisor_id);

    let detail = complaint::find_detail(&pool, complaint_id).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/supervisor/complaints/{id}/reject
pub async fn reject(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<RejectRequest>,
) -> Result<HttpResponse, AppError> {
    let supervisor_id = identity.supervisor_id()?;
    let complaint_id = path.into_inner();
    check(validate::validate_required(&body.message, "Message", 2000).into_iter().collect())?;

    complaint::reject(&pool, complaint_id, Rejector::Supervisor(supervisor_id), body.message.trim()).await?;
    log::info!("Complaint {} rejected by supervisor {}", complaint_id, supervisor_id);

    let detail = complaint::find_detail(&pool, complaint_id).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/supervisor/complaints/{id}/report - Cost report for a completed complaint
pub async fn file_report(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<ReportRequest>,
) -> Result<HttpResponse, AppError> {
    let supervisor_id = identity.supervisor_id()?;
    let complaint_id = path.into_inner();
    check(body.validate())?;

    report::create(&pool, complaint_id, supervisor_id, &body).await?;
    log::info!("Report filed for complaint {} by {}", complaint_id, supervisor_id);

    let saved = report::find_for_complaint(&pool, complaint_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(saved))
}

/// GET /api/supervisor/feedback - Ratings left on the caller's work
pub async fn list_feedback(
    pool: web::Data<PgPool>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    let id = identity.supervisor_id()?;
    let items = feedback::find_for_supervisor(&pool, id).await?;
    Ok(HttpResponse::Ok().json(items))
}
