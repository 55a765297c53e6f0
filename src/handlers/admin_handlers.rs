use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::auth::identity::Identity;
use crate::auth::token::Role;
use crate::auth::{password, validate};
use crate::errors::{AppError, is_unique_violation};
use crate::handlers::{Params, check, dashboard};
use crate::models::complaint::{self, AssignRequest, RejectRequest, Rejector};
use crate::models::supervisor::{self, NewSupervisor, SupervisorRequest};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/complaints", web::get().to(list_complaints))
        .route("/complaints/{id}", web::get().to(complaint_detail))
        .route("/complaints/{id}/assign", web::post().to(assign))
        .route("/complaints/{id}/reject", web::post().to(reject))
        .route("/supervisors", web::get().to(list_supervisors))
        .route("/supervisors", web::post().to(create_supervisor))
        // /supervisors/pincode/{pincode} BEFORE /supervisors/{id}
        .route("/supervisors/pincode/{pincode}", web::get().to(rank_supervisors))
        .route("/supervisors/{id}", web::get().to(get_supervisor))
        .route("/supervisors/{id}", web::delete().to(delete_supervisor))
        .route("/dashboard/pincodes", web::get().to(dashboard_pincodes))
        .route("/dashboard/daily", web::get().to(dashboard_daily));
}

/// GET /api/admin/complaints
/// Query params: status, pincode, page (default 1), per_page (default 25)
pub async fn list_complaints(
    pool: web::Data<PgPool>,
    identity: Identity,
    query: Params,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Admin])?;
    dashboard::complaint_page(&pool, &query).await
}

pub async fn complaint_detail(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Admin])?;
    dashboard::complaint_detail(&pool, path.into_inner()).await
}

/// POST /api/admin/complaints/{id}/assign
pub async fn assign(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<AssignRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Admin])?;
    let complaint_id = path.into_inner();

    let supervisor_id = body.supervisor_id.trim();
    let mut errors = Vec::new();
    errors.extend(validate::validate_required(supervisor_id, "Supervisor id", 32));
    if let Some(msg) = &body.message {
        errors.extend(validate::validate_optional(msg, "Message", 2000));
    }
    check(errors)?;

    let message = match body.message.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => format!("Assigned to supervisor {supervisor_id}"),
    };
    complaint::assign_supervisor(&pool, complaint_id, supervisor_id, &message).await?;
    log::info!("Complaint {} assigned to {}", complaint_id, supervisor_id);

    dashboard::complaint_detail(&pool, complaint_id).await
}

/// POST /api/admin/complaints/{id}/reject
pub async fn reject(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<RejectRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Admin])?;
    let complaint_id = path.into_inner();
    check(validate::validate_required(&body.message, "Message", 2000).into_iter().collect())?;

    complaint::reject(&pool, complaint_id, Rejector::Admin, body.message.trim()).await?;
    log::info!("Complaint {} rejected by admin {}", complaint_id, identity.subject);

    dashboard::complaint_detail(&pool, complaint_id).await
}

/// GET /api/admin/supervisors - Every supervisor with workload
pub async fn list_supervisors(
    pool: web::Data<PgPool>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Admin])?;
    Ok(HttpResponse::Ok().json(supervisor::find_all(&pool).await?))
}

/// POST /api/admin/supervisors
pub async fn create_supervisor(
    pool: web::Data<PgPool>,
    identity: Identity,
    body: web::Json<SupervisorRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Admin])?;

    let mut errors = Vec::new();
    errors.extend(validate::validate_supervisor_id(&body.id));
    errors.extend(validate::validate_name(&body.name));
    errors.extend(validate::validate_email(&body.email));
    errors.extend(validate::validate_phone(&body.phone));
    errors.extend(validate::validate_password(&body.password));
    errors.extend(validate::validate_pincode(&body.pincode));
    check(errors)?;

    let new = NewSupervisor {
        id: body.id.trim().to_string(),
        name: body.name.trim().to_string(),
        email: body.email.trim().to_lowercase(),
        phone: body.phone.trim().to_string(),
        password: password::hash_password(&body.password)?,
        pincode: body.pincode.trim().to_string(),
    };

    match supervisor::create(&pool, &new).await {
        Ok(()) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::BadRequest(format!("Supervisor id '{}' is already taken", new.id)));
        }
        Err(e) => return Err(e.into()),
    }
    log::info!("Supervisor {} created for pincode {}", new.id, new.pincode);

    let created = supervisor::find_workload(&pool, &new.id).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(created))
}

pub async fn get_supervisor(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Admin])?;
    let found = supervisor::find_workload(&pool, &path).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(found))
}

/// DELETE /api/admin/supervisors/{id} - Only when every complaint they hold is Completed
pub async fn delete_supervisor(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Admin])?;
    let id = path.into_inner();
    supervisor::delete(&pool, &id).await?;
    log::info!("Supervisor {} deleted by {}", id, identity.subject);
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/admin/supervisors/pincode/{pincode} - Candidates for assignment, least loaded first
pub async fn rank_supervisors(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Admin])?;
    if let Some(msg) = validate::validate_pincode(&path) {
        return Err(AppError::BadRequest(msg));
    }
    Ok(HttpResponse::Ok().json(supervisor::rank_for_pincode(&pool, &path).await?))
}

pub async fn dashboard_pincodes(
    pool: web::Data<PgPool>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Admin])?;
    dashboard::pincodes(&pool).await
}

/// GET /api/admin/dashboard/daily
/// Query params: days (optional, positive)
pub async fn dashboard_daily(
    pool: web::Data<PgPool>,
    identity: Identity,
    query: Params,
) -> Result<HttpResponse, AppError> {
    identity.require(&[Role::Admin])?;
    dashboard::daily(&pool, &query).await
}
