use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::auth::identity::Identity;
use crate::auth::{password, validate};
use crate::errors::AppError;
use crate::handlers::{Params, check, status_param};
use crate::media::MediaClient;
use crate::models::complaint::{self, ComplaintFilter, ComplaintRequest, NewComplaint};
use crate::models::feedback::{self, FeedbackRequest};
use crate::models::user::{self, ProfileUpdate};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profile", web::get().to(profile))
        .route("/profile", web::put().to(update_profile))
        .route("/complaints", web::get().to(list_complaints))
        .route("/complaints", web::post().to(create_complaint))
        .route("/complaints/{id}", web::get().to(complaint_detail))
        .route("/complaints/{id}/feedback", web::post().to(submit_feedback));
}

/// GET /api/user/profile
pub async fn profile(
    pool: web::Data<PgPool>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    let user_id = identity.user_id()?;
    let profile = user::find_profile(&pool, user_id).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/user/profile
pub async fn update_profile(
    pool: web::Data<PgPool>,
    identity: Identity,
    body: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    let user_id = identity.user_id()?;

    let mut errors = Vec::new();
    errors.extend(validate::validate_name(&body.name));
    errors.extend(validate::validate_phone(&body.phone));
    errors.extend(validate::validate_optional(&body.address, "Address", 500));
    errors.extend(validate::validate_pincode(&body.pincode));
    if let Some(pw) = &body.password {
        errors.extend(validate::validate_password(pw));
    }
    check(errors)?;

    let hash = body.password.as_deref().map(password::hash_password).transpose()?;
    user::update_profile(&pool, user_id, &body, hash.as_deref()).await?;

    let profile = user::find_profile(&pool, user_id).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/user/complaints - The caller's complaints, newest first
/// Query params: status (optional)
pub async fn list_complaints(
    pool: web::Data<PgPool>,
    identity: Identity,
    query: Params,
) -> Result<HttpResponse, AppError> {
    let filter = ComplaintFilter {
        user_id: Some(identity.user_id()?),
        status: status_param(&query)?,
        ..Default::default()
    };
    let complaints = complaint::find_all(&pool, &filter).await?;
    Ok(HttpResponse::Ok().json(complaints))
}

/// POST /api/user/complaints - File a complaint; images are uploaded before anything is stored
pub async fn create_complaint(
    pool: web::Data<PgPool>,
    media: web::Data<MediaClient>,
    identity: Identity,
    body: web::Json<ComplaintRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = identity.user_id()?;

    let mut errors = Vec::new();
    errors.extend(validate::validate_required(&body.title, "Title", 200));
    errors.extend(validate::validate_optional(&body.description, "Description", 4000));
    errors.extend(validate::validate_required(&body.location, "Location", 300));
    errors.extend(validate::validate_pincode(&body.pincode));
    check(errors)?;

    let image_urls = media.upload_all(&body.images).await?;

    let new = NewComplaint {
        user_id,
        title: body.title.trim().to_string(),
        description: body.description.trim().to_string(),
        location: body.location.trim().to_string(),
        pincode: body.pincode.trim().to_string(),
        severity: body.severity,
        image_urls,
    };
    let id = complaint::create(&pool, &new).await?;
    log::info!("Complaint {} filed by user {} in {}", id, user_id, new.pincode);

    let detail = complaint::find_detail(&pool, id).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(detail))
}

/// GET /api/user/complaints/{id} - Only the owner may see it
pub async fn complaint_detail(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user_id = identity.user_id()?;
    let detail = complaint::find_detail(&pool, path.into_inner())
        .await?
        .filter(|d| d.user_id == user_id)
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/user/complaints/{id}/feedback
pub async fn submit_feedback(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<FeedbackRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = identity.user_id()?;
    let complaint_id = path.into_inner();

    let mut errors = Vec::new();
    errors.extend(validate::validate_rating(body.rating));
    errors.extend(validate::validate_optional(&body.comment, "Comment", 2000));
    check(errors)?;

    feedback::create(&pool, complaint_id, user_id, body.rating, body.comment.trim()).await?;
    log::info!("Feedback {}/5 on complaint {}", body.rating, complaint_id);

    let saved = feedback::find_for_complaint(&pool, complaint_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(saved))
}
