pub mod admin_handlers;
pub mod auth_handlers;
pub mod dashboard;
pub mod mayor_handlers;
pub mod supervisor_handlers;
pub mod user_handlers;

use std::collections::HashMap;

use actix_web::{
    Error, HttpRequest, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    error::JsonPayloadError,
    http::{Method, header},
    middleware::{Next, from_fn},
    web,
};

use crate::auth::middleware::require_bearer;
use crate::errors::{AppError, ApiErrorResponse};
use crate::models::status::ComplaintStatus;

pub type Params = web::Query<HashMap<String, String>>;

const DEFAULT_PER_PAGE: i64 = 25;
const MAX_PER_PAGE: i64 = 100;
const MAX_DAYS: i32 = 3650;

/// A request carries a payload when it declares a content type or a non-zero body.
fn has_payload(req: &ServiceRequest) -> bool {
    let headers = req.headers();
    if headers.contains_key(header::CONTENT_TYPE) || headers.contains_key(header::TRANSFER_ENCODING) {
        return true;
    }
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .is_some_and(|len| len > 0)
}

/// Rejects POST/PUT/DELETE requests carrying a body that is not `application/json`.
/// Bodiless mutations such as logout or supervisor deletion pass through.
pub async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if (method == Method::POST || method == Method::PUT || method == Method::DELETE) && has_payload(&req) {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = ApiErrorResponse {
                error: "Content-Type must be application/json for mutation requests".to_string(),
                details: None,
            };
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// JSON body for unknown routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiErrorResponse { error: "Not found".to_string(), details: None })
}

/// Malformed or mistyped JSON bodies answer in the same shape as every other error.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    AppError::BadRequest(format!("Invalid request body: {err}")).into()
}

/// Register every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .wrap(from_fn(require_json_content_type))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth_handlers::signup))
                    .route("/login", web::post().to(auth_handlers::login))
                    .service(
                        web::scope("")
                            .wrap(from_fn(require_bearer))
                            .route("/logout", web::post().to(auth_handlers::logout))
                            .route("/me", web::get().to(auth_handlers::me)),
                    ),
            )
            .service(
                web::scope("/user")
                    .wrap(from_fn(require_bearer))
                    .configure(user_handlers::configure),
            )
            .service(
                web::scope("/supervisor")
                    .wrap(from_fn(require_bearer))
                    .configure(supervisor_handlers::configure),
            )
            .service(
                web::scope("/admin")
                    .wrap(from_fn(require_bearer))
                    .configure(admin_handlers::configure),
            )
            .service(
                web::scope("/mayor")
                    .wrap(from_fn(require_bearer))
                    .configure(mayor_handlers::configure),
            ),
    );
}

/// Turn collected validation messages into an error, if there are any.
pub(crate) fn check(errors: Vec<String>) -> Result<(), AppError> {
    if errors.is_empty() { Ok(()) } else { Err(AppError::Validation(errors)) }
}

/// Non-empty, trimmed query parameter.
pub(crate) fn param<'a>(query: &'a Params, key: &str) -> Option<&'a str> {
    query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// `?status=` filter; an unknown label is a bad request rather than an empty list.
pub(crate) fn status_param(query: &Params) -> Result<Option<ComplaintStatus>, AppError> {
    param(query, "status")
        .map(|s| s.parse::<ComplaintStatus>().map_err(AppError::BadRequest))
        .transpose()
}

/// `?page=&per_page=`, clamped to 1..=100 per page.
pub(crate) fn page_params(query: &Params) -> (i64, i64) {
    let page = param(query, "page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(1)
        .max(1);
    let per_page = param(query, "per_page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    (page, per_page)
}

/// `?days=` window for the daily rollup, at most ten years; absent means all history.
pub(crate) fn days_param(query: &Params) -> Result<Option<i32>, AppError> {
    match param(query, "days") {
        None => Ok(None),
        Some(raw) => match raw.parse::<i32>() {
            Ok(days) if (1..=MAX_DAYS).contains(&days) => Ok(Some(days)),
            _ => Err(AppError::BadRequest(format!("days must be an integer from 1 to {MAX_DAYS}"))),
        },
    }
}
