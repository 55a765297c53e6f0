use chrono::NaiveDate;
use sqlx::PgPool;

use roadfix::errors::AppError;
use roadfix::models::complaint::{self, ComplaintFilter, Rejector};
use roadfix::models::status::ComplaintStatus::{self, *};

mod common;
use common::*;

fn statuses(detail: &complaint::ComplaintDetail) -> Vec<ComplaintStatus> {
    detail.timeline.iter().map(|s| s.status).collect()
}

// ---------------------------------------------------------------------------
// Creation and timeline
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn new_complaint_is_submitted_with_pending_completion(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    let id = create_complaint(&pool, user, PINCODE).await;

    let detail = complaint::find_detail(&pool, id).await.unwrap().expect("exists");
    assert_eq!(detail.status, Some(Submitted));
    assert_eq!(detail.messages.len(), 1);
    assert_eq!(detail.messages[0].message, "Complaint submitted");
    assert_eq!(statuses(&detail), vec![Submitted, Completed]);

    let last = detail.timeline.last().unwrap();
    assert!(!last.completed);
    assert_eq!(last.date, "");
    assert!(detail.supervisor.is_none());
    assert!(detail.feedback.is_none());
    assert!(detail.report.is_none());
}

#[sqlx::test]
async fn timeline_follows_the_log_and_shows_estimated_end(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    create_supervisor(&pool, "SUP-1", PINCODE).await;
    let id = create_complaint(&pool, user, PINCODE).await;
    advance(&pool, id, "SUP-1", &[Inspected]).await;

    let mut update = progress(Ongoing);
    update.estimated_end_date = NaiveDate::from_ymd_opt(2030, 6, 30);
    update.estimated_expense = Some(125_000.0);
    complaint::update_progress(&pool, id, "SUP-1", &update).await.unwrap();

    let detail = complaint::find_detail(&pool, id).await.unwrap().unwrap();
    assert_eq!(detail.status, Some(Ongoing));
    assert_eq!(statuses(&detail), vec![Submitted, SupervisorAssigned, Inspected, Ongoing, Completed]);
    assert!(detail.timeline[..4].iter().all(|s| s.completed));

    let last = detail.timeline.last().unwrap();
    assert!(!last.completed);
    assert_eq!(last.date, "2030-06-30");
    assert_eq!(detail.estimated_expense, Some(125_000.0));
    assert_eq!(detail.supervisor.as_ref().map(|s| s.id.as_str()), Some("SUP-1"));
}

#[sqlx::test]
async fn estimates_are_kept_when_a_later_update_omits_them(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    create_supervisor(&pool, "SUP-1", PINCODE).await;
    let id = create_complaint(&pool, user, PINCODE).await;
    complaint::assign_supervisor(&pool, id, "SUP-1", "Assigned").await.unwrap();

    let mut update = progress(Inspected);
    update.estimated_expense = Some(5_000.0);
    complaint::update_progress(&pool, id, "SUP-1", &update).await.unwrap();
    complaint::update_progress(&pool, id, "SUP-1", &progress(Ongoing)).await.unwrap();

    let detail = complaint::find_detail(&pool, id).await.unwrap().unwrap();
    assert_eq!(detail.estimated_expense, Some(5_000.0));
}

#[sqlx::test]
async fn completed_timeline_has_no_synthetic_step(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    create_supervisor(&pool, "SUP-1", PINCODE).await;
    let id = completed_complaint(&pool, user, "SUP-1").await;

    let detail = complaint::find_detail(&pool, id).await.unwrap().unwrap();
    assert_eq!(detail.status, Some(Completed));
    assert_eq!(statuses(&detail), vec![Submitted, SupervisorAssigned, Completed]);
    assert!(detail.timeline.iter().all(|s| s.completed));
}

#[sqlx::test]
async fn unknown_complaint_is_none(pool: PgPool) {
    assert!(complaint::find_detail(&pool, 4242).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn only_submitted_complaints_can_be_assigned(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    create_supervisor(&pool, "SUP-1", PINCODE).await;
    create_supervisor(&pool, "SUP-2", PINCODE).await;
    let id = create_complaint(&pool, user, PINCODE).await;

    complaint::assign_supervisor(&pool, id, "SUP-1", "Assigned").await.unwrap();
    let again = complaint::assign_supervisor(&pool, id, "SUP-2", "Reassigned").await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));
}

#[sqlx::test]
async fn assigning_unknown_supervisor_or_complaint_fails(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    let id = create_complaint(&pool, user, PINCODE).await;

    let res = complaint::assign_supervisor(&pool, id, "NOBODY", "Assigned").await;
    assert!(matches!(res, Err(AppError::BadRequest(_))));
    let res = complaint::assign_supervisor(&pool, 999, "NOBODY", "Assigned").await;
    assert!(matches!(res, Err(AppError::NotFound)));

    let detail = complaint::find_detail(&pool, id).await.unwrap().unwrap();
    assert_eq!(detail.status, Some(Submitted));
}

#[sqlx::test]
async fn progress_only_moves_forward(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    create_supervisor(&pool, "SUP-1", PINCODE).await;
    let id = create_complaint(&pool, user, PINCODE).await;
    advance(&pool, id, "SUP-1", &[Ongoing]).await;

    for backwards in [Inspected, SupervisorAssigned, Submitted, Ongoing] {
        let res = complaint::update_progress(&pool, id, "SUP-1", &progress(backwards)).await;
        assert!(matches!(res, Err(AppError::BadRequest(_))), "{backwards} should be refused");
    }
    let res = complaint::update_progress(&pool, id, "SUP-1", &progress(Rejected)).await;
    assert!(matches!(res, Err(AppError::BadRequest(_))));

    complaint::update_progress(&pool, id, "SUP-1", &progress(Completed)).await.unwrap();
    let res = complaint::update_progress(&pool, id, "SUP-1", &progress(Completed)).await;
    assert!(matches!(res, Err(AppError::BadRequest(_))));
}

#[sqlx::test]
async fn progress_requires_an_assignment(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    create_supervisor(&pool, "SUP-1", PINCODE).await;
    let id = create_complaint(&pool, user, PINCODE).await;

    let res = complaint::update_progress(&pool, id, "SUP-1", &progress(Inspected)).await;
    assert!(matches!(res, Err(AppError::NotFound)));
}

#[sqlx::test]
async fn other_supervisors_cannot_touch_the_complaint(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    create_supervisor(&pool, "SUP-1", PINCODE).await;
    create_supervisor(&pool, "SUP-2", PINCODE).await;
    let id = create_complaint(&pool, user, PINCODE).await;
    advance(&pool, id, "SUP-1", &[]).await;

    let res = complaint::update_progress(&pool, id, "SUP-2", &progress(Inspected)).await;
    assert!(matches!(res, Err(AppError::NotFound)));
    let res = complaint::reject(&pool, id, Rejector::Supervisor("SUP-2"), "Not mine").await;
    assert!(matches!(res, Err(AppError::NotFound)));
}

#[sqlx::test]
async fn rejection_is_terminal(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    create_supervisor(&pool, "SUP-1", PINCODE).await;
    let id = create_complaint(&pool, user, PINCODE).await;
    advance(&pool, id, "SUP-1", &[Inspected]).await;

    complaint::reject(&pool, id, Rejector::Supervisor("SUP-1"), "Private road").await.unwrap();

    let detail = complaint::find_detail(&pool, id).await.unwrap().unwrap();
    assert_eq!(detail.status, Some(Rejected));
    assert_eq!(statuses(&detail), vec![Submitted, SupervisorAssigned, Inspected, Rejected]);
    assert_eq!(detail.messages.last().unwrap().message, "Private road");

    let res = complaint::update_progress(&pool, id, "SUP-1", &progress(Ongoing)).await;
    assert!(matches!(res, Err(AppError::BadRequest(_))));
    let res = complaint::reject(&pool, id, Rejector::Admin, "Again").await;
    assert!(matches!(res, Err(AppError::BadRequest(_))));
}

#[sqlx::test]
async fn admin_can_reject_a_submitted_complaint(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    let id = create_complaint(&pool, user, PINCODE).await;

    complaint::reject(&pool, id, Rejector::Admin, "Duplicate").await.unwrap();
    let detail = complaint::find_detail(&pool, id).await.unwrap().unwrap();
    assert_eq!(detail.status, Some(Rejected));
    assert_eq!(statuses(&detail), vec![Submitted, Rejected]);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn list_filters_by_owner_status_and_pincode(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com").await;
    let bob = create_user(&pool, "bob@example.com").await;
    create_supervisor(&pool, "SUP-1", PINCODE).await;

    let a1 = create_complaint(&pool, alice, PINCODE).await;
    let a2 = create_complaint(&pool, alice, OTHER_PINCODE).await;
    let b1 = create_complaint(&pool, bob, PINCODE).await;
    advance(&pool, a1, "SUP-1", &[Ongoing]).await;

    let mine = complaint::find_all(&pool, &ComplaintFilter { user_id: Some(alice), ..Default::default() })
        .await
        .unwrap();
    let ids: Vec<i64> = mine.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![a2, a1]);

    let ongoing = complaint::find_all(&pool, &ComplaintFilter { status: Some(Ongoing), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(ongoing.len(), 1);
    assert_eq!(ongoing[0].id, a1);
    assert_eq!(ongoing[0].supervisor_name.as_deref(), Some("Supervisor SUP-1"));

    let here = complaint::find_all(
        &pool,
        &ComplaintFilter { pincode: Some(PINCODE.to_string()), status: Some(Submitted), ..Default::default() },
    )
    .await
    .unwrap();
    assert_eq!(here.iter().map(|c| c.id).collect::<Vec<_>>(), vec![b1]);

    let assigned = complaint::find_all(
        &pool,
        &ComplaintFilter { supervisor_id: Some("SUP-1".to_string()), ..Default::default() },
    )
    .await
    .unwrap();
    assert_eq!(assigned.len(), 1);
}

#[sqlx::test]
async fn pagination_reports_total_count(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    for _ in 0..5 {
        create_complaint(&pool, user, PINCODE).await;
    }

    let filter = ComplaintFilter::default();
    let page1 = complaint::find_paginated(&pool, &filter, 1, 2).await.unwrap();
    assert_eq!(page1.total_count, 5);
    assert_eq!(page1.items.len(), 2);

    let page3 = complaint::find_paginated(&pool, &filter, 3, 2).await.unwrap();
    assert_eq!(page3.page, 3);
    assert_eq!(page3.items.len(), 1);

    let beyond = complaint::find_paginated(&pool, &filter, 10, 2).await.unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_count, 5);
}

#[sqlx::test]
async fn overflowing_page_is_a_bad_request(pool: PgPool) {
    let user = create_user(&pool, "a@example.com").await;
    create_complaint(&pool, user, PINCODE).await;

    let filter = ComplaintFilter::default();
    let res = complaint::find_paginated(&pool, &filter, i64::MAX, 100).await;
    assert!(matches!(res, Err(AppError::BadRequest(_))));
    let res = complaint::find_paginated(&pool, &filter, 400_000_000_000_000_000, 100).await;
    assert!(matches!(res, Err(AppError::BadRequest(_))));

    // Far past the end but representable: just an empty page.
    let far = complaint::find_paginated(&pool, &filter, 1_000_000_000, 100).await.unwrap();
    assert!(far.items.is_empty());
    assert_eq!(far.total_count, 1);
}
