//! Ticket scan and attendance tests

mod helpers;

use assert_matches::assert_matches;
use futures::future::join_all;
use helpers::*;

use CampusEvents::{models::RegistrationStatus, CampusEventsError};

struct Ticketed {
    ctx: TestContext,
    organizer: CampusEvents::models::Caller,
    participant: CampusEvents::models::Caller,
    event_id: i64,
    registration_id: i64,
    ticket_id: String,
}

async fn ticketed() -> Ticketed {
    let ctx = TestContext::new();
    let (_, organizer) = ctx.organizer("Robotics Club").await;
    let (_, participant) = ctx.participant("Asha").await;
    let event = ctx.published_event(&organizer, workshop("Arduino 101")).await;
    let registration = ctx
        .services
        .registration_service
        .register(&participant, register_for(event.id))
        .await
        .unwrap()
        .into_registration();

    Ticketed {
        organizer,
        participant,
        event_id: event.id,
        registration_id: registration.id,
        ticket_id: registration.ticket_id.expect("ticket issued"),
        ctx,
    }
}

#[tokio::test]
async fn test_scan_checks_participant_in() {
    let t = ticketed().await;

    let receipt = t.ctx.services.attendance_service.scan_ticket(&t.organizer, &t.ticket_id).await.unwrap();

    assert_eq!(receipt.registration_id, t.registration_id);
    assert_eq!(receipt.event_id, t.event_id);
    assert_eq!(receipt.participant.name, "Asha Student");

    let stored = t.ctx.services.registration_service.find_registration(t.registration_id).await.unwrap();
    assert_eq!(stored.status, RegistrationStatus::Attended);
    assert_eq!(stored.attended_at, Some(receipt.attended_at));
}

#[tokio::test]
async fn test_second_scan_reports_first_check_in() {
    let t = ticketed().await;
    let attendance = &t.ctx.services.attendance_service;

    let first = attendance.scan_ticket(&t.organizer, &t.ticket_id).await.unwrap();
    let second = attendance.scan_ticket(&t.organizer, &t.ticket_id).await;

    let attended_at = assert_matches!(second, Err(CampusEventsError::DuplicateScan { attended_at }) => attended_at);
    assert_eq!(attended_at, first.attended_at);
}

#[tokio::test]
async fn test_scan_input_validation() {
    let t = ticketed().await;
    let attendance = &t.ctx.services.attendance_service;

    assert_matches!(attendance.scan_ticket(&t.organizer, "   ").await, Err(CampusEventsError::InvalidInput(_)));
    assert_matches!(
        attendance.scan_ticket(&t.organizer, "TKT-ZZZZZZ0").await,
        Err(CampusEventsError::NotFound { .. })
    );

    let padded = format!("  {}\n", t.ticket_id);
    assert!(attendance.scan_ticket(&t.organizer, &padded).await.is_ok());
}

#[tokio::test]
async fn test_scan_requires_event_owner() {
    let t = ticketed().await;
    let (_, other) = t.ctx.organizer("Chess Club").await;

    let result = t.ctx.services.attendance_service.scan_ticket(&other, &t.ticket_id).await;
    assert_matches!(result, Err(CampusEventsError::Forbidden(_)));

    let result = t.ctx.services.attendance_service.scan_ticket(&t.participant, &t.ticket_id).await;
    assert_matches!(result, Err(CampusEventsError::Forbidden(_)));
}

#[tokio::test]
async fn test_cancelled_ticket_cannot_be_scanned() {
    let t = ticketed().await;
    t.ctx
        .services
        .settlement_service
        .cancel_registration(&t.participant, t.registration_id)
        .await
        .unwrap();

    let result = t.ctx.services.attendance_service.scan_ticket(&t.organizer, &t.ticket_id).await;
    assert_matches!(result, Err(CampusEventsError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_manual_attendance_then_scan() {
    let t = ticketed().await;
    let attendance = &t.ctx.services.attendance_service;

    let marked = attendance.mark_attended_manually(&t.organizer, t.registration_id).await.unwrap();
    assert_eq!(marked.status, RegistrationStatus::Attended);

    assert_matches!(
        attendance.mark_attended_manually(&t.organizer, t.registration_id).await,
        Err(CampusEventsError::DuplicateScan { .. })
    );
    assert_matches!(
        attendance.scan_ticket(&t.organizer, &t.ticket_id).await,
        Err(CampusEventsError::DuplicateScan { .. })
    );
}

#[tokio::test]
async fn test_dashboard_splits_confirmed_by_check_in() {
    let t = ticketed().await;
    let (_, bilal) = t.ctx.participant("Bilal").await;
    let (_, chen) = t.ctx.participant("Chen").await;
    let registrations = &t.ctx.services.registration_service;

    registrations.register(&bilal, register_for(t.event_id)).await.unwrap();
    let chen_id = registrations.register(&chen, register_for(t.event_id)).await.unwrap().registration().id;
    t.ctx.services.settlement_service.cancel_registration(&chen, chen_id).await.unwrap();
    t.ctx.services.attendance_service.scan_ticket(&t.organizer, &t.ticket_id).await.unwrap();

    let dashboard = t.ctx.services.attendance_service.dashboard(&t.organizer, t.event_id).await.unwrap();

    assert_eq!(dashboard.total, 2);
    assert_eq!(dashboard.attended_count, 1);
    assert_eq!(dashboard.not_attended_count, 1);
    assert_eq!(dashboard.attended[0].registration_id, t.registration_id);
    assert_eq!(dashboard.not_attended[0].participant.name, "Bilal Student");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_scans_admit_once() {
    let t = ticketed().await;

    let handles = (0..10).map(|_| {
        let attendance = t.ctx.services.attendance_service.clone();
        let organizer = t.organizer;
        let ticket_id = t.ticket_id.clone();
        tokio::spawn(async move { attendance.scan_ticket(&organizer, &ticket_id).await })
    });
    let results: Vec<_> = join_all(handles).await.into_iter().map(|r| r.unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, CampusEventsError::DuplicateScan { .. })));
}
