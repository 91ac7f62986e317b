//! Event lifecycle tests

mod helpers;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use helpers::*;

use CampusEvents::{
    database::store::UserStore,
    models::{Caller, EventKind, EventStatus, FieldType, PublishedEventFilter, UpdateEventRequest},
    CampusEventsError,
};

#[tokio::test]
async fn test_create_event_starts_as_draft() {
    let ctx = TestContext::new();
    let (organizer, caller) = ctx.organizer("Robotics Club").await;

    let event = ctx.services.event_service.create_event(&caller, workshop("Arduino 101")).await.unwrap();

    assert_eq!(event.status, EventStatus::Draft);
    assert_eq!(event.organizer_id, organizer.id);
    assert_eq!(event.purchase_limit, 1);
}

#[tokio::test]
async fn test_create_event_validation() {
    let ctx = TestContext::new();
    let (_, caller) = ctx.organizer("Robotics Club").await;
    let events = &ctx.services.event_service;

    let mut nameless = workshop("x");
    nameless.name = "   ".to_string();
    assert_matches!(events.create_event(&caller, nameless).await, Err(CampusEventsError::InvalidInput(_)));

    let mut late_deadline = workshop("Late");
    late_deadline.registration_deadline = Some(days_from_now(8));
    assert_matches!(events.create_event(&caller, late_deadline).await, Err(CampusEventsError::InvalidInput(_)));

    let mut no_stock = merchandise("Hoodie", 10, 2);
    no_stock.quantity = None;
    assert_matches!(events.create_event(&caller, no_stock).await, Err(CampusEventsError::InvalidInput(_)));

    let participant = Caller::participant(99);
    assert_matches!(events.create_event(&participant, workshop("Nope")).await, Err(CampusEventsError::Forbidden(_)));
}

#[tokio::test]
async fn test_disabled_organizer_cannot_create_events() {
    let ctx = TestContext::new();
    let (organizer, caller) = ctx.organizer("Drama Society").await;
    ctx.store.set_disabled(organizer.id, true).await.unwrap();

    let result = ctx.services.event_service.create_event(&caller, workshop("Improv Night")).await;
    assert_matches!(result, Err(CampusEventsError::Forbidden(_)));
}

#[tokio::test]
async fn test_draft_visible_only_to_owner_and_admin() {
    let ctx = TestContext::new();
    let (_, owner) = ctx.organizer("Robotics Club").await;
    let (_, other) = ctx.organizer("Chess Club").await;
    let (_, admin) = ctx.admin().await;
    let (_, student) = ctx.participant("Asha").await;

    let event = ctx.services.event_service.create_event(&owner, workshop("Arduino 101")).await.unwrap();
    let events = &ctx.services.event_service;

    assert!(events.get_event(&owner, event.id).await.is_ok());
    assert!(events.get_event(&admin, event.id).await.is_ok());
    assert_matches!(events.get_event(&other, event.id).await, Err(CampusEventsError::NotFound { .. }));
    assert_matches!(events.get_event(&student, event.id).await, Err(CampusEventsError::NotFound { .. }));
}

#[tokio::test]
async fn test_publish_only_from_draft() {
    let ctx = TestContext::new();
    let (_, caller) = ctx.organizer("Robotics Club").await;

    let event = ctx.published_event(&caller, workshop("Arduino 101")).await;
    assert_eq!(event.status, EventStatus::Published);

    let again = ctx.services.event_service.publish_event(&caller, event.id).await;
    assert_matches!(again, Err(CampusEventsError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_publish_requires_ownership() {
    let ctx = TestContext::new();
    let (_, owner) = ctx.organizer("Robotics Club").await;
    let (_, other) = ctx.organizer("Chess Club").await;

    let event = ctx.services.event_service.create_event(&owner, workshop("Arduino 101")).await.unwrap();
    let result = ctx.services.event_service.publish_event(&other, event.id).await;
    assert_matches!(result, Err(CampusEventsError::Forbidden(_)));
}

#[tokio::test]
async fn test_published_update_applies_allowed_fields_only() {
    let ctx = TestContext::new();
    let (_, caller) = ctx.organizer("Robotics Club").await;
    let event = ctx.published_event(&caller, workshop_with_limit("Arduino 101", 30)).await;

    let updated = ctx
        .services
        .event_service
        .update_event(
            &caller,
            event.id,
            UpdateEventRequest {
                name: Some("Renamed".to_string()),
                description: Some("Bring a laptop".to_string()),
                registration_limit: Some(40),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Arduino 101");
    assert_eq!(updated.description.as_deref(), Some("Bring a laptop"));
    assert_eq!(updated.registration_limit, Some(40));
    assert_eq!(updated.status, EventStatus::Published);
}

#[tokio::test]
async fn test_published_update_never_shrinks_limit_or_deadline() {
    let ctx = TestContext::new();
    let (_, caller) = ctx.organizer("Robotics Club").await;
    let event = ctx.published_event(&caller, workshop_with_limit("Arduino 101", 30)).await;

    let updated = ctx
        .services
        .event_service
        .update_event(
            &caller,
            event.id,
            UpdateEventRequest {
                description: Some("Updated".to_string()),
                registration_limit: Some(10),
                registration_deadline: Some(days_from_now(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.registration_limit, Some(30));
    assert_eq!(updated.registration_deadline, event.registration_deadline);
}

#[tokio::test]
async fn test_published_update_with_nothing_allowed_is_rejected() {
    let ctx = TestContext::new();
    let (_, caller) = ctx.organizer("Robotics Club").await;
    let event = ctx.published_event(&caller, workshop("Arduino 101")).await;

    let result = ctx
        .services
        .event_service
        .update_event(&caller, event.id, UpdateEventRequest { name: Some("Renamed".to_string()), ..Default::default() })
        .await;
    assert_matches!(result, Err(CampusEventsError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_published_event_can_be_closed_early() {
    let ctx = TestContext::new();
    let (_, caller) = ctx.organizer("Robotics Club").await;
    let event = ctx.published_event(&caller, workshop("Arduino 101")).await;

    let closed = ctx
        .services
        .event_service
        .update_event(&caller, event.id, UpdateEventRequest { status: Some(EventStatus::Closed), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(closed.status, EventStatus::Closed);
}

#[tokio::test]
async fn test_ongoing_event_accepts_status_only() {
    let ctx = TestContext::new();
    let (_, caller) = ctx.organizer("Robotics Club").await;
    let event = ctx.published_event(&caller, workshop("Arduino 101")).await;
    ctx.overwrite_event(event.id, |e| {
        e.registration_deadline = Some(Utc::now() - Duration::hours(2));
        e.event_start = Some(Utc::now() - Duration::hours(1));
        e.event_end = Some(Utc::now() + Duration::hours(2));
        e.status = EventStatus::Ongoing;
    })
    .await;

    let events = &ctx.services.event_service;
    let with_field = events
        .update_event(
            &caller,
            event.id,
            UpdateEventRequest {
                description: Some("late edit".to_string()),
                status: Some(EventStatus::Closed),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(with_field, Err(CampusEventsError::InvalidTransition(_)));

    let back_to_draft = events
        .update_event(&caller, event.id, UpdateEventRequest { status: Some(EventStatus::Draft), ..Default::default() })
        .await;
    assert_matches!(back_to_draft, Err(CampusEventsError::InvalidTransition(_)));

    let closed = events
        .update_event(&caller, event.id, UpdateEventRequest { status: Some(EventStatus::Closed), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(closed.status, EventStatus::Closed);
}

#[tokio::test]
async fn test_draft_form_locked_once_registrations_exist() {
    let ctx = TestContext::new();
    let (_, organizer) = ctx.organizer("Robotics Club").await;
    let (_, student) = ctx.participant("Asha").await;

    let event = ctx.services.event_service.create_event(&organizer, workshop("Arduino 101")).await.unwrap();
    ctx.services.registration_service.register(&student, register_for(event.id)).await.unwrap();
    assert_eq!(event.status, EventStatus::Draft);

    let updated = ctx
        .services
        .event_service
        .update_event(
            &organizer,
            event.id,
            UpdateEventRequest {
                name: Some("Arduino 102".to_string()),
                form: Some(vec![form_field("Roll number", FieldType::Text, true, &[], 1)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Arduino 102");
    assert!(updated.form.is_empty());
}

#[tokio::test]
async fn test_reads_promote_status_by_time() {
    let ctx = TestContext::new();
    let (_, caller) = ctx.organizer("Robotics Club").await;
    let started = ctx.published_event(&caller, workshop("Started")).await;
    let finished = ctx.published_event(&caller, workshop("Finished")).await;

    ctx.overwrite_event(started.id, |e| {
        e.registration_deadline = Some(Utc::now() - Duration::hours(2));
        e.event_start = Some(Utc::now() - Duration::hours(1));
    })
    .await;
    ctx.overwrite_event(finished.id, |e| {
        e.registration_deadline = Some(Utc::now() - Duration::days(3));
        e.event_start = Some(Utc::now() - Duration::days(2));
        e.event_end = Some(Utc::now() - Duration::days(1));
    })
    .await;

    let events = &ctx.services.event_service;
    let started = events.get_event(&caller, started.id).await.unwrap();
    let finished = events.get_event(&caller, finished.id).await.unwrap();
    assert_eq!(started.event.status, EventStatus::Ongoing);
    assert_eq!(finished.event.status, EventStatus::Closed);

    // Promotion is persisted
    assert_eq!(events.find_event(started.event.id).await.unwrap().status, EventStatus::Ongoing);
}

#[tokio::test]
async fn test_list_published_filters() {
    let ctx = TestContext::new();
    let (robotics, robotics_caller) = ctx.organizer("Robotics Club").await;
    let (_, chess_caller) = ctx.organizer("Chess Club").await;

    ctx.published_event(&robotics_caller, workshop("Arduino 101")).await;
    ctx.published_event(&robotics_caller, merchandise("Club Tee", 20, 2)).await;
    ctx.published_event(&chess_caller, workshop("Blitz Night")).await;
    ctx.services.event_service.create_event(&chess_caller, workshop("Unpublished")).await.unwrap();

    let events = &ctx.services.event_service;
    let all = events.list_published(&PublishedEventFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let merch = events
        .list_published(&PublishedEventFilter { kind: Some(EventKind::Merchandise), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(merch.len(), 1);
    assert_eq!(merch[0].name, "Club Tee");

    let by_robotics = events
        .list_published(&PublishedEventFilter { organizer_ids: Some(vec![robotics.id]), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(by_robotics.len(), 2);
    assert!(by_robotics.iter().all(|e| e.organizer_id == robotics.id));
}

#[tokio::test]
async fn test_get_event_sorts_form_and_counts_registrations() {
    let ctx = TestContext::new();
    let (_, organizer) = ctx.organizer("Robotics Club").await;
    let (_, student) = ctx.participant("Asha").await;

    let mut request = workshop("Arduino 101");
    request.form = vec![
        form_field("Second", FieldType::Text, false, &[], 2),
        form_field("First", FieldType::Text, false, &[], 1),
    ];
    let event = ctx.published_event(&organizer, request).await;
    ctx.services.registration_service.register(&student, register_for(event.id)).await.unwrap();

    let details = ctx.services.event_service.get_event(&student, event.id).await.unwrap();
    assert_eq!(details.registration_count, 1);
    assert_eq!(details.event.form[0].label, "First");
}

#[tokio::test]
async fn test_delete_event_keeps_registrations() {
    let ctx = TestContext::new();
    let (_, organizer) = ctx.organizer("Robotics Club").await;
    let (_, student) = ctx.participant("Asha").await;

    let event = ctx.published_event(&organizer, workshop("Arduino 101")).await;
    ctx.services.registration_service.register(&student, register_for(event.id)).await.unwrap();
    ctx.services.event_service.delete_event(&organizer, event.id).await.unwrap();

    let history = ctx.services.registration_service.history(&student).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].event.deleted);
    assert_eq!(history[0].event.name, "Deleted Event");
}
