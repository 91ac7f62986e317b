//! Registration rule scenarios

use assert_matches::assert_matches;

use crate::helpers::*;
use CampusEvents::{
    models::{Caller, EventStatus, FieldType, UpdateEventRequest},
    CampusEventsError,
};

#[tokio::test]
async fn test_third_registration_hits_capacity() {
    let ctx = TestContext::new();
    let (_, organizer) = ctx.organizer("Robotics Club").await;
    let event = ctx.published_event(&organizer, workshop_with_limit("Arduino 101", 2)).await;
    let registrations = &ctx.services.registration_service;

    registrations.register(&Caller::participant(501), register_for(event.id)).await.unwrap();
    registrations.register(&Caller::participant(502), register_for(event.id)).await.unwrap();
    assert_matches!(
        registrations.register(&Caller::participant(503), register_for(event.id)).await,
        Err(CampusEventsError::CapacityReached)
    );
}

#[tokio::test]
async fn test_deadline_wins_over_capacity_and_stock() {
    let ctx = TestContext::new();
    let (_, organizer) = ctx.organizer("Robotics Club").await;
    let full = ctx.published_event(&organizer, workshop_with_limit("Full Talk", 1)).await;
    let sold_out = ctx.published_event(&organizer, merchandise("Sold Out Tee", 0, 1)).await;
    let registrations = &ctx.services.registration_service;

    registrations.register(&Caller::participant(601), register_for(full.id)).await.unwrap();
    ctx.expire_deadline(full.id).await;
    ctx.expire_deadline(sold_out.id).await;

    assert_matches!(
        registrations.register(&Caller::participant(602), register_for(full.id)).await,
        Err(CampusEventsError::DeadlinePassed)
    );
    assert_matches!(
        registrations.register(&Caller::participant(602), order(sold_out.id, 1)).await,
        Err(CampusEventsError::DeadlinePassed)
    );
}

#[tokio::test]
async fn test_form_edit_applies_until_first_registration() {
    let ctx = TestContext::new();
    let (_, organizer) = ctx.organizer("Robotics Club").await;
    let event = ctx.services.event_service.create_event(&organizer, workshop("Arduino 101")).await.unwrap();
    let edit = |label: &str| UpdateEventRequest {
        form: Some(vec![form_field(label, FieldType::Text, false, &[], 1)]),
        ..Default::default()
    };

    let updated = ctx.services.event_service.update_event(&organizer, event.id, edit("Roll number")).await.unwrap();
    assert_eq!(updated.form[0].label, "Roll number");

    ctx.services
        .registration_service
        .register(&Caller::participant(701), register_for(event.id))
        .await
        .unwrap();

    ctx.services.event_service.update_event(&organizer, event.id, edit("Department")).await.unwrap();
    let read_back = ctx.services.event_service.get_event(&organizer, event.id).await.unwrap();
    assert_eq!(read_back.event.status, EventStatus::Draft);
    assert_eq!(read_back.registration_count, 1);
    assert_eq!(read_back.event.form.len(), 1);
    assert_eq!(read_back.event.form[0].label, "Roll number");
}

#[tokio::test]
async fn test_cancelled_participant_cannot_register_again() {
    let ctx = TestContext::new();
    let (_, organizer) = ctx.organizer("Robotics Club").await;
    let (_, student) = ctx.participant("Asha").await;
    let event = ctx.published_event(&organizer, workshop("Arduino 101")).await;
    let registrations = &ctx.services.registration_service;

    let id = registrations.register(&student, register_for(event.id)).await.unwrap().registration().id;
    ctx.services.settlement_service.cancel_registration(&student, id).await.unwrap();

    assert_matches!(
        registrations.register(&student, register_for(event.id)).await,
        Err(CampusEventsError::AlreadyRegistered)
    );
}

#[tokio::test]
async fn test_closed_event_only_changes_status() {
    let ctx = TestContext::new();
    let (_, organizer) = ctx.organizer("Robotics Club").await;
    let event = ctx.published_event(&organizer, workshop("Arduino 101")).await;
    let events = &ctx.services.event_service;
    events
        .update_event(&organizer, event.id, UpdateEventRequest { status: Some(EventStatus::Closed), ..Default::default() })
        .await
        .unwrap();

    assert_matches!(
        events
            .update_event(&organizer, event.id, UpdateEventRequest { name: Some("New".to_string()), ..Default::default() })
            .await,
        Err(CampusEventsError::InvalidTransition(_))
    );

    let reopened = events
        .update_event(&organizer, event.id, UpdateEventRequest { status: Some(EventStatus::Ongoing), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(reopened.status, EventStatus::Ongoing);

    assert_matches!(
        ctx.services.registration_service.register(&Caller::participant(801), register_for(event.id)).await,
        Ok(_)
    );
}
