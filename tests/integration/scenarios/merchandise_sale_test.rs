//! Merchandise sale scenarios

use assert_matches::assert_matches;

use crate::helpers::*;
use CampusEvents::{
    database::store::RegistrationStore,
    models::{Caller, PaymentStatus, RegistrationStatus},
    CampusEventsError,
};

/// Stock on hand plus every approved, uncancelled order must equal the opening stock
async fn assert_stock_conserved(ctx: &TestContext, event_id: i64, opening: i32) {
    let event = ctx.services.event_service.find_event(event_id).await.unwrap();
    let held: i32 = ctx
        .store
        .list_for_event(event_id)
        .await
        .unwrap()
        .iter()
        .filter(|r| r.payment_status == Some(PaymentStatus::Approved) && r.status != RegistrationStatus::Cancelled)
        .map(|r| r.quantity)
        .sum();

    let on_hand = event.quantity.unwrap();
    assert!(on_hand >= 0);
    assert_eq!(on_hand + held, opening);
}

#[tokio::test]
async fn test_purchase_limit_then_pending_then_approval() {
    let ctx = TestContext::new();
    let (_, organizer) = ctx.organizer("Robotics Club").await;
    let (_, buyer) = ctx.participant("Asha").await;
    let event = ctx.published_event(&organizer, merchandise("Club Tee", 5, 3)).await;
    let registrations = &ctx.services.registration_service;

    assert_matches!(
        registrations.register(&buyer, order(event.id, 4)).await,
        Err(CampusEventsError::PurchaseLimitExceeded { requested: 4, limit: 3 })
    );

    let placed = registrations.register(&buyer, order(event.id, 3)).await.unwrap().into_registration();
    assert_eq!(placed.status, RegistrationStatus::Pending);
    assert_eq!(ctx.services.event_service.find_event(event.id).await.unwrap().quantity, Some(5));

    ctx.services.settlement_service.approve_payment(&organizer, placed.id).await.unwrap();
    assert_eq!(ctx.services.event_service.find_event(event.id).await.unwrap().quantity, Some(2));
}

#[tokio::test]
async fn test_stock_is_conserved_through_a_sale() {
    let ctx = TestContext::new();
    let (_, organizer) = ctx.organizer("Robotics Club").await;
    let event = ctx.published_event(&organizer, merchandise("Club Hoodie", 8, 3)).await;
    let registrations = &ctx.services.registration_service;
    let settlement = &ctx.services.settlement_service;

    let buyers: Vec<Caller> = (0..5).map(|n| Caller::participant(3_000 + n)).collect();
    let quantities = [3, 2, 3, 1, 2];
    let mut orders = Vec::new();
    for (buyer, quantity) in buyers.iter().zip(quantities) {
        let placed = registrations.register(buyer, order(event.id, quantity)).await.unwrap();
        orders.push(placed.registration().id);
    }
    assert_stock_conserved(&ctx, event.id, 8).await;

    settlement.approve_payment(&organizer, orders[0]).await.unwrap();
    settlement.approve_payment(&organizer, orders[1]).await.unwrap();
    assert_stock_conserved(&ctx, event.id, 8).await;

    // 3 left, order 2 wants 3 and order 4 wants 2
    settlement.reject_payment(&organizer, orders[3]).await.unwrap();
    settlement.approve_payment(&organizer, orders[2]).await.unwrap();
    assert_matches!(
        settlement.approve_payment(&organizer, orders[4]).await,
        Err(CampusEventsError::OutOfStock { .. })
    );
    assert_stock_conserved(&ctx, event.id, 8).await;

    settlement.cancel_registration(&buyers[1], orders[1]).await.unwrap();
    settlement.approve_payment(&organizer, orders[4]).await.unwrap();
    assert_stock_conserved(&ctx, event.id, 8).await;
    assert_eq!(ctx.services.event_service.find_event(event.id).await.unwrap().quantity, Some(0));
}

#[tokio::test]
async fn test_rejected_order_can_be_resubmitted_and_approved() {
    let ctx = TestContext::new();
    let (_, organizer) = ctx.organizer("Robotics Club").await;
    let (_, buyer) = ctx.participant("Asha").await;
    let event = ctx.published_event(&organizer, merchandise("Club Cap", 4, 2)).await;

    let placed = ctx.services.registration_service.register(&buyer, order(event.id, 2)).await.unwrap().into_registration();
    ctx.services.settlement_service.reject_payment(&organizer, placed.id).await.unwrap();
    ctx.services
        .registration_service
        .upload_payment_proof(&buyer, placed.id, "bank-transfer-7781".to_string())
        .await
        .unwrap();

    let approved = ctx.services.settlement_service.approve_payment(&organizer, placed.id).await.unwrap();
    assert_eq!(approved.status, RegistrationStatus::Confirmed);
    assert_eq!(approved.payment_proof.as_deref(), Some("bank-transfer-7781"));
    assert_eq!(ctx.services.event_service.find_event(event.id).await.unwrap().quantity, Some(2));
}
