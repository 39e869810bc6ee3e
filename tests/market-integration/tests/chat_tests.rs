use std::time::Duration;

use tokio::time::timeout;

use market_integration::harness::TestHarness;
use plaza_client::{ConversationEvent, SendError};
use plaza_common::message::UNTITLED_LISTING;

const EVENT_WAIT: Duration = Duration::from_secs(2);

async fn expect_event(
    handle: &mut plaza_client::ConversationHandle,
    what: &str,
) -> ConversationEvent {
    timeout(EVENT_WAIT, handle.next_event())
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {what}"))
        .unwrap_or_else(|| panic!("conversation closed waiting for {what}"))
}

#[tokio::test]
async fn buyer_sees_history_then_live_messages() {
    let h = TestHarness::setup();
    let id = h.emma.list_item("Desk Lamp", "Home Goods", "25", &[]).await;

    h.alice
        .client
        .send_message(&id, &h.emma.email, "Is this available?")
        .await
        .unwrap();

    let mut convo = h.alice.client.open_conversation(&id);
    match expect_event(&mut convo, "history").await {
        ConversationEvent::History(history) => {
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].body, "Is this available?");
        }
        other => panic!("expected history, got {other:?}"),
    }

    h.alice
        .client
        .send_message(&id, &h.emma.email, "Could you do $20?")
        .await
        .unwrap();

    match expect_event(&mut convo, "live echo").await {
        ConversationEvent::MessageAppended(msg) => {
            assert_eq!(msg.body, "Could you do $20?");
            assert_eq!(msg.buyer_email, h.alice.email);
        }
        other => panic!("expected appended message, got {other:?}"),
    }

    convo.close().await;
}

#[tokio::test]
async fn two_views_of_the_same_listing_stay_in_step() {
    let h = TestHarness::setup();
    let id = h.gary.list_item("Canoe", "Sporting Goods", "300", &[]).await;

    let mut alice_view = h.alice.client.open_conversation(&id);
    let mut bob_view = h.bob.client.open_conversation(&id);
    for view in [&mut alice_view, &mut bob_view] {
        match expect_event(view, "empty history").await {
            ConversationEvent::History(history) => assert!(history.is_empty()),
            other => panic!("expected history, got {other:?}"),
        }
    }

    h.alice
        .client
        .send_message(&id, &h.gary.email, "Still for sale?")
        .await
        .unwrap();

    for (view, who) in [(&mut alice_view, "alice"), (&mut bob_view, "bob")] {
        match expect_event(view, who).await {
            ConversationEvent::MessageAppended(msg) => {
                assert_eq!(msg.body, "Still for sale?");
            }
            other => panic!("{who} expected appended message, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn messages_for_other_listings_do_not_leak_in() {
    let h = TestHarness::setup();
    let lamp = h.emma.list_item("Desk Lamp", "Home Goods", "25", &[]).await;
    let canoe = h.gary.list_item("Canoe", "Sporting Goods", "300", &[]).await;

    let mut convo = h.alice.client.open_conversation(&lamp);
    match expect_event(&mut convo, "history").await {
        ConversationEvent::History(history) => assert!(history.is_empty()),
        other => panic!("expected history, got {other:?}"),
    }

    h.bob
        .client
        .send_message(&canoe, &h.gary.email, "About the canoe")
        .await
        .unwrap();
    h.alice
        .client
        .send_message(&lamp, &h.emma.email, "About the lamp")
        .await
        .unwrap();

    match expect_event(&mut convo, "lamp message").await {
        ConversationEvent::MessageAppended(msg) => {
            assert_eq!(msg.body, "About the lamp");
            assert_eq!(msg.listing_id, lamp);
        }
        other => panic!("expected appended message, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_message_is_rejected_before_the_store() {
    let h = TestHarness::setup();
    let id = h.emma.list_item("Desk Lamp", "Home Goods", "25", &[]).await;

    let err = h
        .alice
        .client
        .send_message(&id, &h.emma.email, "  \n ")
        .await
        .unwrap_err();
    assert!(matches!(err, SendError::EmptyMessage));
    assert_eq!(h.backend.message_count(), 0);
}

#[tokio::test]
async fn send_failure_surfaces_as_store_error() {
    let h = TestHarness::setup();
    let id = h.emma.list_item("Desk Lamp", "Home Goods", "25", &[]).await;

    h.backend.fail_message_writes(true);
    let err = h
        .alice
        .client
        .send_message(&id, &h.emma.email, "hello")
        .await
        .unwrap_err();
    assert!(matches!(err, SendError::Store(_)));
    assert_eq!(h.backend.message_count(), 0);
}

#[tokio::test]
async fn failed_history_load_is_terminal() {
    let h = TestHarness::setup();
    let id = h.emma.list_item("Desk Lamp", "Home Goods", "25", &[]).await;

    h.backend.fail_reads(true);
    let mut convo = h.alice.client.open_conversation(&id);
    match expect_event(&mut convo, "load error").await {
        ConversationEvent::Error(err) => assert_eq!(err.operation, "messages_for_listing"),
        other => panic!("expected error, got {other:?}"),
    }
    assert!(convo.next_event().await.is_none());
}

#[tokio::test]
async fn reopening_after_close_replays_full_history() {
    let h = TestHarness::setup();
    let id = h.emma.list_item("Desk Lamp", "Home Goods", "25", &[]).await;

    let mut convo = h.alice.client.open_conversation(&id);
    match expect_event(&mut convo, "history").await {
        ConversationEvent::History(history) => assert!(history.is_empty()),
        other => panic!("expected history, got {other:?}"),
    }
    h.alice
        .client
        .send_message(&id, &h.emma.email, "first")
        .await
        .unwrap();
    match expect_event(&mut convo, "echo").await {
        ConversationEvent::MessageAppended(_) => {}
        other => panic!("expected appended message, got {other:?}"),
    }
    convo.close().await;

    h.alice
        .client
        .send_message(&id, &h.emma.email, "second")
        .await
        .unwrap();

    let mut reopened = h.alice.client.open_conversation(&id);
    match expect_event(&mut reopened, "replayed history").await {
        ConversationEvent::History(history) => {
            let bodies: Vec<_> = history.iter().map(|m| m.body.as_str()).collect();
            assert_eq!(bodies, vec!["first", "second"]);
        }
        other => panic!("expected history, got {other:?}"),
    }
}

#[tokio::test]
async fn conversation_list_groups_by_listing_with_titles() {
    let h = TestHarness::setup();
    let lamp = h.emma.list_item("Desk Lamp", "Home Goods", "25", &[]).await;
    let canoe = h.gary.list_item("Canoe", "Sporting Goods", "300", &[]).await;

    h.alice
        .client
        .send_message(&lamp, &h.emma.email, "Is the lamp available?")
        .await
        .unwrap();
    h.alice
        .client
        .send_message(&lamp, &h.emma.email, "Any flexibility on price?")
        .await
        .unwrap();
    h.alice
        .client
        .send_message(&canoe, &h.gary.email, "Does the canoe leak?")
        .await
        .unwrap();

    let summaries = h.alice.client.conversations().await.unwrap();
    assert_eq!(summaries.len(), 2);
    let lamp_convo = summaries
        .iter()
        .find(|s| s.listing_id == lamp)
        .expect("lamp conversation");
    assert_eq!(lamp_convo.title, "Desk Lamp");
    assert_eq!(lamp_convo.seller_email, h.emma.email);
    assert!(summaries.iter().any(|s| s.listing_id == canoe));

    // Bob never messaged anyone.
    assert!(h.bob.client.conversations().await.unwrap().is_empty());
}

#[tokio::test]
async fn conversation_about_a_vanished_listing_reads_untitled() {
    let h = TestHarness::setup();
    let ghost = plaza_common::listing::ListingId("l-0-deadbeef".into());

    h.alice
        .client
        .send_message(&ghost, &h.emma.email, "Hello?")
        .await
        .unwrap();

    let summaries = h.alice.client.conversations().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].title, UNTITLED_LISTING);
}
