//! Behaviour of the authenticated pipeline around credential renewal.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use bookverse_application::{ApiError, Attempt, RenewalError, SessionEvent, TransportError};
use bookverse_domain::{ApiRequest, Route};
use common::{Harness, MockBackend, Reply, settle_until};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::Value;

fn books() -> ApiRequest {
    ApiRequest::get("/book/all")
}

#[tokio::test]
async fn test_valid_token_is_attached_and_not_renewed() {
    let harness = Harness::new(MockBackend::new()).signed_in("A1", "R1");
    harness.backend.accept("A1");

    let data: Value = harness.client.get_data(&books()).await.unwrap();

    assert_eq!(data["path"], "/book/all");
    assert_eq!(harness.backend.renewal_calls(), 0);
    assert_eq!(harness.backend.requests()[0].bearer_token(), Some("A1"));
}

#[tokio::test]
async fn test_anonymous_request_carries_no_authorization() {
    let harness = Harness::new(MockBackend::new());
    harness
        .backend
        .public_route("GET /book/all", 200, serde_json::json!({"data": []}));

    let books: Vec<Value> = harness.client.get_data(&books()).await.unwrap();

    assert!(books.is_empty());
    assert_eq!(harness.backend.requests()[0].bearer_token(), None);
}

#[tokio::test]
async fn test_renewal_keeps_refresh_token_and_replays_with_new_access_token() {
    let harness = Harness::new(MockBackend::new()).signed_in("A1", "R1");
    harness.backend.accept("A0");
    harness.backend.script_renewal(Reply::tokens("A2", None));

    let _: Value = harness.client.get_data(&books()).await.unwrap();

    let tokens = harness.client.tokens();
    assert_eq!(tokens.access_token().as_deref(), Some("A2"));
    assert_eq!(tokens.refresh_token().as_deref(), Some("R1"));

    let requests = harness.backend.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].bearer_token(), Some("A1"));
    assert_eq!(requests[1].path, "/auth/refresh");
    assert_eq!(
        requests[1].body,
        bookverse_domain::ApiBody::Json(serde_json::json!({"refreshToken": "R1"}))
    );
    assert_eq!(requests[2].bearer_token(), Some("A2"));

    // Later requests use the renewed token straight away.
    let _: Value = harness.client.get_data(&books()).await.unwrap();
    assert_eq!(harness.backend.requests()[3].bearer_token(), Some("A2"));
    assert_eq!(harness.backend.renewal_calls(), 1);
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() {
    let harness = Harness::new(MockBackend::new()).signed_in("A1", "R1");
    harness.backend.script_renewal(Reply::tokens("A2", Some("R2")));

    harness.client.execute(&books()).await.unwrap();

    assert_eq!(harness.client.tokens().refresh_token().as_deref(), Some("R2"));
}

#[tokio::test]
async fn test_concurrent_failures_share_one_renewal() {
    let harness = Harness::new(MockBackend::gated()).signed_in("A1", "R1");
    harness.backend.script_renewal(Reply::tokens("A2", None));

    let mut handles = Vec::new();
    for _ in 0..5 {
        let client = harness.client.clone();
        handles.push(tokio::spawn(async move {
            client.get_data::<Value>(&books()).await
        }));
    }

    let coordinator = harness.client.coordinator().clone();
    settle_until(|| coordinator.pending() == 4).await;
    assert!(coordinator.is_refreshing());
    harness.backend.open_gate();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(harness.backend.renewal_calls(), 1);
    assert_eq!(coordinator.exchanges(), 1);
    assert!(!coordinator.is_refreshing());
    assert_eq!(coordinator.pending(), 0);

    let replays = harness
        .backend
        .requests()
        .iter()
        .filter(|r| r.bearer_token() == Some("A2"))
        .count();
    assert_eq!(replays, 5);
}

#[tokio::test]
async fn test_waiters_are_resolved_in_arrival_order() {
    let harness = Harness::new(MockBackend::gated()).signed_in("A1", "R1");
    harness.backend.script_renewal(Reply::tokens("A2", None));
    let coordinator = harness.client.coordinator().clone();
    let order = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for id in 0..4 {
        let task_coordinator = coordinator.clone();
        let task_order = order.clone();
        handles.push(tokio::spawn(async move {
            let token = task_coordinator.renew().await.unwrap();
            task_order.lock().push(id);
            token
        }));
        settle_until(|| coordinator.is_refreshing() && coordinator.pending() == id).await;
    }

    harness.backend.open_gate();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), "A2");
    }
    assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_replay_is_never_renewed_again() {
    let harness = Harness::new(MockBackend::new()).signed_in("A1", "R1");
    harness.backend.freeze();
    harness.backend.script_renewal(Reply::tokens("A2", None));
    harness.backend.script_renewal(Reply::tokens("A3", None));

    let dispatch = harness.client.send(&books()).await.unwrap();
    assert!(dispatch.response.is_unauthorized());
    assert_eq!(dispatch.attempt, Attempt::Replay);
    assert!(matches!(dispatch.success(), Err(ApiError::Unauthorized)));

    let requests = harness.backend.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].bearer_token(), Some("A2"));
    assert_eq!(harness.backend.renewal_calls(), 1);
    assert_eq!(harness.client.coordinator().exchanges(), 1);
}

#[tokio::test]
async fn test_missing_refresh_token_fails_without_network_call() {
    let harness = Harness::new(MockBackend::new()).access_only("A1");
    let mut events = harness.client.lifecycle().subscribe();
    harness.client.lifecycle().navigated(Route::Books);

    let err = harness.client.execute(&books()).await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::SessionExpired(RenewalError::NoRefreshToken)
    ));
    assert_eq!(harness.backend.renewal_calls(), 0);
    assert_eq!(harness.client.tokens().access_token(), None);
    assert!(harness.storage.is_empty());
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::SignInRequired { .. }
    ));
    assert_eq!(harness.client.lifecycle().current_route(), Route::SignIn);
}

#[tokio::test]
async fn test_anonymous_unauthorized_request_requires_sign_in() {
    let harness = Harness::new(MockBackend::new());
    let mut events = harness.client.lifecycle().subscribe();
    harness.client.lifecycle().navigated(Route::Books);

    let err = harness
        .client
        .execute(&ApiRequest::get("/orders/all"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::SessionExpired(RenewalError::NoRefreshToken)
    ));
    assert!(err.requires_sign_in());
    let requests = harness.backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].bearer_token(), None);
    assert_eq!(harness.backend.renewal_calls(), 0);
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::SignInRequired { .. }
    ));
    assert_eq!(harness.client.lifecycle().current_route(), Route::SignIn);
}

#[tokio::test]
async fn test_late_failure_replays_with_token_renewed_meanwhile() {
    let harness = Harness::new(MockBackend::new()).signed_in("A1", "R1");
    harness.backend.script_renewal(Reply::tokens("A2", None));
    harness.backend.hold("/orders/all");

    let slow = {
        let client = harness.client.clone();
        tokio::spawn(async move { client.execute(&ApiRequest::get("/orders/all")).await })
    };
    let backend = harness.backend.clone();
    settle_until(|| backend.count("/orders/all") == 1).await;

    // Renews to A2 while the slow request is still out with A1.
    harness.client.execute(&books()).await.unwrap();
    assert_eq!(harness.client.tokens().access_token().as_deref(), Some("A2"));
    harness.backend.release("/orders/all");

    slow.await.unwrap().unwrap();
    let orders: Vec<ApiRequest> = harness
        .backend
        .requests()
        .into_iter()
        .filter(|r| r.path == "/orders/all")
        .collect();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].bearer_token(), Some("A1"));
    assert_eq!(orders[1].bearer_token(), Some("A2"));
    assert_eq!(harness.backend.renewal_calls(), 1);
    assert_eq!(harness.client.coordinator().exchanges(), 1);
}

#[tokio::test]
async fn test_rejected_renewal_clears_session() {
    let harness = Harness::new(MockBackend::new()).signed_in("A1", "R1");
    harness.backend.script_renewal(Reply::Respond(bookverse_domain::ApiResponse::json(
        403,
        &serde_json::json!({"message": "Refresh token expired"}),
    )));

    let err = harness.client.execute(&books()).await.unwrap_err();

    match err {
        ApiError::SessionExpired(RenewalError::Rejected { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Refresh token expired");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(harness.client.tokens().session().is_none());
}

#[tokio::test]
async fn test_renewal_without_access_token_fails() {
    let harness = Harness::new(MockBackend::new()).signed_in("A1", "R1");
    harness.backend.script_renewal(Reply::Respond(bookverse_domain::ApiResponse::json(
        200,
        &serde_json::json!({"data": {"refreshToken": "R2"}}),
    )));

    let err = harness.client.execute(&books()).await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::SessionExpired(RenewalError::MissingAccessToken)
    ));
    assert_eq!(harness.client.tokens().refresh_token(), None);
}

#[tokio::test]
async fn test_network_failure_rejects_every_waiter() {
    let harness = Harness::new(MockBackend::gated()).signed_in("A1", "R1");
    harness.backend.script_renewal(Reply::Fail(TransportError::ConnectionFailed(
        "connection reset".to_string(),
    )));
    let mut events = harness.client.lifecycle().subscribe();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let client = harness.client.clone();
        handles.push(tokio::spawn(async move { client.execute(&books()).await }));
    }
    let coordinator = harness.client.coordinator().clone();
    settle_until(|| coordinator.pending() == 3).await;
    harness.backend.open_gate();

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            ApiError::SessionExpired(RenewalError::Transport(TransportError::ConnectionFailed(_)))
        ));
    }
    assert!(harness.storage.is_empty());
    assert_eq!(harness.backend.renewal_calls(), 1);
    assert!(!coordinator.is_refreshing());

    // One sign-in signal for the whole batch.
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::SignInRequired { .. }
    ));
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_hung_renewal_times_out() {
    let harness = Harness::with_timeout(MockBackend::new(), Duration::from_secs(15))
        .signed_in("A1", "R1");
    harness.backend.script_renewal(Reply::Hang);

    let err = harness.client.execute(&books()).await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::SessionExpired(RenewalError::TimedOut { timeout_ms: 15_000 })
    ));
    assert!(harness.client.tokens().session().is_none());
    assert!(!harness.client.coordinator().is_refreshing());
}

#[tokio::test]
async fn test_dropped_initiator_releases_waiters() {
    let harness = Harness::new(MockBackend::gated()).signed_in("A1", "R1");
    let coordinator = harness.client.coordinator().clone();

    let initiator = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.renew().await })
    };
    settle_until(|| coordinator.is_refreshing()).await;
    let waiter = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.renew().await })
    };
    settle_until(|| coordinator.pending() == 1).await;

    initiator.abort();
    assert!(initiator.await.unwrap_err().is_cancelled());

    assert_eq!(waiter.await.unwrap(), Err(RenewalError::Abandoned));
    assert!(!coordinator.is_refreshing());
    // Nothing was decided about the session.
    assert_eq!(harness.client.tokens().refresh_token().as_deref(), Some("R1"));
}

#[tokio::test]
async fn test_sign_in_signal_is_idempotent() {
    let harness = Harness::new(MockBackend::new()).access_only("A1");
    let mut events = harness.client.lifecycle().subscribe();
    harness.client.lifecycle().navigated(Route::Cart);

    harness.client.execute(&books()).await.unwrap_err();
    let harness = harness.access_only("A9");
    harness.client.execute(&books()).await.unwrap_err();

    assert!(events.try_recv().is_ok());
    assert!(events.try_recv().is_err());
    assert_eq!(harness.backend.renewal_calls(), 0);
}
