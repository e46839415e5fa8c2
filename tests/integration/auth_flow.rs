//! Token manager against a scripted identity provider

use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::common::fakes::{jwt_expiring_at, serve_once, ScriptedAuthClient};
use super::common::fixtures::{advance, settle};
use parking_lot::Mutex;
use replay_devtools::auth::{AuthConfig, AuthError, StaticTokenClient, TokenManager, TokenState};
use replay_devtools::comments::{
    CommentError, CommentId, CommentStore, GraphqlCommentStore, NewComment, Position,
};
use replay_devtools::protocol::{ExecutionPoint, RecordingId};

fn token_manager(client: ScriptedAuthClient) -> (Arc<TokenManager>, Arc<ScriptedAuthClient>) {
    let client = Arc::new(client);
    (TokenManager::new(client.clone(), AuthConfig::default()), client)
}

fn record_states(manager: &TokenManager) -> Arc<Mutex<Vec<TokenState>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    manager.add_listener(Arc::new(move |state: &TokenState| sink.lock().push(state.clone())));
    seen
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

#[tokio::test]
async fn test_init_delivers_token_to_listeners_and_waiters() {
    let token = jwt_expiring_at(now_secs() + 3600);
    let (manager, client) = token_manager(ScriptedAuthClient::new().silent(Ok(token.clone())));
    let seen = record_states(&manager);

    manager.init().await;

    let state = manager.get_token().await;
    assert_eq!(state.token.as_deref(), Some(token.as_str()));
    assert_eq!(state.error, None);
    assert_eq!(seen.lock().len(), 1);
    assert_eq!(client.silent_requests(), vec![false]);
    assert_eq!(manager.latest(), Some(state));
}

#[tokio::test]
async fn test_logged_out_user_gets_empty_state() {
    let (manager, client) = token_manager(ScriptedAuthClient::logged_out());
    manager.init().await;

    assert_eq!(manager.get_token().await, TokenState::default());
    assert!(client.silent_requests().is_empty());
}

#[tokio::test]
async fn test_loading_client_defers_request() {
    let client = ScriptedAuthClient::new().silent(Ok(jwt_expiring_at(now_secs() + 3600)));
    client.loading.store(true, Ordering::SeqCst);
    let (manager, client) = token_manager(client);

    manager.init().await;
    assert!(client.silent_requests().is_empty());
    assert_eq!(manager.latest(), None);

    client.loading.store(false, Ordering::SeqCst);
    manager.init().await;
    assert!(manager.get_token().await.token.is_some());
}

#[tokio::test]
async fn test_second_init_does_not_refetch() {
    let (manager, client) = token_manager(
        ScriptedAuthClient::new().silent(Ok(jwt_expiring_at(now_secs() + 3600))),
    );

    manager.init().await;
    manager.init().await;

    assert_eq!(client.silent_requests().len(), 1);
}

#[tokio::test]
async fn test_login_required_falls_back_to_popup_once() {
    let (manager, client) = token_manager(
        ScriptedAuthClient::new()
            .silent(Err(AuthError::provider("login_required", "session expired")))
            .popup(Ok(jwt_expiring_at(now_secs() + 3600))),
    );

    manager.init().await;

    assert!(manager.get_token().await.token.is_some());
    assert_eq!(client.popup_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_other_errors_are_delivered_not_thrown() {
    let (manager, client) = token_manager(
        ScriptedAuthClient::new().silent(Err(AuthError::provider("timeout", "too slow"))),
    );
    let seen = record_states(&manager);

    manager.init().await;

    let state = manager.get_token().await;
    assert_eq!(state.token, None);
    assert_eq!(state.error.as_ref().and_then(|e| e.code()), Some("timeout"));
    assert_eq!(client.popup_calls.load(Ordering::SeqCst), 0);
    assert_eq!(seen.lock().as_slice(), &[state]);
}

#[tokio::test(start_paused = true)]
async fn test_token_renewed_before_expiry() {
    let (manager, client) = token_manager(
        ScriptedAuthClient::new()
            .silent(Ok(jwt_expiring_at(now_secs() + 120)))
            .silent(Ok(jwt_expiring_at(now_secs() + 3600))),
    );
    let seen = record_states(&manager);

    manager.init().await;
    assert_eq!(client.silent_requests(), vec![false]);

    // Default margin is 60 s before `exp`
    advance(61_000).await;
    settle().await;

    assert_eq!(client.silent_requests(), vec![false, true]);
    assert_eq!(seen.lock().len(), 2);
}

#[tokio::test]
async fn test_reset_moves_waiters_to_next_request() {
    let first = jwt_expiring_at(now_secs() + 3600);
    let second = jwt_expiring_at(now_secs() + 7200);
    let (manager, _client) = token_manager(
        ScriptedAuthClient::new()
            .silent(Ok(first.clone()))
            .silent(Ok(second.clone())),
    );

    manager.init().await;
    assert_eq!(manager.get_token().await.token.as_deref(), Some(first.as_str()));

    manager.reset();
    let waiter = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.get_token().await })
    };
    settle().await;
    assert!(!waiter.is_finished());

    manager.init().await;
    let state = waiter.await.unwrap();
    assert_eq!(state.token.as_deref(), Some(second.as_str()));
}

#[tokio::test]
async fn test_dispose_releases_waiters() {
    let (manager, _client) = token_manager(ScriptedAuthClient::new());
    let waiter = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.get_token().await })
    };
    settle().await;

    manager.dispose();

    let state = waiter.await.unwrap();
    assert_eq!(state.error, Some(AuthError::Disposed));
    assert_eq!(manager.get_token().await.error, Some(AuthError::Disposed));
}

#[tokio::test]
async fn test_static_client_without_token_is_logged_out() {
    let manager = TokenManager::new(
        Arc::new(StaticTokenClient::new(Some("   ".to_string()))),
        AuthConfig::default(),
    );
    manager.init().await;
    assert_eq!(manager.get_token().await, TokenState::default());
}

#[tokio::test]
async fn test_graphql_store_refuses_without_token() {
    let manager = TokenManager::new(
        Arc::new(StaticTokenClient::new(None)),
        AuthConfig::default(),
    );
    manager.init().await;
    // Fails before any request is sent
    let store = GraphqlCommentStore::new("http://127.0.0.1:9/graphql", manager);

    let result = store
        .add_comment(NewComment {
            content: "hi".to_string(),
            recording_id: RecordingId::new("rec"),
            time: 0.0,
            point: ExecutionPoint::new("p0"),
            has_frames: false,
            parent_id: None,
            position: Position::default(),
        })
        .await;

    assert!(matches!(result, Err(CommentError::Unauthenticated)));
}

async fn logged_in(token: &str) -> Arc<TokenManager> {
    let manager = TokenManager::new(
        Arc::new(StaticTokenClient::new(Some(token.to_string()))),
        AuthConfig::default(),
    );
    manager.init().await;
    manager
}

fn reply(parent: &str) -> NewComment {
    NewComment {
        content: "looks off".to_string(),
        recording_id: RecordingId::new("rec-1"),
        time: 420.0,
        point: ExecutionPoint::new("p420"),
        has_frames: true,
        parent_id: Some(CommentId::new(parent)),
        position: Position { x: 12.0, y: 34.0 },
    }
}

#[tokio::test]
async fn test_graphql_store_posts_mutation_with_bearer_token() {
    let (url, request) =
        serve_once(200, r#"{"data":{"insert_comments_one":{"id":"c-42"}}}"#).await;
    let store = GraphqlCommentStore::new(url, logged_in("secret-token").await);

    let id = store.add_comment(reply("c-1")).await.unwrap();
    assert_eq!(id, CommentId::new("c-42"));

    let request = request.await.unwrap();
    assert!(request.head.starts_with("POST /graphql "));
    assert_eq!(request.header("authorization"), Some("Bearer secret-token"));
    assert!(request.body["query"]
        .as_str()
        .unwrap()
        .contains("insert_comments_one"));
    assert_eq!(
        request.body["variables"]["object"],
        serde_json::json!({
            "content": "looks off",
            "recording_id": "rec-1",
            "time": 420.0,
            "point": "p420",
            "has_frames": true,
            "parent_id": "c-1",
            "position": { "x": 12.0, "y": 34.0 },
        })
    );
}

#[tokio::test]
async fn test_graphql_store_reports_http_status() {
    let (url, request) = serve_once(503, "upstream down").await;
    let store = GraphqlCommentStore::new(url, logged_in("secret-token").await);

    let result = store.add_comment(reply("c-1")).await;
    match result {
        Err(CommentError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream down");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
    request.await.unwrap();
}
