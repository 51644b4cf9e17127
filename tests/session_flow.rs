//! End-to-end request flows against a scripted server.

use shopping_session::app::handler::{LOGOUT_FAILED, NO_RESPONSE, SESSION_EXPIRED, USERNAME_TAKEN};
use shopping_session::app::Method;
use shopping_session::storage::{JsonSessionStorage, MemoryStorage, Storage};
use shopping_session::transport::{HttpResponse, ScriptedTransport};
use shopping_session::{ActionTag, AppState, Credentials, Outcome, Session, ShoppingItem};

fn fresh(transport: ScriptedTransport) -> Session<ScriptedTransport> {
    Session::new(Box::new(MemoryStorage::default()), transport).unwrap()
}

fn logged_in_storage() -> MemoryStorage {
    let mut storage = MemoryStorage::default();
    storage
        .save(&AppState {
            list: vec![ShoppingItem::new("milk", 1, 1.0).with_id("m1")],
            is_logged: true,
            token: "T".to_string(),
            user: "alice".to_string(),
            ..AppState::default()
        })
        .unwrap();
    storage
}

fn logged_in(transport: ScriptedTransport) -> Session<ScriptedTransport> {
    Session::new(Box::new(logged_in_storage()), transport).unwrap()
}

#[tokio::test]
async fn login_cascades_into_list() {
    let transport = ScriptedTransport::new();
    transport.push(HttpResponse::ok(r#"{"token":"T"}"#));
    transport.push(HttpResponse::ok("[]"));
    let session = fresh(transport);

    session.login(&Credentials::new("u", "p")).await.unwrap();

    let state = session.state().unwrap();
    assert!(state.is_logged);
    assert_eq!(state.token, "T");
    assert_eq!(state.user, "u");
    assert!(state.list.is_empty());
    assert!(!state.loading);

    let sent = session.transport().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].tag, ActionTag::Login);
    assert_eq!(sent[1].tag, ActionTag::List);
    assert_eq!(sent[1].header("token"), Some("T"));
}

#[tokio::test]
async fn failed_login_keeps_optimistic_user() {
    let transport = ScriptedTransport::new();
    transport.push(HttpResponse::new(401, "Unauthorized", ""));
    let session = fresh(transport);

    session.login(&Credentials::new("u", "wrong")).await.unwrap();

    let state = session.state().unwrap();
    assert!(!state.is_logged);
    assert_eq!(state.user, "u");
    assert_eq!(state.error(), Some("Server responded with a status 401 Unauthorized"));
}

#[tokio::test]
async fn forbidden_resets_to_exact_record() {
    let expected = AppState {
        list: vec![],
        is_logged: false,
        token: String::new(),
        loading: false,
        outcome: Outcome::Failed(SESSION_EXPIRED.to_string()),
        user: String::new(),
    };

    for intent in ["list", "add", "remove", "edit", "logout", "register", "login"] {
        let transport = ScriptedTransport::new();
        transport.push(HttpResponse::new(403, "Forbidden", ""));
        let session = logged_in(transport);

        match intent {
            "list" => session.refresh().await,
            "add" => session.add(&ShoppingItem::new("tea", 1, 2.0)).await,
            "remove" => session.remove("m1").await,
            "edit" => {
                let item = ShoppingItem::new("tea", 2, 2.0).with_id("m1");
                session.edit(&item).await
            }
            "logout" => session.logout().await,
            "register" => session.register(&Credentials::new("x", "y")).await,
            _ => session.login(&Credentials::new("x", "y")).await,
        }
        .unwrap();

        assert_eq!(session.state().unwrap(), expected, "intent {intent}");
        assert_eq!(session.transport().sent().len(), 1, "403 must not cascade ({intent})");
    }
}

#[tokio::test]
async fn register_outcomes() {
    let transport = ScriptedTransport::new();
    transport.push(HttpResponse::ok(""));
    transport.push(HttpResponse::new(409, "Conflict", ""));
    transport.push(HttpResponse::new(500, "Internal Server Error", ""));
    let session = fresh(transport);
    let credentials = Credentials::new("new", "pw");

    session.register(&credentials).await.unwrap();
    let state = session.state().unwrap();
    assert_eq!(state.notice(), Some("Register success"));
    assert_eq!(state.error(), None);

    session.register(&credentials).await.unwrap();
    assert_eq!(session.state().unwrap().error(), Some(USERNAME_TAKEN));

    session.register(&credentials).await.unwrap();
    assert_eq!(
        session.state().unwrap().error(),
        Some("Server responded with a status 500 Internal Server Error")
    );
}

#[tokio::test]
async fn add_refetches_exactly_once_and_never_patches_locally() {
    let transport = ScriptedTransport::new();
    transport.push(HttpResponse::new(
        201,
        "Created",
        r#"{"_id":"echo","type":"tea","count":1,"price":2}"#,
    ));
    transport.push(HttpResponse::ok(r#"[{"_id":"m1","type":"milk","count":1,"price":1}]"#));
    let session = logged_in(transport);

    session.add(&ShoppingItem::new("tea", 1, 2.0)).await.unwrap();

    let sent = session.transport().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].tag, ActionTag::Add);
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(sent[1].tag, ActionTag::List);
    assert_eq!(sent[1].header("token"), Some("T"));

    let state = session.state().unwrap();
    assert_eq!(state.list.len(), 1);
    assert!(state.list.iter().all(|item| item.id != "echo"));
}

#[tokio::test]
async fn failed_mutation_does_not_refetch() {
    let transport = ScriptedTransport::new();
    transport.push(HttpResponse::new(404, "Not Found", ""));
    let session = logged_in(transport);

    session.remove("gone").await.unwrap();

    assert_eq!(session.transport().sent().len(), 1);
    let state = session.state().unwrap();
    assert_eq!(state.error(), Some("Server responded with a status 404 Not Found"));
    assert!(state.is_logged);
    assert_eq!(state.list.len(), 1);
}

#[tokio::test]
async fn edit_and_remove_cascade() {
    let transport = ScriptedTransport::new();
    transport.push(HttpResponse::ok(""));
    transport.push(HttpResponse::ok(r#"[{"_id":"m1","type":"milk","count":5,"price":1}]"#));
    transport.push(HttpResponse::ok(""));
    transport.push(HttpResponse::ok("[]"));
    let session = logged_in(transport);

    session
        .edit(&ShoppingItem::new("milk", 5, 1.0).with_id("m1"))
        .await
        .unwrap();
    assert!((session.state().unwrap().list[0].count - 5.0).abs() < f64::EPSILON);

    session.remove("m1").await.unwrap();
    assert!(session.state().unwrap().list.is_empty());

    let tags: Vec<_> = session.transport().sent().iter().map(|r| r.tag).collect();
    assert_eq!(tags, [ActionTag::Edit, ActionTag::List, ActionTag::Remove, ActionTag::List]);
}

#[tokio::test]
async fn logout_yields_default_on_both_paths() {
    let transport = ScriptedTransport::new();
    transport.push(HttpResponse::ok(""));
    let session = logged_in(transport);
    session.logout().await.unwrap();
    assert_eq!(session.state().unwrap(), AppState::default());

    let transport = ScriptedTransport::new();
    transport.push(HttpResponse::new(500, "Internal Server Error", ""));
    let session = logged_in(transport);
    session.logout().await.unwrap();
    assert_eq!(
        session.state().unwrap(),
        AppState::logged_out(Outcome::Failed(LOGOUT_FAILED.to_string()))
    );
}

#[tokio::test]
async fn transport_failure_is_surfaced() {
    let transport = ScriptedTransport::new();
    transport.push_failure("connection refused");
    let session = logged_in(transport);

    session.refresh().await.unwrap();

    let state = session.state().unwrap();
    assert_eq!(state.error(), Some(NO_RESPONSE));
    assert!(!state.loading);
    assert!(state.is_logged);
    assert_eq!(state.list.len(), 1);
}

#[tokio::test]
async fn session_file_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session-restart.json");

    {
        let transport = ScriptedTransport::new();
        transport.push(HttpResponse::ok(r#"{"token":"T"}"#));
        transport.push(HttpResponse::ok(r#"[{"_id":"a","type":"eggs","count":6,"price":0.3}]"#));
        let storage = JsonSessionStorage::open(path.clone()).unwrap();
        let session = Session::new(Box::new(storage), transport).unwrap();
        session.login(&Credentials::new("alice", "pw")).await.unwrap();
    }

    let storage = JsonSessionStorage::open(path).unwrap();
    let session = Session::new(Box::new(storage), ScriptedTransport::new()).unwrap();
    let state = session.state().unwrap();
    assert!(state.is_logged);
    assert_eq!(state.token, "T");
    assert_eq!(state.user, "alice");
    assert_eq!(state.list[0].item_type, "eggs");
    assert!(!state.loading);
}

#[tokio::test]
async fn sessions_are_independent() {
    let first = ScriptedTransport::new();
    first.push(HttpResponse::ok(r#"{"token":"A"}"#));
    first.push(HttpResponse::ok("[]"));
    let a = fresh(first);
    let b = fresh(ScriptedTransport::new());

    a.login(&Credentials::new("a", "pw")).await.unwrap();

    assert!(a.state().unwrap().is_logged);
    assert!(!b.state().unwrap().is_logged);
}

#[tokio::test]
async fn local_error_can_be_set_and_cleared() {
    let session = fresh(ScriptedTransport::new());

    session.set_error("Username and password must be filled").unwrap();
    assert_eq!(session.state().unwrap().error(), Some("Username and password must be filled"));

    session.set_error("").unwrap();
    assert_eq!(session.state().unwrap().message(), "");
}
