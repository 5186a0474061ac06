//! Client tests against a real server bound to an ephemeral port.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use linkshelf_api::auth::jwt::JwtConfig;
use linkshelf_api::config::ServerConfig;
use linkshelf_api::router::build_app_router;
use linkshelf_api::state::AppState;
use linkshelf_client::api::ApiClient;
use linkshelf_client::controller::Controller;
use linkshelf_client::error::ClientError;
use linkshelf_client::models::{BookmarkInput, CategoryInput};
use linkshelf_client::prefs::LocalPrefs;
use linkshelf_client::state::{DeleteTarget, Modal};
use sqlx::PgPool;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn spawn_server(pool: PgPool) -> String {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: String::new(),
        database_max_connections: 5,
        static_dir: None,
        jwt: JwtConfig {
            secret: "client-test-secret".to_string(),
            expiry_mins: 60,
        },
    };
    let app = build_app_router(AppState {
        pool,
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn prefs_path(dir: &TempDir) -> PathBuf {
    dir.path().join("prefs.json")
}

/// Register and log in `alice`, returning a ready controller.
async fn logged_in(base_url: &str, dir: &TempDir) -> Controller {
    let mut controller = Controller::new(base_url, prefs_path(dir)).unwrap();
    controller
        .register("alice", "alice@test.com", "password123")
        .await
        .unwrap();
    controller.login("alice@test.com", "password123").await.unwrap();
    controller
}

async fn add_category(controller: &mut Controller, name: &str, parent_id: Option<i64>) -> i64 {
    controller.open_new_category(parent_id);
    controller
        .save_category(CategoryInput {
            name: name.to_string(),
            parent_id,
        })
        .await
        .unwrap();
    controller
        .state()
        .dataset
        .categories
        .iter()
        .find(|c| c.name == name)
        .expect("new category should be in the reloaded dataset")
        .id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn full_bookmark_workflow(pool: PgPool) {
    let base_url = spawn_server(pool).await;
    let dir = TempDir::new().unwrap();
    let mut controller = logged_in(&base_url, &dir).await;

    assert_eq!(
        controller.state().session.user.as_ref().map(|u| u.username.as_str()),
        Some("alice")
    );
    let saved = LocalPrefs::load(&prefs_path(&dir)).unwrap();
    assert!(saved.token.is_some());

    let dev = add_category(&mut controller, "Dev", None).await;
    let frontend = add_category(&mut controller, "Frontend", Some(dev)).await;

    controller.select_category(Some(frontend)).await.unwrap();
    controller.open_new_bookmark();
    assert_eq!(
        controller.state().ui.modal,
        Modal::BookmarkForm {
            editing: None,
            preselected_category_id: Some(frontend),
        }
    );
    controller
        .save_bookmark(BookmarkInput {
            url: "https://react.dev".into(),
            title: "React Docs".into(),
            notes: None,
            category_id: Some(frontend),
        })
        .await
        .unwrap();
    assert_eq!(controller.state().ui.modal, Modal::None);
    assert_eq!(controller.state().dataset.bookmarks.len(), 1);
    assert_eq!(
        controller.state().dataset.category_path(frontend),
        vec!["Dev", "Frontend"]
    );

    // Exact category filter: nothing is filed directly under Dev.
    controller.select_category(Some(dev)).await.unwrap();
    assert!(controller.state().dataset.bookmarks.is_empty());
    controller.select_category(None).await.unwrap();

    // Debounced search.
    let t0 = Instant::now();
    controller.type_search("rea", t0);
    controller.type_search("react", t0 + Duration::from_millis(100));
    assert!(!controller.tick(t0 + Duration::from_millis(300)).await.unwrap());
    assert!(controller.tick(t0 + Duration::from_millis(400)).await.unwrap());
    assert_eq!(controller.state().dataset.bookmarks[0].title, "React Docs");

    controller.type_search("zzz", t0 + Duration::from_millis(500));
    assert!(controller.tick(t0 + Duration::from_millis(800)).await.unwrap());
    assert!(controller.state().dataset.bookmarks.is_empty());
    controller.type_search("", t0 + Duration::from_millis(900));
    controller.tick(t0 + Duration::from_millis(1200)).await.unwrap();

    // Cascading delete from the confirm dialog.
    controller.open_confirm_delete(DeleteTarget::Category {
        id: dev,
        name: "Dev".into(),
    });
    controller.confirm_delete().await.unwrap();
    assert!(controller.state().dataset.categories.is_empty());
    assert!(controller.state().dataset.bookmarks.is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn stale_refresh_is_discarded(pool: PgPool) {
    let base_url = spawn_server(pool).await;
    let dir = TempDir::new().unwrap();
    let mut controller = logged_in(&base_url, &dir).await;

    let older = controller.prepare_refresh().unwrap();
    let newer = controller.prepare_refresh().unwrap();

    let older_result = older.run().await;
    controller
        .api()
        .create_bookmark(&BookmarkInput {
            url: "https://late.test".into(),
            title: "Late".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let newer_result = newer.run().await;

    assert!(controller.finish_refresh(newer_result).unwrap());
    assert!(!controller.finish_refresh(older_result).unwrap());
    assert_eq!(controller.state().dataset.bookmarks.len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_refresh_forces_logout(pool: PgPool) {
    let base_url = spawn_server(pool).await;
    let dir = TempDir::new().unwrap();
    let prefs = LocalPrefs {
        token: Some("not-a-valid-token".into()),
        ..Default::default()
    };
    prefs.save(&prefs_path(&dir)).unwrap();

    let mut controller = Controller::new(&base_url, prefs_path(&dir)).unwrap();
    assert!(controller.state().session.is_authenticated());

    let err = controller.refresh().await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(!controller.state().session.is_authenticated());
    assert_eq!(controller.api().token(), None);
    assert_eq!(LocalPrefs::load(&prefs_path(&dir)).unwrap().token, None);
    assert_matches!(controller.refresh().await, Err(ClientError::NotAuthenticated));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_form_keeps_modal_open_with_message(pool: PgPool) {
    let base_url = spawn_server(pool).await;
    let dir = TempDir::new().unwrap();
    let mut controller = logged_in(&base_url, &dir).await;

    controller.open_new_bookmark();
    let err = controller
        .save_bookmark(BookmarkInput {
            url: "https://a.test".into(),
            title: "  ".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_matches!(err, ClientError::Api { status: 400, .. });
    assert_eq!(
        controller.state().ui.form_error.as_deref(),
        Some("URL and title are required")
    );
    assert_matches!(controller.state().ui.modal, Modal::BookmarkForm { .. });
    assert!(controller.state().session.is_authenticated());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_delete_raises_alert(pool: PgPool) {
    let base_url = spawn_server(pool).await;
    let dir = TempDir::new().unwrap();
    let mut controller = logged_in(&base_url, &dir).await;
    let dev = add_category(&mut controller, "Dev", None).await;

    // Someone else (another tab) removes it first.
    let mut other = ApiClient::new(&base_url);
    other.set_token(controller.api().token().map(str::to_string));
    other.delete_category(dev).await.unwrap();

    controller.open_confirm_delete(DeleteTarget::Category {
        id: dev,
        name: "Dev".into(),
    });
    let err = controller.confirm_delete().await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(controller.state().ui.modal, Modal::None);
    assert_eq!(
        controller.state().ui.alert.as_deref(),
        Some(format!("Delete failed: Category with id {dev} not found").as_str())
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_duplicate_surfaces_conflict(pool: PgPool) {
    let base_url = spawn_server(pool).await;
    let dir = TempDir::new().unwrap();
    let mut controller = logged_in(&base_url, &dir).await;

    let err = controller
        .register("alice", "other@test.com", "pw")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
}
