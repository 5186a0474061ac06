//! Repository tests against a real Postgres database.
//!
//! Cover owner scoping, exact category filtering, title-only search and the
//! transactional subtree delete.

use assert_matches::assert_matches;
use linkshelf_core::error::CoreError;
use linkshelf_core::types::DbId;
use linkshelf_db::models::bookmark::{Bookmark, BookmarkFilter, CreateBookmark, UpdateBookmark};
use linkshelf_db::models::category::{
    Category, CategoryUpdate, CreateCategory, DeletedSubtree, UpdateCategory,
};
use linkshelf_db::models::user::CreateUser;
use linkshelf_db::repositories::{BookmarkRepo, CategoryRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, username: &str) -> DbId {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: "not-a-real-hash".to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
        .id
}

async fn create_category(
    pool: &PgPool,
    owner_id: DbId,
    name: &str,
    parent_id: Option<DbId>,
) -> Category {
    let input = CreateCategory {
        owner_id,
        name: name.to_string(),
        parent_id,
    };
    CategoryRepo::create(pool, &input)
        .await
        .expect("category creation should succeed")
}

async fn create_bookmark(
    pool: &PgPool,
    owner_id: DbId,
    title: &str,
    url: &str,
    category_id: Option<DbId>,
) -> Bookmark {
    let input = CreateBookmark {
        owner_id,
        url: url.to_string(),
        title: title.to_string(),
        notes: None,
        category_id,
    };
    BookmarkRepo::create(pool, &input)
        .await
        .expect("bookmark creation should succeed")
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_email_is_detected(pool: PgPool) {
    create_user(&pool, "alice").await;

    assert!(UserRepo::username_or_email_taken(&pool, "someone", "alice@test.com")
        .await
        .unwrap());
    assert!(UserRepo::username_or_email_taken(&pool, "alice", "other@test.com")
        .await
        .unwrap());
    assert!(!UserRepo::username_or_email_taken(&pool, "bob", "bob@test.com")
        .await
        .unwrap());
}

// ---------------------------------------------------------------------------
// Bookmarks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn category_filter_is_exact_and_not_recursive(pool: PgPool) {
    let owner = create_user(&pool, "alice").await;
    let dev = create_category(&pool, owner, "Dev", None).await;
    let frontend = create_category(&pool, owner, "Frontend", Some(dev.id)).await;

    let top = create_bookmark(&pool, owner, "Rust Book", "https://doc.rust-lang.org", Some(dev.id)).await;
    create_bookmark(&pool, owner, "React Docs", "https://react.dev", Some(frontend.id)).await;

    let filter = BookmarkFilter {
        category_id: Some(dev.id),
        ..Default::default()
    };
    let listed = BookmarkRepo::list_for_owner(&pool, owner, &filter).await.unwrap();

    assert_eq!(listed, vec![top]);
}

#[sqlx::test(migrations = "./migrations")]
async fn search_matches_title_only_case_insensitively(pool: PgPool) {
    let owner = create_user(&pool, "alice").await;
    let docs = create_bookmark(&pool, owner, "Documentation", "https://example.com", None).await;
    create_bookmark(&pool, owner, "Homepage", "https://docs.example.com", None).await;

    let filter = BookmarkFilter {
        title_pattern: Some("%doc%".to_string()),
        ..Default::default()
    };
    let listed = BookmarkRepo::list_for_owner(&pool, owner, &filter).await.unwrap();

    assert_eq!(listed, vec![docs]);
}

#[sqlx::test(migrations = "./migrations")]
async fn list_is_newest_first(pool: PgPool) {
    let owner = create_user(&pool, "alice").await;
    let first = create_bookmark(&pool, owner, "First", "https://one.test", None).await;
    let second = create_bookmark(&pool, owner, "Second", "https://two.test", None).await;

    let listed = BookmarkRepo::list_for_owner(&pool, owner, &BookmarkFilter::default())
        .await
        .unwrap();
    let ids: Vec<DbId> = listed.iter().map(|b| b.id).collect();

    assert_eq!(ids, vec![second.id, first.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn other_owners_rows_are_invisible(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let mallory = create_user(&pool, "mallory").await;
    let bookmark = create_bookmark(&pool, alice, "Private", "https://private.test", None).await;

    assert!(BookmarkRepo::find_for_owner(&pool, mallory, bookmark.id)
        .await
        .unwrap()
        .is_none());

    let update = UpdateBookmark {
        url: "https://evil.test".to_string(),
        title: "Hijacked".to_string(),
        notes: None,
        category_id: None,
    };
    assert!(BookmarkRepo::update(&pool, mallory, bookmark.id, &update)
        .await
        .unwrap()
        .is_none());
    assert!(!BookmarkRepo::delete(&pool, mallory, bookmark.id).await.unwrap());

    let still_there = BookmarkRepo::find_for_owner(&pool, alice, bookmark.id)
        .await
        .unwrap();
    assert_eq!(still_there, Some(bookmark));
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn update_replaces_name_and_parent(pool: PgPool) {
    let owner = create_user(&pool, "alice").await;
    let dev = create_category(&pool, owner, "Dev", None).await;
    let web = create_category(&pool, owner, "Web", Some(dev.id)).await;

    let update = UpdateCategory {
        name: "Web Dev".to_string(),
        parent_id: None,
    };
    let outcome = CategoryRepo::update(&pool, owner, web.id, &update).await.unwrap();

    assert_matches!(outcome, CategoryUpdate::Updated(updated) => {
        assert_eq!(updated.name, "Web Dev");
        assert_eq!(updated.parent_id, None);
    });
}

#[sqlx::test(migrations = "./migrations")]
async fn update_into_own_subtree_is_rejected_without_writing(pool: PgPool) {
    let owner = create_user(&pool, "alice").await;
    let dev = create_category(&pool, owner, "Dev", None).await;
    let web = create_category(&pool, owner, "Web", Some(dev.id)).await;

    let update = UpdateCategory {
        name: "Renamed".to_string(),
        parent_id: Some(web.id),
    };
    let outcome = CategoryRepo::update(&pool, owner, dev.id, &update).await.unwrap();

    assert_matches!(outcome, CategoryUpdate::Rejected(CoreError::Validation(_)));
    let stored = CategoryRepo::find_for_owner(&pool, owner, dev.id)
        .await
        .unwrap()
        .expect("category should still exist");
    assert_eq!(stored, dev);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_of_foreign_category_is_not_found(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let mallory = create_user(&pool, "mallory").await;
    let dev = create_category(&pool, alice, "Dev", None).await;

    let update = UpdateCategory {
        name: "Mine".to_string(),
        parent_id: None,
    };
    let outcome = CategoryRepo::update(&pool, mallory, dev.id, &update).await.unwrap();

    assert_matches!(outcome, CategoryUpdate::NotFound);
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_subtree_removes_descendants_and_their_bookmarks(pool: PgPool) {
    let owner = create_user(&pool, "alice").await;
    let root = create_category(&pool, owner, "Root", None).await;
    let child = create_category(&pool, owner, "Child", Some(root.id)).await;
    let grandchild = create_category(&pool, owner, "Grandchild", Some(child.id)).await;
    let sibling = create_category(&pool, owner, "Sibling", None).await;

    create_bookmark(&pool, owner, "Under child", "https://c.test", Some(child.id)).await;
    create_bookmark(&pool, owner, "Under grandchild", "https://g.test", Some(grandchild.id)).await;
    let kept = create_bookmark(&pool, owner, "Elsewhere", "https://s.test", Some(sibling.id)).await;

    let deleted = CategoryRepo::delete_subtree(&pool, owner, root.id)
        .await
        .unwrap()
        .expect("root should exist");

    assert_eq!(
        deleted,
        DeletedSubtree {
            categories: 3,
            bookmarks: 2
        }
    );
    let remaining = CategoryRepo::list_for_owner(&pool, owner).await.unwrap();
    assert_eq!(remaining, vec![sibling]);
    let bookmarks = BookmarkRepo::list_for_owner(&pool, owner, &BookmarkFilter::default())
        .await
        .unwrap();
    assert_eq!(bookmarks, vec![kept]);
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_subtree_of_foreign_category_changes_nothing(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let mallory = create_user(&pool, "mallory").await;
    let root = create_category(&pool, alice, "Root", None).await;
    create_bookmark(&pool, alice, "Kept", "https://k.test", Some(root.id)).await;

    let result = CategoryRepo::delete_subtree(&pool, mallory, root.id).await.unwrap();

    assert_eq!(result, None);
    assert_eq!(count(&pool, "categories").await, 1);
    assert_eq!(count(&pool, "bookmarks").await, 1);
}
