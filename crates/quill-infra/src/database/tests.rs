use std::collections::BTreeMap;

use sea_orm::{DatabaseBackend, MockDatabase, Value};

use quill_core::domain::{Comment, Post};
use quill_core::page::PageRequest;
use quill_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

use crate::database::entity::{comment, post, user};
use crate::database::postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
};

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    let mut row = BTreeMap::new();
    row.insert("num_items", Value::BigInt(Some(n)));
    row
}

fn post_model(title: &str) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id: uuid::Uuid::new_v4(),
        author_id: uuid::Uuid::new_v4(),
        title: title.to_owned(),
        body: "body".to_owned(),
        body_html: "<p>body</p>".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn comment_model(body: &str) -> comment::Model {
    comment::Model {
        id: uuid::Uuid::new_v4(),
        post_id: uuid::Uuid::new_v4(),
        author_id: uuid::Uuid::new_v4(),
        body: body.to_owned(),
        body_html: format!("<p>{body}</p>"),
        disabled: false,
        created_at: chrono::Utc::now().into(),
    }
}

#[tokio::test]
async fn find_post_by_id() {
    let model = post_model("Test Post");
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
}

#[tokio::test]
async fn find_user_by_email_maps_to_domain() {
    let now = chrono::Utc::now();
    let user_id = uuid::Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            id: user_id,
            email: "alice@example.com".to_owned(),
            username: "alice".to_owned(),
            password_hash: "hash".to_owned(),
            location: None,
            about_me: None,
            role: "moderator".to_owned(),
            confirmed: true,
            member_since: now.into(),
            last_seen: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user = repo.find_by_email("alice@example.com").await.unwrap().unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.role, quill_core::domain::Role::Moderator);
    assert!(user.confirmed);
}

#[tokio::test]
async fn missing_post_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(uuid::Uuid::new_v4()).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn comment_page_carries_totals() {
    // The paginator runs a COUNT first, then fetches the page.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(5)]])
        .append_query_results([vec![comment_model("first"), comment_model("second")]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);

    let page = repo
        .page_for_post(uuid::Uuid::new_v4(), PageRequest::new(1, 2))
        .await
        .unwrap();

    assert_eq!(page.total_items, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 2);
    let bodies: Vec<_> = page.items.iter().map(|c: &Comment| c.body.as_str()).collect();
    assert_eq!(bodies, vec!["first", "second"]);
}

#[tokio::test]
async fn comment_page_past_the_end_is_empty_with_intact_totals() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(5)]])
        .append_query_results([Vec::<comment::Model>::new()])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);

    let page = repo
        .page_for_post(uuid::Uuid::new_v4(), PageRequest::new(99, 2))
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.page, 99);
    assert_eq!(page.total_items, 5);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn post_page_past_the_end_is_empty_with_intact_totals() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(1)]])
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let page = repo.page_recent(PageRequest::new(4, 10)).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total_items, 1);
    assert_eq!(page.total_pages, 1);
}
