//! Optimistic concurrency: two sessions editing the same rows.

mod common;

use std::sync::Arc;

use sea_orm::prelude::Decimal;

use generic_dal::domain::{Article, Category};
use generic_dal::errors::AppError;
use generic_dal::infra::{
    ConflictPolicy, Database, DbContext, GenericRepository, Repository, Schema, UnitOfWork,
};

use common::{context, database, seed_catalog};

/// Two sessions over the same database, plus the id of a seeded article.
async fn two_sessions(db: &Database) -> (Arc<DbContext>, Arc<DbContext>, i32) {
    let seeding = context(db);
    let catalog = seed_catalog(&seeding).await;
    (context(db), context(db), catalog.article_ids[0])
}

/// Load `id` in the second session and commit a price change there.
async fn change_elsewhere(other: &Arc<DbContext>, id: i32, price: i64) -> Article {
    let repo = GenericRepository::<Article>::new(Arc::clone(other));
    let mut article = repo.get_by_id(id).await.unwrap().unwrap();
    article.price = Decimal::new(price, 0);
    let entry = repo.update(article);
    assert_eq!(other.save_changes().await.unwrap(), 1);
    entry.current()
}

#[tokio::test]
async fn test_stale_update_without_policy_conflicts() {
    let db = database(Schema::CoreBusiness).await;
    let (mine, other, id) = two_sessions(&db).await;
    let repo = GenericRepository::<Article>::new(Arc::clone(&mine));

    let mut article = repo.get_by_id(id).await.unwrap().unwrap();
    change_elsewhere(&other, id, 1).await;

    article.title = "Renamed".to_string();
    repo.update(article);
    let err = mine.save_changes().await.unwrap_err();

    assert!(matches!(err, AppError::ConcurrencyConflict { id: conflicted, .. } if conflicted == id));
    assert!(mine.has_changes());

    mine.discard_changes();
    let stored = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Test Article 1");
    assert_eq!(stored.price, Decimal::new(1, 0));
}

#[tokio::test]
async fn test_client_wins_overwrites_stored_row() {
    let db = database(Schema::CoreBusiness).await;
    let (mine, other, id) = two_sessions(&db).await;
    let repo = GenericRepository::<Article>::new(Arc::clone(&mine));

    let mut article = repo.get_by_id(id).await.unwrap().unwrap();
    let theirs = change_elsewhere(&other, id, 1).await;

    article.price = Decimal::new(2, 0);
    let entry = repo.update(article);
    let saved = mine
        .save_changes_with(ConflictPolicy::ClientWins)
        .await
        .unwrap();

    assert_eq!(saved, 1);
    assert!(!mine.has_changes());
    let stored = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.price, Decimal::new(2, 0));
    assert_eq!(stored.row_version, entry.row_version());
    assert_ne!(stored.row_version, theirs.row_version);
}

#[tokio::test]
async fn test_database_wins_keeps_stored_row() {
    let db = database(Schema::CoreBusiness).await;
    let (mine, other, id) = two_sessions(&db).await;
    let repo = GenericRepository::<Article>::new(Arc::clone(&mine));

    let mut article = repo.get_by_id(id).await.unwrap().unwrap();
    let theirs = change_elsewhere(&other, id, 1).await;

    article.price = Decimal::new(2, 0);
    let entry = repo.update(article);
    let saved = mine
        .save_changes_with(ConflictPolicy::DatabaseWins)
        .await
        .unwrap();

    assert_eq!(saved, 0);
    assert!(!mine.has_changes());

    // The caller's copy now mirrors the stored row
    let refreshed = entry.current();
    assert_eq!(refreshed.price, Decimal::new(1, 0));
    assert_eq!(refreshed.row_version, theirs.row_version);

    let stored = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.price, Decimal::new(1, 0));
}

#[tokio::test]
async fn test_database_wins_on_deleted_row_discards_change() {
    let db = database(Schema::CoreBusiness).await;
    let (mine, other, id) = two_sessions(&db).await;
    let repo = GenericRepository::<Article>::new(Arc::clone(&mine));
    let elsewhere = GenericRepository::<Article>::new(Arc::clone(&other));

    let mut article = repo.get_by_id(id).await.unwrap().unwrap();
    elsewhere.delete_by_id(id).await.unwrap();
    other.save_changes().await.unwrap();

    article.title = "Too late".to_string();
    repo.update(article);

    assert_eq!(
        mine.save_changes_with(ConflictPolicy::DatabaseWins).await.unwrap(),
        0
    );
    assert!(!mine.has_changes());
    assert!(repo.get_by_id(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_client_wins_on_deleted_row_conflicts() {
    let db = database(Schema::CoreBusiness).await;
    let (mine, other, id) = two_sessions(&db).await;
    let repo = GenericRepository::<Article>::new(Arc::clone(&mine));
    let elsewhere = GenericRepository::<Article>::new(Arc::clone(&other));

    let mut article = repo.get_by_id(id).await.unwrap().unwrap();
    elsewhere.delete_by_id(id).await.unwrap();
    other.save_changes().await.unwrap();

    article.title = "Too late".to_string();
    repo.update(article);
    let err = mine
        .save_changes_with(ConflictPolicy::ClientWins)
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert!(mine.has_changes());
    mine.discard_changes();
}

#[tokio::test]
async fn test_stale_delete_conflicts() {
    let db = database(Schema::CoreBusiness).await;
    let (mine, other, id) = two_sessions(&db).await;
    let repo = GenericRepository::<Article>::new(Arc::clone(&mine));

    let article = repo.get_by_id(id).await.unwrap().unwrap();
    change_elsewhere(&other, id, 1).await;

    repo.delete(article);
    let err = mine.save_changes().await.unwrap_err();

    assert!(err.is_conflict());
    mine.discard_changes();
    assert!(repo.get_by_id(id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_conflict_rolls_back_whole_save() {
    let db = database(Schema::CoreBusiness).await;
    let (mine, other, id) = two_sessions(&db).await;
    let categories = GenericRepository::<Category>::new(Arc::clone(&mine));
    let articles = GenericRepository::<Article>::new(Arc::clone(&mine));

    let mut article = articles.get_by_id(id).await.unwrap().unwrap();
    change_elsewhere(&other, id, 1).await;

    let added = categories.insert(Category::new("Category 4"));
    article.title = "Renamed".to_string();
    articles.update(article);

    assert!(mine.save_changes().await.unwrap_err().is_conflict());
    assert_eq!(mine.pending_count(), 2);
    assert_eq!(added.id(), 0);
    mine.discard_changes();

    let stored = categories
        .get(generic_dal::infra::Query::new())
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn test_updating_a_row_twice_in_one_session() {
    let db = database(Schema::CoreBusiness).await;
    let (mine, _other, id) = two_sessions(&db).await;
    let repo = GenericRepository::<Article>::new(Arc::clone(&mine));

    let mut article = repo.get_by_id(id).await.unwrap().unwrap();
    let read_version = article.row_version.clone();
    article.title = "First edit".to_string();
    repo.update(article.clone());
    article.price = Decimal::new(3, 0);
    let entry = repo.update(article);

    assert_eq!(mine.pending_count(), 1);
    assert_eq!(
        mine.save_changes_with(ConflictPolicy::ClientWins).await.unwrap(),
        1
    );

    let stored = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.title, "First edit");
    assert_eq!(stored.price, Decimal::new(3, 0));
    assert_eq!(stored.row_version, entry.row_version());
    assert_ne!(stored.row_version, read_version);
}

#[tokio::test]
async fn test_updating_a_pending_insert() {
    let db = database(Schema::CoreBusiness).await;
    let ctx = context(&db);
    let catalog = seed_catalog(&ctx).await;
    let repo = GenericRepository::<Article>::new(Arc::clone(&ctx));

    let entry = repo.insert(Article::new(
        catalog.category_ids[0],
        "Draft",
        "",
        Decimal::new(10, 0),
    ));
    let mut draft = entry.current();
    draft.title = "Published".to_string();
    repo.update(draft);

    assert_eq!(ctx.save_changes().await.unwrap(), 1);
    let stored = repo.get_by_id(entry.id()).await.unwrap().unwrap();
    assert_eq!(stored.title, "Published");
}

#[tokio::test]
async fn test_deleting_a_pending_insert_writes_nothing() {
    let db = database(Schema::CoreBusiness).await;
    let ctx = context(&db);
    let repo = GenericRepository::<Category>::new(Arc::clone(&ctx));

    let entry = repo.insert(Category::new("Short lived"));
    repo.delete(entry.current());

    assert!(!ctx.has_changes());
    assert_eq!(ctx.save_changes().await.unwrap(), 0);
    assert_eq!(repo.count(generic_dal::infra::Query::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_then_delete_of_a_row() {
    let db = database(Schema::CoreBusiness).await;
    let (mine, _other, id) = two_sessions(&db).await;
    let repo = GenericRepository::<Article>::new(Arc::clone(&mine));

    let mut article = repo.get_by_id(id).await.unwrap().unwrap();
    article.title = "Renamed".to_string();
    repo.update(article.clone());
    repo.delete(article);

    assert_eq!(mine.save_changes().await.unwrap(), 1);
    assert!(repo.get_by_id(id).await.unwrap().is_none());
}
