//! Shared fixtures: in-memory SQLite databases and the seeded catalog.

#![allow(dead_code)]

use std::sync::Arc;

use sea_orm::prelude::Decimal;

use generic_dal::config::Config;
use generic_dal::domain::{Article, Category};
use generic_dal::infra::{Database, DbContext, GenericRepository, Repository, Schema, UnitOfWork};

/// Single-connection pool so every query sees the same in-memory database.
pub fn sqlite_config() -> Config {
    let mut config = Config::single("sqlite::memory:");
    config.max_connections = 1;
    config.min_connections = 1;
    config
}

/// Fresh, migrated in-memory database for `schema`.
pub async fn database(schema: Schema) -> Database {
    Database::connect(&sqlite_config(), schema)
        .await
        .expect("failed to open test database")
}

pub fn context(db: &Database) -> Arc<DbContext> {
    Arc::new(DbContext::new(db.get_connection()))
}

/// Ids of the seeded catalog rows
pub struct Catalog {
    pub category_ids: Vec<i32>,
    pub article_ids: Vec<i32>,
}

pub const SEEDED_ARTICLES: usize = 27;

/// Three categories and 27 articles; exactly three are priced at 500000 or more.
pub async fn seed_catalog(context: &Arc<DbContext>) -> Catalog {
    let categories = GenericRepository::<Category>::new(Arc::clone(context));
    let articles = GenericRepository::<Article>::new(Arc::clone(context));

    let category_entries: Vec<_> = (1..=3)
        .map(|n| categories.insert(Category::new(format!("Category {}", n))))
        .collect();
    context.save_changes().await.expect("failed to seed categories");
    let category_ids: Vec<i32> = category_entries.iter().map(|e| e.id()).collect();

    let mut drafts = vec![
        Article::new(category_ids[0], "Test Article 1", "Description 1", Decimal::new(450_000, 0)),
        Article::new(category_ids[0], "Test Article 2", "Description 2", Decimal::new(500_000, 0)),
        Article::new(category_ids[1], "Test Article 3", "Description 3", Decimal::new(750_000, 0)),
        Article::new(category_ids[2], "Test Article 4", "Description 4", Decimal::new(900_000, 0)),
    ];
    for n in 1..=23i64 {
        let category = category_ids[(n as usize) % category_ids.len()];
        drafts.push(Article::new(
            category,
            format!("Article {}", n),
            format!("Generated article {}", n),
            Decimal::new(n * 100, 0),
        ));
    }

    let article_entries: Vec<_> = drafts.into_iter().map(|a| articles.insert(a)).collect();
    context.save_changes().await.expect("failed to seed articles");

    Catalog {
        category_ids,
        article_ids: article_entries.iter().map(|e| e.id()).collect(),
    }
}
