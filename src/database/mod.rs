use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

pub mod memory;
pub mod models;
pub mod repositories;
pub mod seeder;
pub mod store;
pub mod transaction;
pub mod utils;

use memory::MemoryStore;
use repositories::{NotificationRepository, UserRepository, VacationRequestRepository};
use store::{NotificationStore, RequestStore, UserStore};

pub const IN_MEMORY_DATABASE_URL: &str = "memory://";

pub async fn init_database(database_url: &str) -> Result<PgPool> {
    log::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    log::info!("Migrations completed successfully");

    Ok(pool)
}

/// The three stores the services run against, all backed by the same engine.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub requests: Arc<dyn RequestStore>,
    pub notifications: Arc<dyn NotificationStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            requests: Arc::new(VacationRequestRepository::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            requests: Arc::new(store.clone()),
            notifications: Arc::new(store),
        }
    }

    /// Connects to Postgres, or builds an in-memory store for `memory://`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        if database_url == IN_MEMORY_DATABASE_URL {
            log::warn!("Using in-memory store; data will not survive a restart");
            return Ok(Self::in_memory());
        }

        let pool = init_database(database_url).await?;
        Ok(Self::postgres(pool))
    }
}
