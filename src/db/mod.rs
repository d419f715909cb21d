use anyhow::Result;
use sqlx::{Pool, Sqlite, migrate::MigrateDatabase, sqlite::SqlitePoolOptions};
use std::time::Duration;

pub mod account_store;
pub mod inventory_store;
pub mod product_store;
pub mod request_store;

pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool
pub async fn init_db_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    // Create the database if it doesn't exist
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        tracing::info!(%database_url, "creating database");
        Sqlite::create_database(database_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    setup_database(&pool).await?;

    Ok(pool)
}

/// Set up the database schema
pub async fn setup_database(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            username TEXT PRIMARY KEY NOT NULL,
            password TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            list_of_roles TEXT NOT NULL DEFAULT '[]',
            is_verified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            last_login TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS product_details (
            productid TEXT PRIMARY KEY NOT NULL,
            category TEXT NOT NULL,
            setsubcategory TEXT NOT NULL,
            source TEXT NOT NULL,
            productnameen TEXT NOT NULL,
            productnamezh TEXT NOT NULL,
            specification TEXT NOT NULL,
            unit TEXT NOT NULL,
            components TEXT NOT NULL DEFAULT '[]',
            is_sold_independently INTEGER NOT NULL DEFAULT 1,
            remarks_temperature TEXT,
            storage_temperature_duration TEXT,
            reorderlevel INTEGER NOT NULL,
            targetstocklevel INTEGER NOT NULL,
            leadtime INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS product_inventory (
            batchid_internal TEXT PRIMARY KEY NOT NULL,
            batchid_external TEXT NOT NULL,
            productid TEXT NOT NULL,
            basicmediumid TEXT NOT NULL,
            addictiveid TEXT NOT NULL,
            quantityinstock INTEGER NOT NULL,
            productiondate TEXT NOT NULL,
            imageurl TEXT,
            status TEXT NOT NULL,
            productiondatetime TEXT NOT NULL,
            producedby TEXT NOT NULL,
            coa_appearance TEXT,
            coa_clarity INTEGER,
            coa_osmoticpressure REAL,
            coa_ph REAL,
            coa_mycoplasma INTEGER,
            coa_sterility INTEGER,
            coa_fillingvolumedifference INTEGER,
            to_show INTEGER NOT NULL DEFAULT 1,
            lastupdated TEXT NOT NULL,
            lastupdatedby TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_product_inventory_productid ON product_inventory (productid);",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS request_details (
            requestid TEXT PRIMARY KEY NOT NULL,
            requestorname TEXT NOT NULL,
            requestdate TEXT NOT NULL,
            requestproductid TEXT NOT NULL,
            requestunit INTEGER NOT NULL,
            is_urgent INTEGER NOT NULL DEFAULT 0,
            remarks TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL,
            fullfillername TEXT,
            fullfilldate TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_request_details_requestorname ON request_details (requestorname);",
    )
    .execute(pool)
    .await?;

    Ok(())
}
