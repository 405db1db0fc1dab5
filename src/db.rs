use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::debug;

pub async fn init_db(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

/// Creates the attendance table, and adds `section` to databases that
/// predate it.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            barcode TEXT NOT NULL,
            name TEXT,
            section TEXT,
            class TEXT,
            date TEXT NOT NULL,
            in_time TEXT,
            out_time TEXT,
            status TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    let section_columns: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('attendance') WHERE name = 'section'",
    )
    .fetch_one(pool)
    .await?;

    if section_columns == 0 {
        debug!("Adding section column to attendance table");
        sqlx::query("ALTER TABLE attendance ADD COLUMN section TEXT")
            .execute(pool)
            .await?;
    }

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_attendance_barcode_status ON attendance (barcode, status)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Single-connection in-memory pool; every connection to `sqlite::memory:`
/// is its own database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    migrate(&pool).await.expect("migrate");
    pool
}
