// Table creation. Idempotent: every statement is IF NOT EXISTS.

use sqlx::SqlitePool;

pub(super) async fn create_tables(pool: &SqlitePool) -> anyhow::Result<()> {
    // Empty secrets are rejected through INSERT OR IGNORE (zero rows affected).
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS usage_record (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            secret TEXT NOT NULL CHECK (secret <> ''),
            timestamp INTEGER NOT NULL,
            os TEXT NOT NULL,
            helper_version TEXT NOT NULL,
            app_version TEXT NOT NULL,
            cpu_model TEXT NOT NULL,
            cpu_mhz INTEGER NOT NULL,
            cpu_usage INTEGER NOT NULL,
            app_cpu_usage INTEGER NOT NULL,
            mem_mb INTEGER NOT NULL,
            app_mem_mb INTEGER NOT NULL,
            app_peak_virtual_mem_mb INTEGER NOT NULL,
            mem_free_mb INTEGER NOT NULL,
            hw_accel INTEGER NOT NULL,
            ram_gib REAL NOT NULL,
            ram_channels INTEGER NOT NULL,
            ram_mhz INTEGER NOT NULL,
            camera_count INTEGER NOT NULL,
            total_megapixels REAL NOT NULL,
            total_fps REAL NOT NULL,
            total_mpps REAL NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Not UNIQUE: older databases may hold duplicate pairs; lookups take the lowest id.
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_usage_record_identity ON usage_record(secret, cpu_model)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_usage_record_timestamp ON usage_record(timestamp)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS camera (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            usage_record_id INTEGER NOT NULL REFERENCES usage_record(id),
            pixels INTEGER NOT NULL,
            fps INTEGER NOT NULL,
            limit_decode INTEGER NOT NULL,
            hw_accel INTEGER NOT NULL,
            camera_type INTEGER NOT NULL,
            capture_type INTEGER NOT NULL,
            motion_detector INTEGER NOT NULL,
            record_trigger INTEGER NOT NULL,
            record_format INTEGER NOT NULL,
            direct_to_disk INTEGER NOT NULL,
            vcodec TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_camera_usage_record ON camera(usage_record_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS gpu_info (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            usage_record_id INTEGER NOT NULL REFERENCES usage_record(id),
            name TEXT NOT NULL,
            driver_version TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_gpu_info_usage_record ON gpu_info(usage_record_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
