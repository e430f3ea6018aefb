// SQLite usage store. One parent row per (secret, cpu_model); cameras and GPUs are
// child rows replaced as a unit on every upload.
// Uses sqlx for async + connection pooling. All writes run in one transaction
// behind an in-process write gate, so same-key uploads never interleave.

mod error;
mod rows;
mod schema;

pub use error::StoreError;

use crate::models::{Camera, GpuInfo, UsageRecord, UsageUpload};
use sqlx::query::Query;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions,
};
use sqlx::{Sqlite, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::instrument;

/// What `upsert_usage_snapshot` did with the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// New (secret, cpu_model) pair; a parent row was created.
    Inserted(i64),
    /// Known pair; the parent was updated in place and its children replaced.
    Updated(i64),
    /// The store refused the parent row (zero rows affected). Nothing was written.
    Rejected,
}

impl UpsertOutcome {
    pub fn record_id(self) -> Option<i64> {
        match self {
            Self::Inserted(id) | Self::Updated(id) => Some(id),
            Self::Rejected => None,
        }
    }
}

pub struct UsageRepo {
    pool: SqlitePool,
    write_gate: Mutex<()>,
}

impl UsageRepo {
    /// Connect to SQLite at `path`, create parent dir and DB if missing, enable WAL + pragmas.
    pub async fn connect(
        path: &str,
        max_pool_size: u32,
        busy_timeout: Duration,
    ) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self {
            pool,
            write_gate: Mutex::new(()),
        })
    }

    /// Create tables and indexes if they don't exist.
    pub async fn init(&self) -> anyhow::Result<()> {
        schema::create_tables(&self.pool).await
    }

    /// Close the pool; waits for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ---- usage records ----

    pub async fn list_usage_records(&self) -> Result<Vec<UsageRecord>, StoreError> {
        let sql = format!("SELECT {} FROM usage_record", rows::USAGE_RECORD_COLUMNS);
        let found = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows::collect(found, rows::usage_record)
    }

    /// Most recent upload first.
    pub async fn list_usage_records_by_recency(&self) -> Result<Vec<UsageRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM usage_record ORDER BY timestamp DESC, id DESC",
            rows::USAGE_RECORD_COLUMNS
        );
        let found = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows::collect(found, rows::usage_record)
    }

    /// Records whose CPU model matches a SQL `LIKE` pattern; the caller supplies wildcards.
    #[instrument(skip(self), fields(repo = "usage", operation = "find_usage_records_by_cpu"))]
    pub async fn find_usage_records_by_cpu(
        &self,
        pattern: &str,
    ) -> Result<Vec<UsageRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM usage_record WHERE cpu_model LIKE $1",
            rows::USAGE_RECORD_COLUMNS
        );
        let found = sqlx::query(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        rows::collect(found, rows::usage_record)
    }

    pub async fn get_usage_record(&self, id: i64) -> Result<Option<UsageRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM usage_record WHERE id = $1",
            rows::USAGE_RECORD_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rows::usage_record).transpose()
    }

    // ---- cameras ----

    pub async fn list_cameras(&self) -> Result<Vec<Camera>, StoreError> {
        let sql = format!("SELECT {} FROM camera", rows::CAMERA_COLUMNS);
        let found = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows::collect(found, rows::camera)
    }

    pub async fn list_cameras_for_record(
        &self,
        usage_record_id: i64,
    ) -> Result<Vec<Camera>, StoreError> {
        let sql = format!(
            "SELECT {} FROM camera WHERE usage_record_id = $1 ORDER BY id",
            rows::CAMERA_COLUMNS
        );
        let found = sqlx::query(&sql)
            .bind(usage_record_id)
            .fetch_all(&self.pool)
            .await?;
        rows::collect(found, rows::camera)
    }

    pub async fn get_camera(&self, id: i64) -> Result<Option<Camera>, StoreError> {
        let sql = format!("SELECT {} FROM camera WHERE id = $1", rows::CAMERA_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rows::camera).transpose()
    }

    // ---- gpus ----

    pub async fn list_gpus(&self) -> Result<Vec<GpuInfo>, StoreError> {
        let sql = format!("SELECT {} FROM gpu_info", rows::GPU_COLUMNS);
        let found = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows::collect(found, rows::gpu)
    }

    pub async fn list_gpus_for_record(
        &self,
        usage_record_id: i64,
    ) -> Result<Vec<GpuInfo>, StoreError> {
        let sql = format!(
            "SELECT {} FROM gpu_info WHERE usage_record_id = $1 ORDER BY id",
            rows::GPU_COLUMNS
        );
        let found = sqlx::query(&sql)
            .bind(usage_record_id)
            .fetch_all(&self.pool)
            .await?;
        rows::collect(found, rows::gpu)
    }

    pub async fn get_gpu(&self, id: i64) -> Result<Option<GpuInfo>, StoreError> {
        let sql = format!("SELECT {} FROM gpu_info WHERE id = $1", rows::GPU_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rows::gpu).transpose()
    }

    // ---- writes ----

    /// Store `upload` as the latest snapshot for its (secret, cpu_model) pair.
    ///
    /// A known pair keeps its id: its cameras and GPUs are deleted, the parent row is
    /// updated in place and the new children are inserted. Everything happens in one
    /// transaction; on error it is rolled back and the error is returned.
    #[instrument(
        skip(self, upload),
        fields(
            repo = "usage",
            operation = "upsert_usage_snapshot",
            cameras = upload.cameras.len(),
            gpus = upload.gpus.len()
        )
    )]
    pub async fn upsert_usage_snapshot(
        &self,
        upload: &UsageUpload,
    ) -> Result<UpsertOutcome, StoreError> {
        let record = UsageRecord::from_upload(upload, chrono::Utc::now().timestamp_millis());
        let cameras: Vec<Camera> = upload.cameras.iter().map(Camera::from_upload).collect();
        let gpus: Vec<GpuInfo> = upload.gpus.iter().map(GpuInfo::from_upload).collect();

        let _write = self.write_gate.lock().await;
        let mut tx = self.pool.begin().await?;
        let result = write_snapshot(&mut *tx, record, cameras, gpus).await;
        match result {
            Ok(outcome) => {
                tx.commit().await?;
                tracing::info!(?outcome, "usage snapshot committed");
                Ok(outcome)
            }
            Err(e) => {
                rollback(tx).await;
                Err(e)
            }
        }
    }

    /// Delete a record and all of its cameras and GPUs.
    ///
    /// Returns `true` if the record existed and was removed. Errors are logged and
    /// reported as `false`; nothing is committed in that case.
    #[instrument(skip(self), fields(repo = "usage", operation = "delete_usage_record"))]
    pub async fn delete_usage_record(&self, id: i64) -> bool {
        match self.try_delete_usage_record(id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::warn!(error = %e, id, "delete_usage_record failed");
                false
            }
        }
    }

    async fn try_delete_usage_record(&self, id: i64) -> Result<bool, StoreError> {
        let _write = self.write_gate.lock().await;
        let mut tx = self.pool.begin().await?;
        let result = delete_cascade(&mut *tx, id).await;
        match result {
            Ok(deleted) => {
                tx.commit().await?;
                Ok(deleted)
            }
            Err(e) => {
                rollback(tx).await;
                Err(e)
            }
        }
    }
}

async fn rollback(tx: Transaction<'static, Sqlite>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "rollback failed");
    }
}

/// Transaction body of `upsert_usage_snapshot`.
async fn write_snapshot(
    conn: &mut SqliteConnection,
    mut record: UsageRecord,
    cameras: Vec<Camera>,
    gpus: Vec<GpuInfo>,
) -> Result<UpsertOutcome, StoreError> {
    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM usage_record WHERE secret = $1 AND cpu_model = $2 ORDER BY id LIMIT 1",
    )
    .bind(&record.secret)
    .bind(&record.cpu_model)
    .fetch_optional(&mut *conn)
    .await?;

    let outcome = match existing {
        Some(id) => {
            record.id = id;
            delete_children(conn, id).await?;
            let sql = format!("UPDATE usage_record SET {} WHERE id = $22", UPDATE_ASSIGNMENTS);
            bind_record(sqlx::query(&sql), &record)
                .bind(id)
                .execute(&mut *conn)
                .await?;
            UpsertOutcome::Updated(id)
        }
        None => {
            let sql = format!(
                "INSERT OR IGNORE INTO usage_record ({}) VALUES ({})",
                RECORD_FIELDS, RECORD_PLACEHOLDERS
            );
            let result = bind_record(sqlx::query(&sql), &record)
                .execute(&mut *conn)
                .await?;
            if result.rows_affected() == 0 {
                tracing::warn!(
                    cpu_model = %record.cpu_model,
                    "usage record rejected by store; no children written"
                );
                return Ok(UpsertOutcome::Rejected);
            }
            record.id = result.last_insert_rowid();
            UpsertOutcome::Inserted(record.id)
        }
    };

    for mut camera in cameras {
        camera.usage_record_id = record.id;
        insert_camera(conn, &camera).await?;
    }
    for mut gpu in gpus {
        gpu.usage_record_id = record.id;
        insert_gpu(conn, &gpu).await?;
    }
    tracing::debug!(usage_record_id = record.id, "children inserted");
    Ok(outcome)
}

/// Transaction body of `delete_usage_record`. Children go first so foreign keys hold.
async fn delete_cascade(conn: &mut SqliteConnection, id: i64) -> Result<bool, StoreError> {
    delete_children(conn, id).await?;
    let result = sqlx::query("DELETE FROM usage_record WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

async fn delete_children(conn: &mut SqliteConnection, id: i64) -> Result<(), StoreError> {
    let cameras = sqlx::query("DELETE FROM camera WHERE usage_record_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    let gpus = sqlx::query("DELETE FROM gpu_info WHERE usage_record_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    tracing::debug!(usage_record_id = id, cameras, gpus, "children deleted");
    Ok(())
}

const RECORD_FIELDS: &str = "secret, timestamp, os, helper_version, app_version, cpu_model, cpu_mhz, cpu_usage, app_cpu_usage, mem_mb, app_mem_mb, app_peak_virtual_mem_mb, mem_free_mb, hw_accel, ram_gib, ram_channels, ram_mhz, camera_count, total_megapixels, total_fps, total_mpps";

const RECORD_PLACEHOLDERS: &str =
    "$1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21";

const UPDATE_ASSIGNMENTS: &str = "secret = $1, timestamp = $2, os = $3, helper_version = $4, app_version = $5, cpu_model = $6, cpu_mhz = $7, cpu_usage = $8, app_cpu_usage = $9, mem_mb = $10, app_mem_mb = $11, app_peak_virtual_mem_mb = $12, mem_free_mb = $13, hw_accel = $14, ram_gib = $15, ram_channels = $16, ram_mhz = $17, camera_count = $18, total_megapixels = $19, total_fps = $20, total_mpps = $21";

/// Binds $1..$21 in `RECORD_FIELDS` order.
fn bind_record<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    r: &'q UsageRecord,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    query
        .bind(&r.secret)
        .bind(r.timestamp)
        .bind(&r.os)
        .bind(&r.helper_version)
        .bind(&r.app_version)
        .bind(&r.cpu_model)
        .bind(r.cpu_mhz)
        .bind(r.cpu_usage)
        .bind(r.app_cpu_usage)
        .bind(r.mem_mb)
        .bind(r.app_mem_mb)
        .bind(r.app_peak_virtual_mem_mb)
        .bind(r.mem_free_mb)
        .bind(i64::from(r.hw_accel.code()))
        .bind(r.ram_gib)
        .bind(i64::from(r.ram_channels))
        .bind(r.ram_mhz)
        .bind(i64::from(r.camera_count))
        .bind(r.total_megapixels)
        .bind(r.total_fps)
        .bind(r.total_mpps)
}

async fn insert_camera(conn: &mut SqliteConnection, c: &Camera) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO camera (usage_record_id, pixels, fps, limit_decode, hw_accel, camera_type, capture_type, motion_detector, record_trigger, record_format, direct_to_disk, vcodec)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(c.usage_record_id)
    .bind(c.pixels)
    .bind(c.fps)
    .bind(c.limit_decode)
    .bind(i64::from(c.hw_accel.code()))
    .bind(i64::from(c.camera_type.code()))
    .bind(i64::from(c.capture_type.code()))
    .bind(c.motion_detector)
    .bind(i64::from(c.record_trigger.code()))
    .bind(i64::from(c.record_format.code()))
    .bind(c.direct_to_disk)
    .bind(&c.vcodec)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_gpu(conn: &mut SqliteConnection, g: &GpuInfo) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO gpu_info (usage_record_id, name, driver_version) VALUES ($1, $2, $3)")
        .bind(g.usage_record_id)
        .bind(&g.name)
        .bind(&g.driver_version)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
