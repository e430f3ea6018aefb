// Shared test helpers
#![allow(dead_code)]

use std::time::Duration;

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;
use usagesite::models::*;
use usagesite::usage_repo::UsageRepo;

pub fn camera(pixels: i32, fps: i32, vcodec: &str) -> CameraUpload {
    CameraUpload {
        pixels,
        fps,
        limit_decode: false,
        hwaccel: 0,
        camera_type: 0,
        cap_type: 0,
        motion_detector: true,
        record_trigger_type: 1,
        record_format: 0,
        direct_to_disk: true,
        vcodec: vcodec.into(),
    }
}

pub fn gpu(name: &str, version: &str) -> GpuUpload {
    GpuUpload {
        name: name.into(),
        version: version.into(),
    }
}

pub fn upload(secret: &str, cpu_model: &str) -> UsageUpload {
    UsageUpload {
        secret: secret.into(),
        os: "Windows 10 Pro".into(),
        helper_version: "1.6.2".into(),
        app_version: "5.3.4.2".into(),
        cpu_model: cpu_model.into(),
        cpu_mhz: 3600,
        cpu_usage: 35,
        app_cpu_usage: 20,
        mem_mb: 16384,
        app_mem_mb: 900,
        app_peak_virtual_mem_mb: 2400,
        mem_free_mb: 8000,
        hw_accel: 1,
        ram_gib: 16.0,
        ram_channels: 2,
        ram_mhz: 2666,
        cameras: vec![],
        gpus: vec![],
    }
}

/// Repo backed by a fresh database file in `dir`; returns the path for raw access.
pub async fn open_repo(dir: &TempDir) -> (UsageRepo, String) {
    let path = dir.path().join("usage.db");
    let path_str = path.to_str().unwrap().to_string();
    let repo = UsageRepo::connect(&path_str, 4, Duration::from_secs(5))
        .await
        .unwrap();
    repo.init().await.unwrap();
    (repo, path_str)
}

/// Second pool on the same file, for fault injection and invariant checks.
pub async fn raw_pool(path: &str) -> SqlitePool {
    SqlitePool::connect(&format!("sqlite:{}", path)).await.unwrap()
}

/// Number of camera + gpu rows whose parent does not exist.
pub async fn orphan_count(pool: &SqlitePool) -> i64 {
    let cameras: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM camera c LEFT JOIN usage_record u ON u.id = c.usage_record_id WHERE u.id IS NULL",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    let gpus: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM gpu_info g LEFT JOIN usage_record u ON u.id = g.usage_record_id WHERE u.id IS NULL",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    cameras + gpus
}
