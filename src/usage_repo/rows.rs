// Row -> model parsing. Integer codes are narrowed to u8 and mapped to enums.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::StoreError;
use crate::models::{Camera, GpuInfo, UsageRecord};

pub(super) const USAGE_RECORD_COLUMNS: &str = "id, secret, timestamp, os, helper_version, app_version, cpu_model, cpu_mhz, cpu_usage, app_cpu_usage, mem_mb, app_mem_mb, app_peak_virtual_mem_mb, mem_free_mb, hw_accel, ram_gib, ram_channels, ram_mhz, camera_count, total_megapixels, total_fps, total_mpps";

pub(super) const CAMERA_COLUMNS: &str = "id, usage_record_id, pixels, fps, limit_decode, hw_accel, camera_type, capture_type, motion_detector, record_trigger, record_format, direct_to_disk, vcodec";

pub(super) const GPU_COLUMNS: &str = "id, usage_record_id, name, driver_version";

fn small(row: &SqliteRow, table: &'static str, column: &'static str) -> Result<u8, StoreError> {
    let value: i64 = row.try_get(column)?;
    u8::try_from(value).map_err(|_| StoreError::InvalidColumn {
        table,
        column,
        value,
    })
}

pub(super) fn usage_record(row: &SqliteRow) -> Result<UsageRecord, StoreError> {
    const T: &str = "usage_record";
    Ok(UsageRecord {
        id: row.try_get("id")?,
        secret: row.try_get("secret")?,
        timestamp: row.try_get("timestamp")?,
        os: row.try_get("os")?,
        helper_version: row.try_get("helper_version")?,
        app_version: row.try_get("app_version")?,
        cpu_model: row.try_get("cpu_model")?,
        cpu_mhz: row.try_get("cpu_mhz")?,
        cpu_usage: row.try_get("cpu_usage")?,
        app_cpu_usage: row.try_get("app_cpu_usage")?,
        mem_mb: row.try_get("mem_mb")?,
        app_mem_mb: row.try_get("app_mem_mb")?,
        app_peak_virtual_mem_mb: row.try_get("app_peak_virtual_mem_mb")?,
        mem_free_mb: row.try_get("mem_free_mb")?,
        hw_accel: small(row, T, "hw_accel")?.into(),
        ram_gib: row.try_get("ram_gib")?,
        ram_channels: small(row, T, "ram_channels")?,
        ram_mhz: row.try_get("ram_mhz")?,
        camera_count: small(row, T, "camera_count")?,
        total_megapixels: row.try_get("total_megapixels")?,
        total_fps: row.try_get("total_fps")?,
        total_mpps: row.try_get("total_mpps")?,
    })
}

pub(super) fn camera(row: &SqliteRow) -> Result<Camera, StoreError> {
    const T: &str = "camera";
    Ok(Camera {
        id: row.try_get("id")?,
        usage_record_id: row.try_get("usage_record_id")?,
        pixels: row.try_get("pixels")?,
        fps: row.try_get("fps")?,
        limit_decode: row.try_get("limit_decode")?,
        hw_accel: small(row, T, "hw_accel")?.into(),
        camera_type: small(row, T, "camera_type")?.into(),
        capture_type: small(row, T, "capture_type")?.into(),
        motion_detector: row.try_get("motion_detector")?,
        record_trigger: small(row, T, "record_trigger")?.into(),
        record_format: small(row, T, "record_format")?.into(),
        direct_to_disk: row.try_get("direct_to_disk")?,
        vcodec: row.try_get("vcodec")?,
    })
}

pub(super) fn gpu(row: &SqliteRow) -> Result<GpuInfo, StoreError> {
    Ok(GpuInfo {
        id: row.try_get("id")?,
        usage_record_id: row.try_get("usage_record_id")?,
        name: row.try_get("name")?,
        driver_version: row.try_get("driver_version")?,
    })
}

pub(super) fn collect<T>(
    rows: Vec<SqliteRow>,
    parse: fn(&SqliteRow) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    rows.iter().map(parse).collect()
}
