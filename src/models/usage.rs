// Stored usage record and its child rows.

use serde::{Deserialize, Serialize};

use super::codes::{
    CameraType, HwAccel, HwAccelCamera, RecordingFormat, RecordingTriggerType, ScreenCapType,
};
use super::upload::{CameraUpload, GpuUpload, UsageUpload};

/// Latest snapshot for one (secret, cpu_model) pair. `id` is 0 until persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub id: i64,
    pub secret: String,
    /// Receipt time, ms since Unix epoch (server clock).
    pub timestamp: i64,
    pub os: String,
    pub helper_version: String,
    pub app_version: String,
    pub cpu_model: String,
    pub cpu_mhz: i32,
    pub cpu_usage: i32,
    pub app_cpu_usage: i32,
    pub mem_mb: i32,
    pub app_mem_mb: i32,
    pub app_peak_virtual_mem_mb: i32,
    pub mem_free_mb: i32,
    pub hw_accel: HwAccel,
    pub ram_gib: f32,
    pub ram_channels: u8,
    pub ram_mhz: i32,
    /// Saturates at 255; the camera rows themselves are not limited.
    pub camera_count: u8,
    pub total_megapixels: f64,
    pub total_fps: f64,
    pub total_mpps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub id: i64,
    pub usage_record_id: i64,
    pub pixels: i32,
    pub fps: i32,
    pub limit_decode: bool,
    pub hw_accel: HwAccelCamera,
    pub camera_type: CameraType,
    pub capture_type: ScreenCapType,
    pub motion_detector: bool,
    pub record_trigger: RecordingTriggerType,
    pub record_format: RecordingFormat,
    pub direct_to_disk: bool,
    pub vcodec: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuInfo {
    pub id: i64,
    pub usage_record_id: i64,
    pub name: String,
    pub driver_version: String,
}

/// Derived aggregates over one upload's cameras.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraTotals {
    pub megapixels: f64,
    pub fps: f64,
    /// Sum of megapixels x fps.
    pub mpps: f64,
}

impl CameraTotals {
    pub fn from_cameras(cameras: &[CameraUpload]) -> Self {
        cameras.iter().fold(Self::default(), |acc, cam| {
            let mp = f64::from(cam.pixels) / 1_000_000.0;
            let fps = f64::from(cam.fps);
            Self {
                megapixels: acc.megapixels + mp,
                fps: acc.fps + fps,
                mpps: acc.mpps + mp * fps,
            }
        })
    }
}

impl UsageRecord {
    /// Builds an unsaved record from an upload, stamped with `timestamp`.
    pub fn from_upload(upload: &UsageUpload, timestamp: i64) -> Self {
        let totals = CameraTotals::from_cameras(&upload.cameras);
        let hw_accel = HwAccel::from(upload.hw_accel);
        if !hw_accel.is_known() {
            tracing::debug!(code = upload.hw_accel, "unknown HwAccel code");
        }
        Self {
            id: 0,
            secret: upload.secret.clone(),
            timestamp,
            os: upload.os.clone(),
            helper_version: upload.helper_version.clone(),
            app_version: upload.app_version.clone(),
            cpu_model: upload.cpu_model.clone(),
            cpu_mhz: upload.cpu_mhz,
            cpu_usage: upload.cpu_usage,
            app_cpu_usage: upload.app_cpu_usage,
            mem_mb: upload.mem_mb,
            app_mem_mb: upload.app_mem_mb,
            app_peak_virtual_mem_mb: upload.app_peak_virtual_mem_mb,
            mem_free_mb: upload.mem_free_mb,
            hw_accel,
            ram_gib: upload.ram_gib,
            ram_channels: upload.ram_channels,
            ram_mhz: upload.ram_mhz,
            camera_count: u8::try_from(upload.cameras.len()).unwrap_or(u8::MAX),
            total_megapixels: totals.megapixels,
            total_fps: totals.fps,
            total_mpps: totals.mpps,
        }
    }
}

impl Camera {
    /// Builds an unsaved camera; `usage_record_id` is set once the parent id is known.
    pub fn from_upload(cam: &CameraUpload) -> Self {
        let camera = Self {
            id: 0,
            usage_record_id: 0,
            pixels: cam.pixels,
            fps: cam.fps,
            limit_decode: cam.limit_decode,
            hw_accel: HwAccelCamera::from(cam.hwaccel),
            camera_type: CameraType::from(cam.camera_type),
            capture_type: ScreenCapType::from(cam.cap_type),
            motion_detector: cam.motion_detector,
            record_trigger: RecordingTriggerType::from(cam.record_trigger_type),
            record_format: RecordingFormat::from(cam.record_format),
            direct_to_disk: cam.direct_to_disk,
            vcodec: cam.vcodec.clone(),
        };
        if !camera.has_known_codes() {
            tracing::debug!(?camera, "camera carries unknown enum codes");
        }
        camera
    }

    fn has_known_codes(&self) -> bool {
        self.hw_accel.is_known()
            && self.camera_type.is_known()
            && self.capture_type.is_known()
            && self.record_trigger.is_known()
            && self.record_format.is_known()
    }
}

impl GpuInfo {
    pub fn from_upload(gpu: &GpuUpload) -> Self {
        Self {
            id: 0,
            usage_record_id: 0,
            name: gpu.name.clone(),
            driver_version: gpu.version.clone(),
        }
    }
}
