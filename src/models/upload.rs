// Inbound upload payload as sent by agents (PascalCase JSON, integer enum codes).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UsageUpload {
    pub secret: String,
    #[serde(rename = "OS")]
    pub os: String,
    pub helper_version: String,
    #[serde(rename = "BiVersion")]
    pub app_version: String,
    pub cpu_model: String,
    #[serde(rename = "CpuMHz")]
    pub cpu_mhz: i32,
    pub cpu_usage: i32,
    #[serde(rename = "BiCpuUsage")]
    pub app_cpu_usage: i32,
    #[serde(rename = "MemMB")]
    pub mem_mb: i32,
    #[serde(rename = "BiMemUsageMB")]
    pub app_mem_mb: i32,
    #[serde(rename = "BiPeakVirtualMemUsageMB")]
    pub app_peak_virtual_mem_mb: i32,
    #[serde(rename = "MemFreeMB")]
    pub mem_free_mb: i32,
    pub hw_accel: u8,
    #[serde(rename = "RamGiB")]
    pub ram_gib: f32,
    pub ram_channels: u8,
    #[serde(rename = "RamMHz")]
    pub ram_mhz: i32,
    #[serde(rename = "cameras", default)]
    pub cameras: Vec<CameraUpload>,
    #[serde(rename = "gpus", default)]
    pub gpus: Vec<GpuUpload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CameraUpload {
    pub pixels: i32,
    #[serde(rename = "FPS")]
    pub fps: i32,
    pub limit_decode: bool,
    pub hwaccel: u8,
    #[serde(rename = "Type")]
    pub camera_type: u8,
    pub cap_type: u8,
    pub motion_detector: bool,
    pub record_trigger_type: u8,
    pub record_format: u8,
    pub direct_to_disk: bool,
    #[serde(rename = "VCodec")]
    pub vcodec: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GpuUpload {
    pub name: String,
    /// Driver version string.
    pub version: String,
}
