// Domain models: wire upload payload, stored rows, enum codes

mod codes;
mod upload;
mod usage;

pub use codes::{
    CameraType, HwAccel, HwAccelCamera, RecordingFormat, RecordingTriggerType, ScreenCapType,
};
pub use upload::{CameraUpload, GpuUpload, UsageUpload};
pub use usage::{Camera, CameraTotals, GpuInfo, UsageRecord};
