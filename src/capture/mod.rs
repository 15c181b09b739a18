//! Screen capture.
//!
//! This module provides:
//! - The capture session and its backend contract (`CaptureSession`, `CaptureBackend`)
//! - Desktop Duplication capture of the primary output (`DxgiCapture`, Windows only)
//! - PNG snapshots of captured frames (`save_snapshot`)

#[cfg(windows)]
pub mod duplication;
pub mod session;
pub mod snapshot;

#[cfg(windows)]
pub use duplication::DxgiCapture;
pub use session::{CaptureBackend, CaptureSession};
pub use snapshot::save_snapshot;
