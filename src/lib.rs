//! ringdev - Bounded Byte Ring Device
//!
//! Arsitektur:
//! - Ring Buffer: storage byte page-aligned dengan satu slot cadangan
//! - Access Coordinator: satu lock + dua condition, blocking/non-blocking I/O
//! - Readiness: level-triggered, bisa dipakai select/poll/epoll-equivalent
//! - Resize: swap storage baru, hanya saat tidak ada session terbuka

pub mod config;
pub mod core;
pub mod device;
pub mod error;

pub use crate::config::{CapacityBounds, DeviceConfig};
pub use crate::core::{
    AccessCoordinator, AccessMode, Interrupt, Interrupter, ReadinessFlags, ReadinessNotifier,
    Registration, ResizeController, Session, Waiter,
};
pub use crate::device::{DeviceTable, Multiplexer, ReadyEvent, SizeAttribute};
pub use crate::error::{Error, Result};
