//! Core module: Bounded Byte Ring Buffer dengan blocking I/O
//!
//! Prinsip desain:
//! - Satu Lock: Mutex tunggal menjaga cursor, counter, dan waiter
//! - Backpressure: Write blocking saat penuh, read blocking saat kosong
//! - Level-Triggered: Readiness selalu dihitung ulang dari occupancy
//! - Replace, Not Realloc: Resize membuat storage baru lalu swap

mod coordinator;
mod readiness;
mod resize;
mod ring_buffer;
mod session;
mod storage;

pub use coordinator::{AccessCoordinator, StatsSnapshot};
pub use readiness::{ReadinessFlags, ReadinessNotifier, Registration, Waiter};
pub use resize::ResizeController;
pub use ring_buffer::RingBuffer;
pub use session::{AccessMode, Interrupt, Interrupter, Session};
pub use storage::{page_size, round_up_to_block, PageStorage};
