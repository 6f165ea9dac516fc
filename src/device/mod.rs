//! Device Layer: endpoint di sekitar coordinator
//!
//! Fitur:
//! - Device table dengan beberapa instance independen
//! - Sizing attribute berbasis teks (gaya sysfs)
//! - Multiplexer readiness berbasis mio (epoll/kqueue)

mod attribute;
mod poller;
mod table;

pub use attribute::SizeAttribute;
pub use mio::Token;
pub use poller::{Multiplexer, ReadyEvent, WAKE_TOKEN};
pub use table::DeviceTable;
