//! Error taxonomy untuk ring device
//!
//! Semua error dikembalikan langsung ke pemanggil. Tidak ada retry internal
//! selain re-check predicate setelah wake.

use std::io;

use thiserror::Error;

/// Result alias untuk seluruh crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error yang bisa dikembalikan oleh coordinator, resize, dan device table
#[derive(Debug, Error)]
pub enum Error {
    /// Non-blocking request tidak bisa jalan sekarang (EAGAIN)
    #[error("operation would block")]
    WouldBlock,

    /// Wait diinterupsi dari luar (EINTR). State buffer tidak berubah.
    #[error("wait interrupted, retry the call")]
    Cancelled,

    /// Argumen di luar batas, misalnya capacity resize (EINVAL)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Resize ditolak karena masih ada session terbuka (EPERM)
    #[error("resize refused: {readers} reader(s) and {writers} writer(s) still open")]
    PermissionDenied { readers: usize, writers: usize },

    /// Minor number tidak ada di device table (ENODEV)
    #[error("no device with minor {0}")]
    NoDevice(usize),

    /// Alokasi storage gagal (ENOMEM)
    #[error("storage allocation failed: {0}")]
    Storage(#[from] io::Error),
}

impl Error {
    /// Apakah pemanggil boleh mengulang call yang sama tanpa koreksi
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::WouldBlock | Error::Cancelled)
    }

    /// Errno yang setara, untuk transport bergaya character device
    #[cfg(unix)]
    pub fn errno(&self) -> i32 {
        match self {
            Error::WouldBlock => libc::EAGAIN,
            Error::Cancelled => libc::EINTR,
            Error::InvalidArgument(_) => libc::EINVAL,
            Error::PermissionDenied { .. } => libc::EPERM,
            Error::NoDevice(_) => libc::ENODEV,
            Error::Storage(e) => e.raw_os_error().unwrap_or(libc::ENOMEM),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match &err {
            Error::WouldBlock => io::ErrorKind::WouldBlock,
            Error::Cancelled => io::ErrorKind::Interrupted,
            Error::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            Error::PermissionDenied { .. } => io::ErrorKind::PermissionDenied,
            Error::NoDevice(_) => io::ErrorKind::NotFound,
            Error::Storage(inner) => inner.kind(),
        };
        match err {
            Error::Storage(inner) => inner,
            other => io::Error::new(kind, other),
        }
    }
}
