//! Page-Aligned Anonymous Storage untuk ring buffer
//!
//! Storage di-mmap secara anonymous, bukan dari file:
//! - Alokasi fisik selalu kelipatan block unit (page size platform)
//! - Kapasitas logis tetap persis seperti yang diminta
//! - Tidak ada persistence, mapping dilepas saat storage di-drop

use std::io;

use memmap2::{MmapMut, MmapOptions};

/// Fallback jika page size tidak bisa di-query
const FALLBACK_PAGE_SIZE: usize = 4096;

/// Page size platform, dipakai sebagai block unit alokasi
pub fn page_size() -> usize {
    #[cfg(unix)]
    {
        // SAFETY: sysconf tidak punya precondition
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            return size as usize;
        }
    }

    FALLBACK_PAGE_SIZE
}

/// Bulatkan `len` ke atas ke kelipatan `block`. Hasil minimal satu block.
#[inline]
pub fn round_up_to_block(len: usize, block: usize) -> usize {
    debug_assert!(block > 0);
    len.max(1).div_ceil(block) * block
}

/// Region byte contiguous milik satu ring buffer
pub struct PageStorage {
    map: MmapMut,
    len: usize,
}

impl PageStorage {
    /// Alokasi storage dengan kapasitas logis `len` byte
    ///
    /// Mapping fisik dibulatkan ke kelipatan page size.
    pub fn allocate(len: usize) -> io::Result<Self> {
        if len == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "storage length must be at least 1 byte",
            ));
        }

        let mapped = round_up_to_block(len, page_size());
        let map = MmapOptions::new().len(mapped).map_anon().inspect_err(|e| {
            tracing::warn!(len, mapped, error = %e, "anonymous mapping failed");
        })?;

        tracing::trace!(len, mapped, "storage allocated");

        Ok(Self { map, len })
    }

    /// Kapasitas logis
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Selalu false, storage minimal 1 byte
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ukuran mapping fisik (kelipatan page size)
    #[inline(always)]
    pub fn allocated_len(&self) -> usize {
        self.map.len()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.map[..self.len]
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.map[..self.len]
    }
}

impl std::fmt::Debug for PageStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStorage")
            .field("len", &self.len)
            .field("allocated_len", &self.allocated_len())
            .finish()
    }
}
