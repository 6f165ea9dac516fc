//! Byte Ring Buffer dengan satu slot cadangan
//!
//! Hanya bookkeeping posisi dan storage, tidak ada locking.
//! Pemanggil (coordinator) sudah memegang lock sebelum memanggil method di sini.
//!
//! Satu slot storage selalu dibiarkan kosong supaya "empty" dan "full"
//! bisa dibedakan hanya dengan dua index:
//! - empty: `read_pos == write_pos`
//! - full:  `(write_pos + 1) % capacity == read_pos`

use std::io;

use super::storage::PageStorage;

/// Ring buffer byte dengan kapasitas tetap
///
/// Payload maksimal adalah `capacity - 1` byte.
#[derive(Debug)]
pub struct RingBuffer {
    // Storage contiguous, panjang logis == capacity
    storage: PageStorage,
    // Posisi baca berikutnya, selalu di [0, capacity)
    read_pos: usize,
    // Posisi tulis berikutnya, selalu di [0, capacity)
    write_pos: usize,
}

impl RingBuffer {
    /// Membuat ring buffer baru dengan `capacity` slot (minimal 1)
    ///
    /// Alokasi hanya terjadi di sini. Resize membuat instance baru.
    pub fn with_capacity(capacity: usize) -> io::Result<Self> {
        Ok(Self {
            storage: PageStorage::allocate(capacity)?,
            read_pos: 0,
            write_pos: 0,
        })
    }

    /// Kapasitas slot (termasuk slot cadangan)
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Ukuran mapping fisik di belakang buffer
    #[inline(always)]
    pub fn allocated_len(&self) -> usize {
        self.storage.allocated_len()
    }

    #[inline(always)]
    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    #[inline(always)]
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Cek apakah buffer kosong
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.read_pos == self.write_pos
    }

    /// Cek apakah buffer penuh
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        (self.write_pos + 1) % self.capacity() == self.read_pos
    }

    /// Jumlah byte yang bisa dibaca
    #[inline(always)]
    pub fn occupied_len(&self) -> usize {
        if self.write_pos >= self.read_pos {
            self.write_pos - self.read_pos
        } else {
            self.capacity() - self.read_pos + self.write_pos
        }
    }

    /// Jumlah byte yang bisa ditulis
    ///
    /// `occupied_len() + free_len() == capacity() - 1` selalu berlaku.
    #[inline(always)]
    pub fn free_len(&self) -> usize {
        self.capacity() - 1 - self.occupied_len()
    }

    /// Span contiguous yang bisa dibaca mulai dari `read_pos`
    ///
    /// Panjang dibatasi `max_len` dan tidak pernah melewati akhir storage.
    /// Kalau data wrap, call ini hanya mengembalikan segmen pertama;
    /// sisanya didapat dari call berikutnya.
    #[inline]
    pub fn read_slice(&self, max_len: usize) -> (usize, usize) {
        let contiguous = if self.write_pos >= self.read_pos {
            self.write_pos - self.read_pos
        } else {
            self.capacity() - self.read_pos
        };
        (self.read_pos, contiguous.min(max_len))
    }

    /// Span contiguous yang bisa ditulis mulai dari `write_pos`
    ///
    /// Simetris dengan [`read_slice`](Self::read_slice): tidak wrap dan
    /// tidak pernah memakai slot cadangan.
    #[inline]
    pub fn write_slice(&self, max_len: usize) -> (usize, usize) {
        let contiguous = if self.write_pos >= self.read_pos {
            let to_end = self.capacity() - self.write_pos;
            // Slot terakhir sebelum read_pos == 0 adalah slot cadangan
            if self.read_pos == 0 {
                to_end - 1
            } else {
                to_end
            }
        } else {
            self.read_pos - self.write_pos - 1
        };
        (self.write_pos, contiguous.min(max_len))
    }

    /// Majukan read cursor sebanyak `n` (modulo capacity)
    #[inline(always)]
    pub fn advance_read(&mut self, n: usize) {
        debug_assert!(n <= self.occupied_len());
        self.read_pos = (self.read_pos + n) % self.capacity();
    }

    /// Majukan write cursor sebanyak `n` (modulo capacity)
    #[inline(always)]
    pub fn advance_write(&mut self, n: usize) {
        debug_assert!(n <= self.free_len());
        self.write_pos = (self.write_pos + n) % self.capacity();
    }

    /// Byte di storage untuk span hasil `read_slice`
    #[inline(always)]
    pub fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.storage.as_slice()[offset..offset + len]
    }

    /// Byte di storage untuk span hasil `write_slice`
    #[inline(always)]
    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.storage.as_mut_slice()[offset..offset + len]
    }

    /// Satu langkah baca: copy span contiguous ke `dst`, majukan cursor
    ///
    /// Returns jumlah byte yang di-copy (bisa 0 kalau kosong).
    #[inline]
    pub fn pop_into(&mut self, dst: &mut [u8]) -> usize {
        let (offset, len) = self.read_slice(dst.len());
        if len > 0 {
            dst[..len].copy_from_slice(self.bytes(offset, len));
            self.advance_read(len);
        }
        len
    }

    /// Satu langkah tulis: copy dari `src` ke span contiguous, majukan cursor
    ///
    /// Returns jumlah byte yang di-copy (bisa 0 kalau penuh).
    #[inline]
    pub fn push_from(&mut self, src: &[u8]) -> usize {
        let (offset, len) = self.write_slice(src.len());
        if len > 0 {
            self.bytes_mut(offset, len).copy_from_slice(&src[..len]);
            self.advance_write(len);
        }
        len
    }
}
