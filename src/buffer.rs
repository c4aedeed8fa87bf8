//! buffer — расширяемый буфер записи заголовка.
//!
//! Запись идёт по явной позиции: в хвост (append) или поверх уже записанных
//! байт (patch). Позиция за хвостом — ошибка. Рост ограничен `max_size`;
//! превышение — ошибка записи, уже записанные байты остаются (без отката).

use anyhow::{anyhow, Result};
use byteorder::{BigEndian, ByteOrder};

use crate::chars::{code_points_size, encode_code_points};

#[derive(Debug, Clone)]
pub struct ExtendableBuffer {
    buf: Vec<u8>,
    max_size: usize,
}

impl ExtendableBuffer {
    pub fn new(max_size: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_size,
        }
    }

    /// Текущий хвост (= число записанных байт).
    #[inline]
    pub fn tail_position(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// Проверить, что запись `len` байт по `pos` допустима, и растянуть буфер при необходимости.
    fn reserve_at(&mut self, pos: usize, len: usize) -> Result<()> {
        if pos > self.buf.len() {
            return Err(anyhow!(
                "write position {} is past the buffer tail {}",
                pos,
                self.buf.len()
            ));
        }
        let end = pos
            .checked_add(len)
            .ok_or_else(|| anyhow!("write length overflow at {}", pos))?;
        if end > self.max_size {
            return Err(anyhow!(
                "buffer exhausted: need {} bytes, max {}",
                end,
                self.max_size
            ));
        }
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        Ok(())
    }

    /// Записать BE-целое размером `size` (1..=4) байт по `*pos` и сдвинуть позицию.
    pub fn write_uint_and_advance(
        &mut self,
        value: u32,
        size: usize,
        pos: &mut usize,
    ) -> Result<()> {
        if !(1..=4).contains(&size) {
            return Err(anyhow!("unsupported integer size {}", size));
        }
        if size < 4 && u64::from(value) >= 1u64 << (size * 8) {
            return Err(anyhow!("value {} does not fit in {} bytes", value, size));
        }
        let p = *pos;
        self.reserve_at(p, size)?;
        BigEndian::write_uint(&mut self.buf[p..p + size], u64::from(value), size);
        *pos = p + size;
        Ok(())
    }

    /// Записать строку кодпоинтов (опционально с терминатором) по `*pos`.
    pub fn write_code_points_and_advance(
        &mut self,
        cps: &[u32],
        terminate: bool,
        pos: &mut usize,
    ) -> Result<()> {
        let p = *pos;
        let len = code_points_size(cps, terminate);
        let mut encoded = Vec::with_capacity(len);
        encode_code_points(cps, terminate, &mut encoded)?;
        self.reserve_at(p, encoded.len())?;
        self.buf[p..p + encoded.len()].copy_from_slice(&encoded);
        *pos = p + encoded.len();
        Ok(())
    }
}
