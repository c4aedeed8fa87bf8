//! header/rw — чтение/запись полей заголовка поверх буферных примитивов.
//!
//! Запись идёт по явной позиции (`&mut usize`), чтобы поле header_size можно
//! было перезаписать по запомненному смещению.

use anyhow::{anyhow, Context, Result};
use log::debug;

use crate::buffer::ExtendableBuffer;
use crate::chars::{read_code_points, read_uint};
use crate::consts::{
    HEADER_FIXED_SIZE, HEADER_FLAGS_SIZE, HEADER_MAGIC, HEADER_MAGIC_SIZE,
    HEADER_SIZE_FIELD_SIZE, HEADER_VERSION_SIZE,
};
use crate::header::attrs::AttributeMap;

/// Фиксированная часть заголовка, как она лежит на диске.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPrefix {
    pub version: u16,
    pub flags: u16,
    /// Байт от конца поля header_size до конца блока атрибутов.
    pub attributes_size: u32,
}

impl HeaderPrefix {
    /// Полная длина заголовка (фиксированная часть + атрибуты).
    #[inline]
    pub fn total_size(&self) -> usize {
        HEADER_FIXED_SIZE + self.attributes_size as usize
    }
}

// ---------- write ----------

/// magic + version.
pub fn write_dictionary_version(
    buf: &mut ExtendableBuffer,
    version: u16,
    pos: &mut usize,
) -> Result<()> {
    buf.write_uint_and_advance(HEADER_MAGIC, HEADER_MAGIC_SIZE, pos)?;
    buf.write_uint_and_advance(u32::from(version), HEADER_VERSION_SIZE, pos)
}

pub fn write_dictionary_flags(
    buf: &mut ExtendableBuffer,
    flags: u16,
    pos: &mut usize,
) -> Result<()> {
    buf.write_uint_and_advance(u32::from(flags), HEADER_FLAGS_SIZE, pos)
}

pub fn write_dictionary_header_size(
    buf: &mut ExtendableBuffer,
    size: u32,
    pos: &mut usize,
) -> Result<()> {
    buf.write_uint_and_advance(size, HEADER_SIZE_FIELD_SIZE, pos)
}

/// Блок атрибутов: для каждой пары [key..0x1F][value..0x1F], в порядке итерации карты.
pub fn write_header_attributes(
    buf: &mut ExtendableBuffer,
    attrs: &AttributeMap,
    pos: &mut usize,
) -> Result<()> {
    for (key, value) in attrs.iter() {
        buf.write_code_points_and_advance(key, true, pos)?;
        buf.write_code_points_and_advance(value, true, pos)?;
    }
    Ok(())
}

// ---------- read ----------

/// Прочитать и проверить фиксированную часть заголовка.
pub fn read_header_prefix(dict_buf: &[u8]) -> Result<HeaderPrefix> {
    let mut pos = 0usize;
    let magic = read_uint(dict_buf, HEADER_MAGIC_SIZE, &mut pos).context("read header magic")?;
    if magic != HEADER_MAGIC {
        return Err(anyhow!(
            "bad dictionary magic 0x{:08X} (expected 0x{:08X})",
            magic,
            HEADER_MAGIC
        ));
    }
    let version =
        read_uint(dict_buf, HEADER_VERSION_SIZE, &mut pos).context("read version")? as u16;
    let flags = read_uint(dict_buf, HEADER_FLAGS_SIZE, &mut pos).context("read flags")? as u16;
    let attributes_size =
        read_uint(dict_buf, HEADER_SIZE_FIELD_SIZE, &mut pos).context("read header size")?;

    let prefix = HeaderPrefix {
        version,
        flags,
        attributes_size,
    };
    if prefix.total_size() > dict_buf.len() {
        return Err(anyhow!(
            "header size {} exceeds buffer length {}",
            prefix.total_size(),
            dict_buf.len()
        ));
    }
    Ok(prefix)
}

/// Прочитать все атрибуты заголовка (включая неизвестные ключи).
pub fn fetch_all_header_attributes(dict_buf: &[u8]) -> Result<AttributeMap> {
    let prefix = read_header_prefix(dict_buf)?;
    let end = prefix.total_size();
    let mut pos = HEADER_FIXED_SIZE;
    let mut attrs = AttributeMap::new();
    while pos < end {
        let key = read_code_points(dict_buf, &mut pos, end)
            .with_context(|| format!("read attribute key at offset {}", pos))?;
        let value = read_code_points(dict_buf, &mut pos, end)
            .with_context(|| format!("read attribute value at offset {}", pos))?;
        attrs.insert_raw(key, value);
    }
    debug!(
        "fetch_all_header_attributes: version={} flags=0x{:04X} size={} attrs={}",
        prefix.version,
        prefix.flags,
        end,
        attrs.len()
    );
    Ok(attrs)
}
