//! chars — кодирование строк кодпоинтов и целых чисел (BE) в байтах заголовка.
//!
//! Кодпоинт в диапазоне 0x20..=0xFF пишется одним байтом, любой другой — тремя
//! байтами (BE). Первый байт трёхбайтовой формы всегда < 0x1F, поэтому
//! терминатор 0x1F однозначно отделяется от символов.

use anyhow::{anyhow, Result};
use byteorder::{BigEndian, ByteOrder};

use crate::consts::{
    CHARACTER_ARRAY_TERMINATOR, MAXIMAL_ONE_BYTE_CHARACTER_VALUE, MAX_CODE_POINT,
    MINIMAL_ONE_BYTE_CHARACTER_VALUE,
};

/// Последовательность кодпоинтов (ключи и значения атрибутов).
pub type CodePoints = Vec<u32>;

#[inline]
pub fn str_to_code_points(s: &str) -> CodePoints {
    s.chars().map(|c| c as u32).collect()
}

/// Строка из кодпоинтов; None, если встречается невалидный скаляр.
pub fn code_points_to_string(cps: &[u32]) -> Option<String> {
    cps.iter().map(|&cp| char::from_u32(cp)).collect()
}

/// То же, но невалидные кодпоинты заменяются на U+FFFD.
pub fn code_points_to_string_lossy(cps: &[u32]) -> String {
    cps.iter()
        .map(|&cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[inline]
fn is_one_byte(cp: u32) -> bool {
    (MINIMAL_ONE_BYTE_CHARACTER_VALUE..=MAXIMAL_ONE_BYTE_CHARACTER_VALUE).contains(&cp)
}

/// Размер закодированного кодпоинта в байтах.
#[inline]
pub fn code_point_size(cp: u32) -> usize {
    if is_one_byte(cp) {
        1
    } else {
        3
    }
}

/// Размер закодированной строки (с терминатором, если `terminate`).
pub fn code_points_size(cps: &[u32], terminate: bool) -> usize {
    let body: usize = cps.iter().map(|&cp| code_point_size(cp)).sum();
    body + usize::from(terminate)
}

/// Закодировать строку кодпоинтов в `dst` (append).
pub fn encode_code_points(cps: &[u32], terminate: bool, dst: &mut Vec<u8>) -> Result<()> {
    for &cp in cps {
        if cp > MAX_CODE_POINT {
            return Err(anyhow!("code point 0x{:X} out of range", cp));
        }
        if is_one_byte(cp) {
            dst.push(cp as u8);
        } else {
            let mut b = [0u8; 3];
            BigEndian::write_u24(&mut b, cp);
            dst.extend_from_slice(&b);
        }
    }
    if terminate {
        dst.push(CHARACTER_ARRAY_TERMINATOR);
    }
    Ok(())
}

/// Прочитать терминированную строку кодпоинтов начиная с `*pos`, не выходя за `end`.
/// После успеха `*pos` указывает на байт после терминатора.
pub fn read_code_points(buf: &[u8], pos: &mut usize, end: usize) -> Result<CodePoints> {
    let end = end.min(buf.len());
    let mut out = Vec::new();
    let mut p = *pos;
    loop {
        if p >= end {
            return Err(anyhow!("unterminated code point string at offset {}", *pos));
        }
        let b = buf[p];
        if b == CHARACTER_ARRAY_TERMINATOR {
            p += 1;
            break;
        }
        if u32::from(b) >= MINIMAL_ONE_BYTE_CHARACTER_VALUE {
            out.push(u32::from(b));
            p += 1;
            continue;
        }
        if p + 3 > end {
            return Err(anyhow!("truncated code point at offset {}", p));
        }
        let cp = BigEndian::read_u24(&buf[p..p + 3]);
        if cp > MAX_CODE_POINT {
            return Err(anyhow!("code point 0x{:X} out of range at offset {}", cp, p));
        }
        out.push(cp);
        p += 3;
    }
    *pos = p;
    Ok(out)
}

/// Прочитать BE-целое размером `size` (1..=4) байт и сдвинуть позицию.
pub fn read_uint(buf: &[u8], size: usize, pos: &mut usize) -> Result<u32> {
    if !(1..=4).contains(&size) {
        return Err(anyhow!("unsupported integer size {}", size));
    }
    let p = *pos;
    if p + size > buf.len() {
        return Err(anyhow!(
            "buffer too small: need {} bytes at offset {}, have {}",
            size,
            p,
            buf.len()
        ));
    }
    let v = BigEndian::read_uint(&buf[p..p + size], size) as u32;
    *pos = p + size;
    Ok(v)
}
