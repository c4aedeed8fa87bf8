// src/dictfile.rs — файл словаря: [header][body].
//
// Политика записи:
// - Атомарно: tmp+rename, затем fsync родительского каталога (best‑effort на Windows).
// - Тело словаря не интерпретируется, только переносится как есть.
// - Заголовок пишется целиком в ExtendableBuffer; при ошибке файл не трогаем.

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::fs::{self, OpenOptions};
#[cfg(unix)]
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::clock::Clock;
use crate::config::HeaderConfig;
use crate::consts::TMP_SUFFIX;
use crate::header::HeaderPolicy;

#[inline]
fn tmp_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(TMP_SUFFIX);
    PathBuf::from(s)
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }
    Ok(())
}
#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Прочитать файл словаря: заголовок + байты тела.
pub fn read_header_file(path: &Path) -> Result<(HeaderPolicy, Vec<u8>)> {
    let bytes = fs::read(path).with_context(|| format!("read dictionary {}", path.display()))?;
    let policy = HeaderPolicy::from_dict_buf(&bytes)
        .with_context(|| format!("parse header of {}", path.display()))?;
    let body = bytes[policy.size()..].to_vec();
    debug!(
        "read_header_file: {} header={} body={}",
        path.display(),
        policy.size(),
        body.len()
    );
    Ok((policy, body))
}

/// Атомарно записать [header][body] в `path` (перезаписывает существующий файл).
pub fn write_dict_file(path: &Path, header: &[u8], body: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    let _ = fs::remove_file(&tmp); // best‑effort

    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)
        .with_context(|| format!("open dictionary tmp {}", tmp.display()))?;
    f.write_all(header)?;
    f.write_all(body)?;
    f.sync_all()?;

    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    let _ = fsync_dir(path);
    Ok(())
}

/// Создать новый словарь (только заголовок). Ошибка, если файл уже есть.
pub fn create_dict_file(
    path: &Path,
    policy: &HeaderPolicy,
    clock: &dyn Clock,
    cfg: &HeaderConfig,
) -> Result<()> {
    if path.exists() {
        return Err(anyhow!("dictionary already exists at {}", path.display()));
    }
    let mut out = cfg.new_header_buffer();
    policy.fill_in_and_write_header(
        clock,
        false,
        policy.unigram_count(),
        policy.bigram_count(),
        policy.extended_region_size(),
        &mut out,
    )?;
    write_dict_file(path, out.as_slice(), &[])?;
    info!("created dictionary {} ({} header bytes)", path.display(), out.tail_position());
    Ok(())
}

/// Перезаписать заголовок, сохраняя тело и счётчики текущего заголовка.
pub fn rewrite_header(
    path: &Path,
    policy: &HeaderPolicy,
    body: &[u8],
    clock: &dyn Clock,
    updates_last_decayed_time: bool,
    cfg: &HeaderConfig,
) -> Result<()> {
    let mut out = cfg.new_header_buffer();
    policy.fill_in_and_write_header(
        clock,
        updates_last_decayed_time,
        policy.unigram_count(),
        policy.bigram_count(),
        policy.extended_region_size(),
        &mut out,
    )?;
    write_dict_file(path, out.as_slice(), body)?;
    debug!(
        "rewrite_header: {} header={} body={} decayed={}",
        path.display(),
        out.tail_position(),
        body.len(),
        updates_last_decayed_time
    );
    Ok(())
}
