use anyhow::{anyhow, Result};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::chars::code_points_to_string_lossy;
use crate::config::HeaderConfig;
use crate::dictfile::{create_dict_file, read_header_file, rewrite_header};
use crate::header::{AttrKey, HeaderPolicy};
use crate::metrics;

use super::args::attrs_from_args;

pub fn cmd_init(
    path: PathBuf,
    locale: &str,
    attrs: &[String],
    version: Option<u16>,
    flags: u16,
    cfg: &HeaderConfig,
) -> Result<()> {
    let mut map = attrs_from_args(attrs)?;
    map.set_str(AttrKey::Locale, locale);

    let version = version.unwrap_or(cfg.format_version);
    let policy = HeaderPolicy::new(version, flags, map);
    let clock = cfg.clock();
    create_dict_file(&path, &policy, &*clock, cfg)?;

    println!(
        "Initialized dictionary at {} (version={}, flags=0x{:04X}, locale={})",
        path.display(),
        version,
        flags,
        locale
    );
    Ok(())
}

// ---------- dump ----------

#[derive(Debug, Serialize)]
pub struct AttrOut {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct HeaderReport {
    pub version: u16,
    pub flags: u16,
    pub header_size: usize,
    pub body_size: usize,
    pub locale: String,
    pub multi_word_cost_multiplier: f32,
    pub decaying: bool,
    pub date: i32,
    pub last_decayed_time: i32,
    pub attributes: Vec<AttrOut>,
}

/// Сводка по заголовку файла (то, что печатает `dump`).
pub fn header_report(path: &Path) -> Result<HeaderReport> {
    let (policy, body) = read_header_file(path)?;

    let attributes = policy
        .attributes()
        .iter()
        .map(|(k, v)| AttrOut {
            key: code_points_to_string_lossy(k),
            value: code_points_to_string_lossy(v),
        })
        .collect();

    Ok(HeaderReport {
        version: policy.format_version(),
        flags: policy.flags(),
        header_size: policy.size(),
        body_size: body.len(),
        locale: code_points_to_string_lossy(policy.locale()),
        multi_word_cost_multiplier: policy.multi_word_cost_multiplier(),
        decaying: policy.is_decaying_dict(),
        date: policy.date(),
        last_decayed_time: policy.last_decayed_time(),
        attributes,
    })
}

pub fn cmd_dump(path: PathBuf, json: bool) -> Result<()> {
    let out = header_report(&path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Dictionary: {}", path.display());
    println!("  version:     {}", out.version);
    println!("  flags:       0x{:04X}", out.flags);
    println!("  header_size: {} B", out.header_size);
    println!("  body_size:   {} B", out.body_size);
    println!("  locale:      {}", out.locale);
    println!("  multiplier:  {}", out.multi_word_cost_multiplier);
    println!("  decaying:    {}", out.decaying);
    println!("  date:        {}", out.date);
    println!("  decayed_at:  {}", out.last_decayed_time);
    println!("  attributes:  {}", out.attributes.len());
    for a in &out.attributes {
        println!("    {} = {}", a.key, a.value);
    }
    Ok(())
}

// ---------- get / set / touch ----------

pub fn cmd_get(path: PathBuf, key: &str) -> Result<()> {
    let (policy, _body) = read_header_file(&path)?;
    println!("{}", policy.header_value_or_question_mark(key));
    Ok(())
}

pub fn cmd_set(path: PathBuf, key: &str, value: &str, cfg: &HeaderConfig) -> Result<()> {
    // Эти ключи проставляет fill-in при каждой записи, значение из set было бы потеряно.
    match AttrKey::from_name(key) {
        Some(AttrKey::Date) => {
            return Err(anyhow!("'{}' is refreshed on every write; use `touch` instead", key));
        }
        Some(AttrKey::LastDecayedTime) => {
            return Err(anyhow!(
                "'{}' is refreshed on every write; use `touch --decayed` instead",
                key
            ));
        }
        Some(_) => {}
        None => info!("set: '{}' is not a known header key, storing as-is", key),
    }

    let (policy, body) = read_header_file(&path)?;

    // Версия и флаги открытого словаря не меняются: новая политика с изменённой картой.
    let mut attrs = policy.attributes().clone();
    attrs.set_str(key, value);
    let updated = HeaderPolicy::new(policy.format_version(), policy.flags(), attrs);

    let clock = cfg.clock();
    rewrite_header(&path, &updated, &body, &*clock, false, cfg)?;
    println!("SET '{}' = '{}' in {}", key, value, path.display());
    Ok(())
}

pub fn cmd_touch(path: PathBuf, decayed: bool, cfg: &HeaderConfig) -> Result<()> {
    let (policy, body) = read_header_file(&path)?;
    let clock = cfg.clock();
    rewrite_header(&path, &policy, &body, &*clock, decayed, cfg)?;

    let (after, _) = read_header_file(&path)?;
    println!(
        "Touched {}: date={} last_decayed_time={}",
        path.display(),
        after.date(),
        after.last_decayed_time()
    );
    Ok(())
}

// ---------- metrics ----------

#[derive(Debug, Serialize)]
struct MetricsOut {
    headers_decoded: u64,
    attributes_decoded: u64,
    headers_written: u64,
    header_bytes_written: u64,
    avg_header_bytes: f64,
    header_write_failures: u64,
    malformed_attributes_defaulted: u64,
}

/// Счётчики процесса. С `path` — сброс, декод файла, затем снимок по этому декоду.
pub fn cmd_metrics(path: Option<PathBuf>, json: bool) -> Result<()> {
    if let Some(p) = &path {
        metrics::reset();
        read_header_file(p)?;
    }

    let m = metrics::snapshot();
    if json {
        let out = MetricsOut {
            headers_decoded: m.headers_decoded,
            attributes_decoded: m.attributes_decoded,
            headers_written: m.headers_written,
            header_bytes_written: m.header_bytes_written,
            avg_header_bytes: m.avg_header_bytes(),
            header_write_failures: m.header_write_failures,
            malformed_attributes_defaulted: m.malformed_attributes_defaulted,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Metrics snapshot:");
    println!("  headers_decoded                = {}", m.headers_decoded);
    println!("  attributes_decoded             = {}", m.attributes_decoded);
    println!("  headers_written                = {}", m.headers_written);
    println!("  header_bytes_written           = {}", m.header_bytes_written);
    println!("  avg_header_bytes               = {:.2}", m.avg_header_bytes());
    println!("  header_write_failures          = {}", m.header_write_failures);
    println!("  malformed_attributes_defaulted = {}", m.malformed_attributes_defaulted);
    Ok(())
}
