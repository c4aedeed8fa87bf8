use anyhow::{anyhow, Result};

use crate::header::AttributeMap;

/// KEY=VALUE -> (KEY, VALUE). Пустой ключ — ошибка, пустое значение допустимо.
pub fn parse_attr_arg(arg: &str) -> Result<(String, String)> {
    let (k, v) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("attribute must be KEY=VALUE, got '{}'", arg))?;
    if k.is_empty() {
        return Err(anyhow!("attribute key must not be empty in '{}'", arg));
    }
    Ok((k.to_string(), v.to_string()))
}

/// Повторяющиеся --attr KEY=VALUE; при повторе ключа побеждает последний.
pub fn attrs_from_args(args: &[String]) -> Result<AttributeMap> {
    let mut attrs = AttributeMap::new();
    for a in args {
        let (k, v) = parse_attr_arg(a)?;
        attrs.set_str(&k, &v);
    }
    Ok(attrs)
}

/// value_parser для clap: 0x.., 0o.., 0b.. или десятичное.
pub fn parse_u16_flags(s: &str) -> Result<u16, String> {
    let s = s.trim();
    if let Some(x) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(x, 16).map_err(|e| e.to_string())
    } else if let Some(x) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        u16::from_str_radix(x, 8).map_err(|e| e.to_string())
    } else if let Some(x) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u16::from_str_radix(x, 2).map_err(|e| e.to_string())
    } else {
        s.parse::<u16>().map_err(|e| e.to_string())
    }
}
