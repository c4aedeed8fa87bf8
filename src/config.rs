//! Centralized configuration for the header codec and the `dicthdr` CLI.
//!
//! - HeaderConfig::from_env() reads DH_* env vars on top of defaults.
//! - Fluent `with_*` setters override single fields.
//!
//! Env:
//! - DH_FORMAT_VERSION   — version for newly created headers (default 4)
//! - DH_MAX_HEADER_BYTES — max size of the header output buffer (default 1 MiB)
//! - DH_FIXED_TIME       — fixed unix time for date/LAST_DECAYED_TIME (reproducible builds)

use std::fmt;

use crate::buffer::ExtendableBuffer;
use crate::clock::{Clock, FixedClock, SystemClock};
use crate::consts::{FORMAT_VERSION_DEFAULT, MAX_HEADER_BYTES_DEFAULT};

#[derive(Clone, Debug)]
pub struct HeaderConfig {
    /// Format version written into new dictionaries.
    /// Env: DH_FORMAT_VERSION (default 4)
    pub format_version: u16,

    /// Upper bound for the extendable header buffer, bytes.
    /// Env: DH_MAX_HEADER_BYTES (default 1048576)
    pub max_header_bytes: usize,

    /// If set, the clock always returns this time instead of the system time.
    /// Env: DH_FIXED_TIME (default None)
    pub fixed_time: Option<i32>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION_DEFAULT,
            max_header_bytes: MAX_HEADER_BYTES_DEFAULT,
            fixed_time: None,
        }
    }
}

impl HeaderConfig {
    /// Load configuration from environment variables (unparsable values are ignored).
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("DH_FORMAT_VERSION") {
            if let Ok(n) = v.trim().parse::<u16>() {
                cfg.format_version = n;
            }
        }

        if let Ok(v) = std::env::var("DH_MAX_HEADER_BYTES") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.max_header_bytes = n;
            }
        }

        if let Ok(v) = std::env::var("DH_FIXED_TIME") {
            if let Ok(n) = v.trim().parse::<i32>() {
                cfg.fixed_time = Some(n);
            }
        }

        cfg
    }

    pub fn with_format_version(mut self, version: u16) -> Self {
        self.format_version = version;
        self
    }

    pub fn with_max_header_bytes(mut self, bytes: usize) -> Self {
        self.max_header_bytes = bytes;
        self
    }

    pub fn with_fixed_time(mut self, t: Option<i32>) -> Self {
        self.fixed_time = t;
        self
    }

    /// Clock implied by the configuration.
    pub fn clock(&self) -> Box<dyn Clock> {
        match self.fixed_time {
            Some(t) => Box::new(FixedClock::new(t)),
            None => Box::new(SystemClock),
        }
    }

    /// Fresh output buffer bounded by `max_header_bytes`.
    pub fn new_header_buffer(&self) -> ExtendableBuffer {
        ExtendableBuffer::new(self.max_header_bytes)
    }
}

impl fmt::Display for HeaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HeaderConfig {{ format_version: {}, max_header_bytes: {}, fixed_time: {} }}",
            self.format_version,
            self.max_header_bytes,
            self.fixed_time
                .map(|v| v.to_string())
                .unwrap_or_else(|| "none(system clock)".to_string()),
        )
    }
}
