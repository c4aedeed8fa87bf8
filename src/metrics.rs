//! Lightweight global metrics for the header codec.
//!
//! Потокобезопасные атомарные счётчики:
//! - decode (чтение заголовков)
//! - write (запись заголовков, байты, ошибки)
//! - attributes (значения, заменённые дефолтом из-за порчи)

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Decode -----
static HEADERS_DECODED: AtomicU64 = AtomicU64::new(0);
static ATTRIBUTES_DECODED: AtomicU64 = AtomicU64::new(0);

// ----- Write -----
static HEADERS_WRITTEN: AtomicU64 = AtomicU64::new(0);
static HEADER_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static HEADER_WRITE_FAILURES: AtomicU64 = AtomicU64::new(0);

// ----- Attributes -----
static MALFORMED_ATTRIBUTES_DEFAULTED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub headers_decoded: u64,
    pub attributes_decoded: u64,

    pub headers_written: u64,
    pub header_bytes_written: u64,
    pub header_write_failures: u64,

    pub malformed_attributes_defaulted: u64,
}

impl MetricsSnapshot {
    pub fn avg_header_bytes(&self) -> f64 {
        if self.headers_written == 0 {
            0.0
        } else {
            self.header_bytes_written as f64 / self.headers_written as f64
        }
    }
}

// ----- Recorders -----
pub fn record_header_decoded(attributes: usize) {
    HEADERS_DECODED.fetch_add(1, Ordering::Relaxed);
    ATTRIBUTES_DECODED.fetch_add(attributes as u64, Ordering::Relaxed);
}

pub fn record_header_written(bytes: usize) {
    HEADERS_WRITTEN.fetch_add(1, Ordering::Relaxed);
    HEADER_BYTES_WRITTEN.fetch_add(bytes as u64, Ordering::Relaxed);
}

pub fn record_header_write_failure() {
    HEADER_WRITE_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_malformed_attribute() {
    MALFORMED_ATTRIBUTES_DEFAULTED.fetch_add(1, Ordering::Relaxed);
}

// ----- Snapshot / Reset -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        headers_decoded: HEADERS_DECODED.load(Ordering::Relaxed),
        attributes_decoded: ATTRIBUTES_DECODED.load(Ordering::Relaxed),

        headers_written: HEADERS_WRITTEN.load(Ordering::Relaxed),
        header_bytes_written: HEADER_BYTES_WRITTEN.load(Ordering::Relaxed),
        header_write_failures: HEADER_WRITE_FAILURES.load(Ordering::Relaxed),

        malformed_attributes_defaulted: MALFORMED_ATTRIBUTES_DEFAULTED.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    HEADERS_DECODED.store(0, Ordering::Relaxed);
    ATTRIBUTES_DECODED.store(0, Ordering::Relaxed);

    HEADERS_WRITTEN.store(0, Ordering::Relaxed);
    HEADER_BYTES_WRITTEN.store(0, Ordering::Relaxed);
    HEADER_WRITE_FAILURES.store(0, Ordering::Relaxed);

    MALFORMED_ATTRIBUTES_DEFAULTED.store(0, Ordering::Relaxed);
}
