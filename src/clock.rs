//! clock — источник текущего времени для заголовка (date / LAST_DECAYED_TIME).
//!
//! Время передаётся в fill-in явно, а не читается из глобального состояния.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

pub trait Clock {
    /// Текущее время в секундах Unix.
    fn now(&self) -> i32;
}

/// Системные часы: Unix-время в секундах, обрезанное к i32 (saturating).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i32 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        now.as_secs().min(i32::MAX as u64) as i32
    }
}

/// Фиксированные часы (тесты, воспроизводимая сборка словарей).
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    now: Cell<i32>,
}

impl FixedClock {
    pub fn new(now: i32) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: i32) {
        self.now.set(now);
    }

    pub fn advance(&self, secs: i32) {
        self.now.set(self.now.get().saturating_add(secs));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> i32 {
        self.now.get()
    }
}
