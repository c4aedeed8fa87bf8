//! header/attrs — карта атрибутов заголовка и реестр известных ключей.
//!
//! Ключи и значения хранятся как последовательности кодпоинтов. Поверх них —
//! типизированные чтение/запись (int, bool, code points). Порча значения не
//! является ошибкой: читатель подставляет дефолт.

use std::collections::BTreeMap;
use std::fmt;

use crate::chars::{str_to_code_points, CodePoints};

/// Известные ключи атрибутов. Текст ключей — часть формата.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKey {
    MultipleWordsDemotionRate,
    RequiresGermanUmlautProcessing,
    /// Словарь с затуханием (forgetting curve).
    IsDecayingDict,
    Date,
    LastDecayedTime,
    UnigramCount,
    BigramCount,
    ExtendedRegionSize,
    /// Есть ли историческая информация (timestamp/level/count) для затухания.
    HasHistoricalInfo,
    Locale,
}

impl AttrKey {
    pub const ALL: [AttrKey; 10] = [
        AttrKey::MultipleWordsDemotionRate,
        AttrKey::RequiresGermanUmlautProcessing,
        AttrKey::IsDecayingDict,
        AttrKey::Date,
        AttrKey::LastDecayedTime,
        AttrKey::UnigramCount,
        AttrKey::BigramCount,
        AttrKey::ExtendedRegionSize,
        AttrKey::HasHistoricalInfo,
        AttrKey::Locale,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AttrKey::MultipleWordsDemotionRate => "MULTIPLE_WORDS_DEMOTION_RATE",
            AttrKey::RequiresGermanUmlautProcessing => "REQUIRES_GERMAN_UMLAUT_PROCESSING",
            AttrKey::IsDecayingDict => "USES_FORGETTING_CURVE",
            AttrKey::Date => "date",
            AttrKey::LastDecayedTime => "LAST_DECAYED_TIME",
            AttrKey::UnigramCount => "UNIGRAM_COUNT",
            AttrKey::BigramCount => "BIGRAM_COUNT",
            AttrKey::ExtendedRegionSize => "EXTENDED_REGION_SIZE",
            AttrKey::HasHistoricalInfo => "HAS_HISTORICAL_INFO",
            AttrKey::Locale => "locale",
        }
    }

    /// Ключ по точному тексту (регистр важен).
    pub fn from_name(name: &str) -> Option<AttrKey> {
        AttrKey::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

impl AsRef<str> for AttrKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const TRUE_TEXT: &str = "true";
const FALSE_TEXT: &str = "false";

/// Карта атрибутов. Итерация — в отсортированном порядке ключей (детерминированная запись).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    map: BTreeMap<CodePoints, CodePoints>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Точный поиск по кодпоинтам ключа.
    pub fn get_raw(&self, key: &[u32]) -> Option<&[u32]> {
        self.map.get(key).map(|v| v.as_slice())
    }

    pub fn get<K: AsRef<str>>(&self, key: K) -> Option<&[u32]> {
        self.get_raw(&str_to_code_points(key.as_ref()))
    }

    pub fn contains<K: AsRef<str>>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Вставка сырой пары (декодер, неизвестные ключи). Последняя запись побеждает.
    pub fn insert_raw(&mut self, key: CodePoints, value: CodePoints) {
        self.map.insert(key, value);
    }

    pub fn remove<K: AsRef<str>>(&mut self, key: K) -> Option<CodePoints> {
        self.map.remove(&str_to_code_points(key.as_ref()))
    }

    /// Пары (ключ, значение) в порядке записи.
    pub fn iter(&self) -> impl Iterator<Item = (&[u32], &[u32])> {
        self.map.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    // ---------- setters ----------

    pub fn set_code_points<K: AsRef<str>>(&mut self, key: K, value: &[u32]) {
        self.map.insert(str_to_code_points(key.as_ref()), value.to_vec());
    }

    pub fn set_str<K: AsRef<str>>(&mut self, key: K, value: &str) {
        self.map.insert(str_to_code_points(key.as_ref()), str_to_code_points(value));
    }

    pub fn set_int<K: AsRef<str>>(&mut self, key: K, value: i32) {
        self.set_str(key, &value.to_string());
    }

    pub fn set_bool<K: AsRef<str>>(&mut self, key: K, value: bool) {
        self.set_str(key, if value { TRUE_TEXT } else { FALSE_TEXT });
    }

    // ---------- readers ----------

    /// Значение как кодпоинты; пусто, если ключа нет.
    pub fn read_code_points<K: AsRef<str>>(&self, key: K) -> CodePoints {
        self.get(key).map(|v| v.to_vec()).unwrap_or_default()
    }

    /// Десятичное i32. Нет ключа или значение не парсится — `default`.
    pub fn read_int<K: AsRef<str>>(&self, key: K, default: i32) -> i32 {
        self.get(key).and_then(parse_int).unwrap_or(default)
    }

    /// Ключ есть, но значение не парсится как i32.
    pub fn has_malformed_int<K: AsRef<str>>(&self, key: K) -> bool {
        self.get(key).map_or(false, |v| parse_int(v).is_none())
    }

    /// true только для точного текста "true"; нет ключа — `default`.
    pub fn read_bool<K: AsRef<str>>(&self, key: K, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(v) => v.iter().copied().eq(TRUE_TEXT.chars().map(|c| c as u32)),
        }
    }
}

impl FromIterator<(CodePoints, CodePoints)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (CodePoints, CodePoints)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

/// [-]digits без пробелов и '+', с проверкой переполнения i32.
fn parse_int(cps: &[u32]) -> Option<i32> {
    let (negative, digits) = match cps.split_first() {
        Some((&c, rest)) if c == '-' as u32 => (true, rest),
        _ => (false, cps),
    };
    if digits.is_empty() {
        return None;
    }
    // Копим в отрицательную сторону, чтобы принять i32::MIN.
    let mut acc: i32 = 0;
    for &c in digits {
        let d = c.checked_sub('0' as u32).filter(|d| *d <= 9)? as i32;
        acc = acc.checked_mul(10)?.checked_sub(d)?;
    }
    if negative {
        Some(acc)
    } else {
        acc.checked_neg()
    }
}
