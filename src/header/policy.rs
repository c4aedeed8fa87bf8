//! header/policy — состояние заголовка открытого словаря.
//!
//! Версия и флаги фиксируются при создании и больше не меняются. Атрибуты
//! меняются только через fill-in + запись: перед записью карта клонируется,
//! дополняется счётчиками/временем/локалью и сериализуется; исходная карта
//! остаётся нетронутой.

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::buffer::ExtendableBuffer;
use crate::chars::{code_points_to_string_lossy, CodePoints};
use crate::clock::Clock;
use crate::consts::{
    DEFAULT_MULTIPLE_WORDS_DEMOTION_RATE, DISPLAY_TERMINATOR, HEADER_FIXED_SIZE,
    MAX_VALUE_FOR_WEIGHTING, MULTIPLE_WORD_COST_MULTIPLIER_SCALE,
};
use crate::header::attrs::{AttrKey, AttributeMap};
use crate::header::rw::{
    fetch_all_header_attributes, read_header_prefix, write_dictionary_flags,
    write_dictionary_header_size, write_dictionary_version, write_header_attributes,
};
use crate::metrics::{
    record_header_decoded, record_header_write_failure, record_header_written,
    record_malformed_attribute,
};

/// Атрибуты, которые читаются как целые.
const INT_ATTRIBUTES: [AttrKey; 6] = [
    AttrKey::MultipleWordsDemotionRate,
    AttrKey::Date,
    AttrKey::LastDecayedTime,
    AttrKey::UnigramCount,
    AttrKey::BigramCount,
    AttrKey::ExtendedRegionSize,
];

/// Известные целочисленные ключи, значения которых не парсятся (будут заменены дефолтом).
pub fn malformed_int_attributes(attributes: &AttributeMap) -> Vec<AttrKey> {
    INT_ATTRIBUTES
        .iter()
        .copied()
        .filter(|k| attributes.has_malformed_int(k))
        .collect()
}

#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    format_version: u16,
    flags: u16,
    /// Полная длина заголовка на диске (0 для нового словаря).
    size: usize,
    attributes: AttributeMap,
    locale: CodePoints,

    // Кэш производных значений (считаются один раз при создании).
    multi_word_cost_multiplier: f32,
    requires_german_umlaut_processing: bool,
    is_decaying_dict: bool,
    date: i32,
    last_decayed_time: i32,
    unigram_count: i32,
    bigram_count: i32,
    extended_region_size: i32,
    has_historical_info: bool,
}

impl HeaderPolicy {
    /// Путь создания: новый словарь с заданным набором атрибутов.
    pub fn new(format_version: u16, flags: u16, attributes: AttributeMap) -> Self {
        Self::build(format_version, flags, 0, attributes)
    }

    /// Путь чтения: разобрать заголовок в начале `dict_buf`.
    pub fn from_dict_buf(dict_buf: &[u8]) -> Result<Self> {
        let prefix = read_header_prefix(dict_buf)?;
        let attributes = Self::read_all_attributes(dict_buf)?;
        record_header_decoded(attributes.len());
        Ok(Self::build(
            prefix.version,
            prefix.flags,
            prefix.total_size(),
            attributes,
        ))
    }

    /// Прочитать все атрибуты из сырых байт словаря (неизвестные ключи сохраняются).
    pub fn read_all_attributes(dict_buf: &[u8]) -> Result<AttributeMap> {
        fetch_all_header_attributes(dict_buf).context("decode header attributes")
    }

    fn build(format_version: u16, flags: u16, size: usize, attributes: AttributeMap) -> Self {
        for key in malformed_int_attributes(&attributes) {
            warn!(
                "attribute {} has malformed integer value {:?}, using default",
                key,
                attributes.get(key).map(code_points_to_string_lossy).unwrap_or_default()
            );
            record_malformed_attribute();
        }
        let locale = attributes.read_code_points(AttrKey::Locale);
        let date = attributes.read_int(AttrKey::Date, 0);
        let mut policy = Self {
            format_version,
            flags,
            size,
            locale,
            multi_word_cost_multiplier: 1.0,
            requires_german_umlaut_processing: false,
            is_decaying_dict: attributes.read_bool(AttrKey::IsDecayingDict, false),
            date,
            last_decayed_time: attributes.read_int(AttrKey::LastDecayedTime, date),
            unigram_count: attributes.read_int(AttrKey::UnigramCount, 0),
            bigram_count: attributes.read_int(AttrKey::BigramCount, 0),
            extended_region_size: attributes.read_int(AttrKey::ExtendedRegionSize, 0),
            has_historical_info: attributes.read_bool(AttrKey::HasHistoricalInfo, false),
            attributes,
        };
        policy.multi_word_cost_multiplier = policy.read_multiple_word_cost_multiplier();
        policy.requires_german_umlaut_processing = policy.read_requires_german_umlaut_processing();
        policy
    }

    // ---------- typed readers ----------

    pub fn read_locale(&self) -> CodePoints {
        self.attributes.read_code_points(AttrKey::Locale)
    }

    /// 100 / demotion_rate; при rate <= 0 — MAX_VALUE_FOR_WEIGHTING ("бесконечная" стоимость).
    pub fn read_multiple_word_cost_multiplier(&self) -> f32 {
        let demotion_rate = self.attributes.read_int(
            AttrKey::MultipleWordsDemotionRate,
            DEFAULT_MULTIPLE_WORDS_DEMOTION_RATE,
        );
        if demotion_rate <= 0 {
            return MAX_VALUE_FOR_WEIGHTING;
        }
        MULTIPLE_WORD_COST_MULTIPLIER_SCALE / demotion_rate as f32
    }

    pub fn read_requires_german_umlaut_processing(&self) -> bool {
        self.attributes.read_bool(AttrKey::RequiresGermanUmlautProcessing, false)
    }

    /// Значение атрибута для логов/отладки. Ёмкость — `out.len()`.
    /// - 0: ничего не пишем;
    /// - 1: только терминатор;
    /// - ключа нет: "?" + терминатор;
    /// - иначе: до `len - 1` кодпоинтов + терминатор (молча обрезаем).
    pub fn read_header_value_or_question_mark(&self, key: &str, out: &mut [u32]) {
        if out.is_empty() {
            return;
        }
        if out.len() == 1 {
            out[0] = DISPLAY_TERMINATOR;
            return;
        }
        match self.attributes.get(key) {
            None => {
                out[0] = '?' as u32;
                out[1] = DISPLAY_TERMINATOR;
            }
            Some(value) => {
                let n = value.len().min(out.len() - 1);
                out[..n].copy_from_slice(&value[..n]);
                out[n] = DISPLAY_TERMINATOR;
            }
        }
    }

    /// То же в виде строки (без ограничения длины).
    pub fn header_value_or_question_mark(&self, key: &str) -> String {
        match self.attributes.get(key) {
            Some(value) => code_points_to_string_lossy(value),
            None => "?".to_string(),
        }
    }

    // ---------- cached state ----------

    #[inline]
    pub fn format_version(&self) -> u16 {
        self.format_version
    }

    #[inline]
    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// Полная длина заголовка в байтах (смещение тела словаря).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    #[inline]
    pub fn locale(&self) -> &[u32] {
        &self.locale
    }

    #[inline]
    pub fn multi_word_cost_multiplier(&self) -> f32 {
        self.multi_word_cost_multiplier
    }

    #[inline]
    pub fn requires_german_umlaut_processing(&self) -> bool {
        self.requires_german_umlaut_processing
    }

    #[inline]
    pub fn is_decaying_dict(&self) -> bool {
        self.is_decaying_dict
    }

    #[inline]
    pub fn date(&self) -> i32 {
        self.date
    }

    /// Время последнего затухания; если не записано — `date`.
    #[inline]
    pub fn last_decayed_time(&self) -> i32 {
        self.last_decayed_time
    }

    #[inline]
    pub fn unigram_count(&self) -> i32 {
        self.unigram_count
    }

    #[inline]
    pub fn bigram_count(&self) -> i32 {
        self.bigram_count
    }

    #[inline]
    pub fn extended_region_size(&self) -> i32 {
        self.extended_region_size
    }

    #[inline]
    pub fn has_historical_info(&self) -> bool {
        self.has_historical_info
    }

    // ---------- write path ----------

    /// Рабочая копия атрибутов для записи. Время читается из `clock` один раз.
    pub fn fill_in_header(
        &self,
        clock: &dyn Clock,
        updates_last_decayed_time: bool,
        unigram_count: i32,
        bigram_count: i32,
        extended_region_size: i32,
    ) -> AttributeMap {
        let mut attrs = self.attributes.clone();
        attrs.set_int(AttrKey::UnigramCount, unigram_count);
        attrs.set_int(AttrKey::BigramCount, bigram_count);
        attrs.set_int(AttrKey::ExtendedRegionSize, extended_region_size);

        let now = clock.now();
        // Время генерации обновляется при каждой записи.
        attrs.set_int(AttrKey::Date, now);
        attrs.set_code_points(AttrKey::Locale, &self.locale);
        if updates_last_decayed_time {
            attrs.set_int(AttrKey::LastDecayedTime, now);
        }
        attrs
    }

    /// Заполнить и записать заголовок в `out` с позиции 0.
    ///
    /// header_size сначала пишется нулём, затем перезаписывается реальной длиной
    /// блока атрибутов. При ошибке буфер может содержать частичную запись.
    pub fn fill_in_and_write_header(
        &self,
        clock: &dyn Clock,
        updates_last_decayed_time: bool,
        unigram_count: i32,
        bigram_count: i32,
        extended_region_size: i32,
        out: &mut ExtendableBuffer,
    ) -> Result<()> {
        let attrs = self.fill_in_header(
            clock,
            updates_last_decayed_time,
            unigram_count,
            bigram_count,
            extended_region_size,
        );
        match self.write_header_with(&attrs, out) {
            Ok(written) => {
                record_header_written(written);
                debug!(
                    "fill_in_and_write_header: version={} attrs={} bytes={}",
                    self.format_version,
                    attrs.len(),
                    written
                );
                Ok(())
            }
            Err(e) => {
                record_header_write_failure();
                warn!("header write failed: {:#}", e);
                Err(e)
            }
        }
    }

    fn write_header_with(&self, attrs: &AttributeMap, out: &mut ExtendableBuffer) -> Result<usize> {
        let mut writing_pos = 0usize;
        write_dictionary_version(out, self.format_version, &mut writing_pos)
            .context("write dictionary version")?;
        write_dictionary_flags(out, self.flags, &mut writing_pos)
            .context("write dictionary flags")?;

        // Временно пишем нулевой размер.
        let mut header_size_field_pos = writing_pos;
        write_dictionary_header_size(out, 0, &mut writing_pos)
            .context("write header size placeholder")?;
        debug_assert_eq!(writing_pos, HEADER_FIXED_SIZE);

        write_header_attributes(out, attrs, &mut writing_pos).context("write header attributes")?;

        let attributes_size = u32::try_from(writing_pos - HEADER_FIXED_SIZE)
            .context("header attributes too large")?;
        write_dictionary_header_size(out, attributes_size, &mut header_size_field_pos)
            .context("patch header size")?;
        Ok(writing_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chars::str_to_code_points;
    use crate::clock::FixedClock;
    use crate::consts::{MAX_HEADER_BYTES_DEFAULT, NO_FLAGS};

    fn policy_with(pairs: &[(&str, &str)]) -> HeaderPolicy {
        let mut attrs = AttributeMap::new();
        for (k, v) in pairs {
            attrs.set_str(k, v);
        }
        HeaderPolicy::new(4, NO_FLAGS, attrs)
    }

    #[test]
    fn cost_multiplier_edges() {
        assert_eq!(policy_with(&[]).read_multiple_word_cost_multiplier(), 1.0);
        let p = policy_with(&[("MULTIPLE_WORDS_DEMOTION_RATE", "100")]);
        assert_eq!(p.read_multiple_word_cost_multiplier(), 1.0);
        let p = policy_with(&[("MULTIPLE_WORDS_DEMOTION_RATE", "50")]);
        assert_eq!(p.read_multiple_word_cost_multiplier(), 2.0);
        assert_eq!(p.multi_word_cost_multiplier(), 2.0);
        for rate in ["0", "-5"] {
            let p = policy_with(&[("MULTIPLE_WORDS_DEMOTION_RATE", rate)]);
            assert_eq!(p.read_multiple_word_cost_multiplier(), MAX_VALUE_FOR_WEIGHTING);
        }
        // Порча — как отсутствие.
        let p = policy_with(&[("MULTIPLE_WORDS_DEMOTION_RATE", "fast")]);
        assert_eq!(p.read_multiple_word_cost_multiplier(), 1.0);
    }

    #[test]
    fn malformed_ints_are_listed_once_per_key() {
        let p = policy_with(&[
            ("MULTIPLE_WORDS_DEMOTION_RATE", "fast"),
            ("UNIGRAM_COUNT", "12"),
            ("BIGRAM_COUNT", "-"),
            ("locale", "not-a-number"),
        ]);
        // Повторные чтения не меняют картину: считается значение, а не чтение.
        for _ in 0..3 {
            assert_eq!(p.read_multiple_word_cost_multiplier(), 1.0);
        }
        assert_eq!(
            malformed_int_attributes(p.attributes()),
            vec![AttrKey::MultipleWordsDemotionRate, AttrKey::BigramCount]
        );
        assert_eq!(p.unigram_count(), 12);
        assert_eq!(p.bigram_count(), 0);
    }

    #[test]
    fn german_umlaut_flag() {
        assert!(!policy_with(&[]).read_requires_german_umlaut_processing());
        let p = policy_with(&[("REQUIRES_GERMAN_UMLAUT_PROCESSING", "true")]);
        assert!(p.read_requires_german_umlaut_processing());
        assert!(p.requires_german_umlaut_processing());
        let p = policy_with(&[("REQUIRES_GERMAN_UMLAUT_PROCESSING", "1")]);
        assert!(!p.read_requires_german_umlaut_processing());
    }

    #[test]
    fn question_mark_accessor_capacities() {
        let p = policy_with(&[("locale", "en_US")]);

        let mut empty: [u32; 0] = [];
        p.read_header_value_or_question_mark("locale", &mut empty);

        let mut one = [0xAAu32; 1];
        p.read_header_value_or_question_mark("locale", &mut one);
        assert_eq!(one, [0]);

        let mut missing = [0xAAu32; 4];
        p.read_header_value_or_question_mark("date", &mut missing);
        assert_eq!(missing, ['?' as u32, 0, 0xAA, 0xAA]);

        let mut short = [0xAAu32; 3];
        p.read_header_value_or_question_mark("locale", &mut short);
        assert_eq!(short, ['e' as u32, 'n' as u32, 0]);

        let mut wide = [0xAAu32; 8];
        p.read_header_value_or_question_mark("locale", &mut wide);
        let mut expected = str_to_code_points("en_US");
        expected.push(0);
        assert_eq!(&wide[..6], expected.as_slice());
        assert_eq!(wide[6], 0xAA);

        assert_eq!(p.header_value_or_question_mark("locale"), "en_US");
        assert_eq!(p.header_value_or_question_mark("date"), "?");
    }

    #[test]
    fn fill_in_keeps_last_decayed_time_unless_requested() {
        let p = policy_with(&[("LAST_DECAYED_TIME", "1000"), ("date", "900"), ("locale", "de")]);
        assert_eq!(p.last_decayed_time(), 1000);
        let clock = FixedClock::new(5000);

        let a = p.fill_in_header(&clock, false, 1, 2, 3);
        assert_eq!(a.read_int(AttrKey::LastDecayedTime, 0), 1000);
        assert_eq!(a.read_int(AttrKey::Date, 0), 5000);

        clock.advance(10);
        let b = p.fill_in_header(&clock, false, 1, 2, 3);
        assert_eq!(b.read_int(AttrKey::LastDecayedTime, 0), 1000);
        assert_eq!(b.read_int(AttrKey::Date, 0), 5010);

        let c = p.fill_in_header(&clock, true, 1, 2, 3);
        assert_eq!(c.read_int(AttrKey::LastDecayedTime, 0), 5010);

        // Исходная карта не тронута.
        assert_eq!(p.attributes().read_int(AttrKey::Date, 0), 900);
        assert!(!p.attributes().contains(AttrKey::UnigramCount));
    }

    #[test]
    fn fill_in_writes_counts_and_cached_locale() {
        let p = policy_with(&[("locale", "fr_CA")]);
        let a = p.fill_in_header(&FixedClock::new(1), false, 10, 20, 30);
        assert_eq!(a.read_int(AttrKey::UnigramCount, -1), 10);
        assert_eq!(a.read_int(AttrKey::BigramCount, -1), 20);
        assert_eq!(a.read_int(AttrKey::ExtendedRegionSize, -1), 30);
        assert_eq!(a.read_code_points(AttrKey::Locale), str_to_code_points("fr_CA"));
        assert!(!a.contains(AttrKey::LastDecayedTime));
    }

    #[test]
    fn write_fails_on_small_buffer() {
        let p = policy_with(&[("locale", "en_US")]);
        // Влезают только фиксированные поля.
        let mut out = ExtendableBuffer::new(HEADER_FIXED_SIZE);
        let r = p.fill_in_and_write_header(&FixedClock::new(1), false, 0, 0, 0, &mut out);
        assert!(r.is_err());
        assert_eq!(out.tail_position(), HEADER_FIXED_SIZE);
    }

    #[test]
    fn decoded_policy_exposes_cached_values() {
        let p = policy_with(&[
            ("USES_FORGETTING_CURVE", "true"),
            ("HAS_HISTORICAL_INFO", "true"),
            ("locale", "en"),
        ]);
        let clock = FixedClock::new(777);
        let mut out = ExtendableBuffer::new(MAX_HEADER_BYTES_DEFAULT);
        p.fill_in_and_write_header(&clock, false, 5, 6, 7, &mut out).unwrap();

        let d = HeaderPolicy::from_dict_buf(out.as_slice()).unwrap();
        assert_eq!(d.format_version(), 4);
        assert_eq!(d.flags(), NO_FLAGS);
        assert_eq!(d.size(), out.tail_position());
        assert!(d.is_decaying_dict());
        assert!(d.has_historical_info());
        assert_eq!(d.date(), 777);
        // LAST_DECAYED_TIME не записан — падаем на date.
        assert_eq!(d.last_decayed_time(), 777);
        assert_eq!((d.unigram_count(), d.bigram_count(), d.extended_region_size()), (5, 6, 7));
        assert_eq!(d.locale(), str_to_code_points("en").as_slice());
        assert_eq!(d.read_locale(), str_to_code_points("en"));
    }
}
