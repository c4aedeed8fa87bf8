//! Общие константы формата заголовка словаря (header v4).
//!
//! Layout (BE):
//! [magic u32][version u16][flags u16][header_size u32][attributes...]
//!
//! header_size — число байт от конца поля header_size до конца блока атрибутов.

// -------- Magic / fixed fields --------
pub const HEADER_MAGIC: u32 = 0x9BC1_3AFE;

pub const HEADER_MAGIC_SIZE: usize = 4;
pub const HEADER_VERSION_SIZE: usize = 2;
pub const HEADER_FLAGS_SIZE: usize = 2;
pub const HEADER_SIZE_FIELD_SIZE: usize = 4;

/// Смещение поля header_size от начала словаря.
pub const HEADER_OFF_SIZE: usize = HEADER_MAGIC_SIZE + HEADER_VERSION_SIZE + HEADER_FLAGS_SIZE;
/// Длина фиксированной части: magic + version + flags + size.
pub const HEADER_FIXED_SIZE: usize = HEADER_OFF_SIZE + HEADER_SIZE_FIELD_SIZE;

/// Текущая версия формата для новых словарей.
pub const FORMAT_VERSION_DEFAULT: u16 = 4;

pub const NO_FLAGS: u16 = 0;

// -------- Code point strings --------
/// Терминатор строки кодпоинтов.
pub const CHARACTER_ARRAY_TERMINATOR: u8 = 0x1F;
/// Диапазон однобайтовых кодпоинтов.
pub const MINIMAL_ONE_BYTE_CHARACTER_VALUE: u32 = 0x20;
pub const MAXIMAL_ONE_BYTE_CHARACTER_VALUE: u32 = 0xFF;
pub const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// Терминатор для буферов отображения (read_header_value_or_question_mark).
pub const DISPLAY_TERMINATOR: u32 = 0;

// -------- Demotion / cost --------
pub const DEFAULT_MULTIPLE_WORDS_DEMOTION_RATE: i32 = 100;
pub const MULTIPLE_WORD_COST_MULTIPLIER_SCALE: f32 = 100.0;

/// Максимальная стоимость в скоринге ("бесконечная" стоимость).
/// Возвращается множителем при demotion rate <= 0, чтобы подавить multi-word подсказки.
pub const MAX_VALUE_FOR_WEIGHTING: f32 = 10_000_000.0;

// -------- Buffers --------
/// Максимальный размер буфера заголовка по умолчанию (1 MiB).
pub const MAX_HEADER_BYTES_DEFAULT: usize = 1 << 20;

/// Суффикс временного файла при атомарной перезаписи словаря.
pub const TMP_SUFFIX: &str = "tmp";
