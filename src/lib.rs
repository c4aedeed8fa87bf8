// Базовые модули
pub mod consts;
pub mod config;
pub mod metrics;

// Примитивы кодирования и время
pub mod chars;  // строки кодпоинтов, BE-целые
pub mod buffer; // ExtendableBuffer (append + patch по позиции)
pub mod clock;  // Clock, SystemClock, FixedClock

// Заголовок словаря
pub mod header; // src/header/{mod,attrs,rw,policy}.rs

// Файл словаря целиком ([header][body])
pub mod dictfile;

// CLI-команды (бинарь dicthdr — тонкая обёртка)
pub mod cli; // src/cli/{mod,args,admin}.rs

// Удобные реэкспорты
pub use buffer::ExtendableBuffer;
pub use chars::CodePoints;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::HeaderConfig;
pub use header::{AttrKey, AttributeMap, HeaderPolicy, HeaderPrefix};
pub use dictfile::{create_dict_file, read_header_file, rewrite_header, write_dict_file};
