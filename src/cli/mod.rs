//! CLI-логика `dicthdr`: разбор аргументов и тела команд.
//! Бинарь только парсит argv (clap) и вызывает функции отсюда.

pub mod args;  // KEY=VALUE, флаги в 0x/0o/0b
pub mod admin; // init/dump/get/set/touch/metrics
