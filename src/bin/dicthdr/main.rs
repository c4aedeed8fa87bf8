use anyhow::Result;
use env_logger::{Builder, Env};
use log::error;

use dicthdr::cli::admin::{cmd_dump, cmd_get, cmd_init, cmd_metrics, cmd_set, cmd_touch};
use dicthdr::HeaderConfig;

mod cli;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug dicthdr dump --path main.dict
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse_args();
    let cfg = HeaderConfig::from_env();
    match cli.cmd {
        cli::Cmd::Init { path, locale, attr, version, flags } =>
            cmd_init(path, &locale, &attr, version, flags, &cfg),

        cli::Cmd::Dump { path, json } =>
            cmd_dump(path, json),

        cli::Cmd::Get { path, key } =>
            cmd_get(path, &key),

        cli::Cmd::Set { path, key, value } =>
            cmd_set(path, &key, &value, &cfg),

        cli::Cmd::Touch { path, decayed } =>
            cmd_touch(path, decayed, &cfg),

        cli::Cmd::Metrics { path, json } =>
            cmd_metrics(path, json),
    }
}
