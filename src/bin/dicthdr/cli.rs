use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI для заголовков словарей предиктивного ввода
#[derive(Parser, Debug)]
#[command(name = "dicthdr", version, about = "Dictionary header inspector/editor")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create a new dictionary file (header only, empty body)
    Init {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        locale: String,
        /// Extra attribute as KEY=VALUE (repeatable)
        #[arg(long)]
        attr: Vec<String>,
        /// Format version (default: DH_FORMAT_VERSION or 4)
        #[arg(long)]
        version: Option<u16>,
        /// Flags bitset (0x.., 0b.., 0o.. or decimal)
        #[arg(long, value_parser = dicthdr::cli::args::parse_u16_flags, default_value = "0")]
        flags: u16,
    },
    /// Print version, flags, size and all attributes
    Dump {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print one attribute value ("?" if absent)
    Get {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
    },
    /// Set one attribute and rewrite the header (body preserved)
    Set {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
    },
    /// Refresh date (and LAST_DECAYED_TIME with --decayed) and rewrite the header
    Touch {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        decayed: bool,
    },
    /// Print codec counters; with --path, decode that file first
    Metrics {
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
