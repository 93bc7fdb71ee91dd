//! Config - 起動オプション
//!
//! すべてのフラグは環境変数からも読めます。
//! ログの詳細度は `RUST_LOG` で指定します（logging.rs）。

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "roster-server", version, about = "Record management HTTP service")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "ROSTER_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Keep whatever the store holds instead of resetting it to the demo records.
    #[arg(long, env = "ROSTER_NO_SEED")]
    pub no_seed: bool,

    #[arg(long, env = "ROSTER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}
