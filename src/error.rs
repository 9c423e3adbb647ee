//! 错误类型
//!
//! 远端接口、配置、导出各自一个错误枚举

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 商品接口错误
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid api url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported scheme {scheme} in api url {url}")]
    UnsupportedScheme { url: String, scheme: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with status {status}")]
    Status { status: u16 },
    #[error("failed to decode response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// CSV 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
