//! 运行配置
//!
//! 默认值 < 配置文件 (~/.config/catalog-view/config.toml) < 环境变量 < 命令行

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.escuelajs.co/api/v1/products";
pub const API_URL_ENV: &str = "CATALOG_API_URL";

/// 配置文件结构，所有字段可选
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub api_url: Option<String>,
    pub page_size: Option<usize>,
    pub page_sizes: Option<Vec<usize>>,
    pub export_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

/// 合并后的运行配置
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub page_size: usize,
    pub page_sizes: Vec<usize>,
    pub export_dir: PathBuf,
    pub request_timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: 10,
            page_sizes: vec![5, 10, 20, 50],
            export_dir: PathBuf::from("."),
            request_timeout: Duration::from_secs(30),
            log_file: None,
        }
    }
}

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub page_size: Option<usize>,
    pub export_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// 用配置文件覆盖默认值
    pub fn merge_file(&mut self, file: FileSettings) {
        if let Some(v) = file.api_url {
            self.api_url = v;
        }
        if let Some(v) = file.page_sizes {
            let sizes: Vec<usize> = v.into_iter().filter(|n| *n > 0).collect();
            if !sizes.is_empty() {
                self.page_sizes = sizes;
            }
        }
        if let Some(v) = file.page_size {
            self.page_size = v;
        }
        if let Some(v) = file.export_dir {
            self.export_dir = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.log_file {
            self.log_file = Some(v);
        }
    }

    pub fn merge_env_api_url(&mut self, value: Option<String>) {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            self.api_url = v;
        }
    }

    pub fn merge_overrides(&mut self, overrides: Overrides) {
        if let Some(v) = overrides.api_url {
            self.api_url = v;
        }
        if let Some(v) = overrides.page_size {
            self.page_size = v;
        }
        if let Some(v) = overrides.export_dir {
            self.export_dir = v;
        }
        if let Some(v) = overrides.log_file {
            self.log_file = Some(v);
        }
    }

    /// 页大小必须 > 0，且出现在可选列表中
    fn normalize(&mut self) {
        self.page_size = self.page_size.max(1);
        if !self.page_sizes.contains(&self.page_size) {
            self.page_sizes.push(self.page_size);
            self.page_sizes.sort_unstable();
        }
    }
}

/// 默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("catalog-view").join("config.toml"))
}

/// 读取配置文件；文件不存在时返回空配置
pub fn load_file(path: &Path) -> Result<FileSettings, ConfigError> {
    if !path.exists() {
        return Ok(FileSettings::default());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 按优先级合并出最终配置
pub fn load_settings(
    config_path: Option<&Path>,
    overrides: Overrides,
) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    let path = config_path.map(Path::to_path_buf).or_else(default_config_path);
    if let Some(path) = path {
        settings.merge_file(load_file(&path)?);
    }

    settings.merge_env_api_url(std::env::var(API_URL_ENV).ok());
    settings.merge_overrides(overrides);
    settings.normalize();

    Ok(settings)
}
