mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Backend, Config, Namespace, Security, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if !cfg.backend.url.starts_with("http") {
		return Err(Error::Validation {
			message: "backend.url must be an http(s) URL.".to_string(),
		});
	}
	if cfg.backend.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backend.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.backend.startup_backoff_ms.is_empty() {
		return Err(Error::Validation {
			message: "backend.startup_backoff_ms must be non-empty.".to_string(),
		});
	}
	if cfg.backend.query_shards == 0 {
		return Err(Error::Validation {
			message: "backend.query_shards must be greater than zero.".to_string(),
		});
	}
	if cfg.namespace.system_prefix.trim().is_empty() {
		return Err(Error::Validation {
			message: "namespace.system_prefix must be non-empty.".to_string(),
		});
	}
	if cfg.namespace.system_separator.chars().count() != 1 {
		return Err(Error::Validation {
			message: "namespace.system_separator must be exactly one character.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	while cfg.backend.url.ends_with('/') {
		cfg.backend.url.pop();
	}
}
