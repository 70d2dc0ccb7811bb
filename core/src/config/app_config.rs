//! Application configuration

use super::default_data_dir;
use crate::config::migration::Migrate;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const CONFIG_FILE_NAME: &str = "favorites-config.json";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesConfig {
	/// Config schema version
	pub version: u32,

	/// Data directory path
	pub data_dir: PathBuf,

	/// Logging level
	pub log_level: String,

	/// File name of the favorites store, relative to `data_dir`
	#[serde(default = "default_store_file")]
	pub store_file: String,

	/// Keep an unreadable store as `<store_file>.bak` instead of losing it
	#[serde(default = "default_true")]
	pub backup_corrupt_store: bool,

	/// Moved file search configuration
	#[serde(default)]
	pub search: SearchConfig,

	/// Filesystem watcher configuration
	#[serde(default)]
	pub watcher: WatcherConfig,
}

/// Configuration for the moved file search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
	/// Directories to search instead of the platform defaults
	#[serde(default)]
	pub roots: Option<Vec<PathBuf>>,

	/// How many levels below each root are searched
	#[serde(default = "default_max_depth")]
	pub max_depth: usize,
}

impl Default for SearchConfig {
	fn default() -> Self {
		Self {
			roots: None,
			max_depth: default_max_depth(),
		}
	}
}

/// Configuration for the filesystem watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
	/// Whether favorites are followed across renames automatically
	pub enabled: bool,

	/// How often pending rename halves are checked, in milliseconds
	pub tick_interval_ms: u64,

	/// How long half of a rename waits for its other half, in milliseconds
	pub rename_timeout_ms: u64,
}

impl WatcherConfig {
	pub fn tick_interval(&self) -> Duration {
		Duration::from_millis(self.tick_interval_ms)
	}

	pub fn rename_timeout(&self) -> Duration {
		Duration::from_millis(self.rename_timeout_ms)
	}
}

impl Default for WatcherConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			tick_interval_ms: 100,
			rename_timeout_ms: 500,
		}
	}
}

fn default_store_file() -> String {
	"favorites.json".to_string()
}

fn default_true() -> bool {
	true
}

fn default_max_depth() -> usize {
	5
}

impl FavoritesConfig {
	/// Load configuration from the default location
	pub fn load() -> Result<Self> {
		let data_dir = default_data_dir()?;
		Self::load_from(&data_dir)
	}

	/// Load configuration from a specific data directory
	pub fn load_from(data_dir: &Path) -> Result<Self> {
		let config_path = data_dir.join(CONFIG_FILE_NAME);

		if config_path.exists() {
			info!("Loading config from {:?}", config_path);
			let json = fs::read_to_string(&config_path)?;
			let mut config: FavoritesConfig = serde_json::from_str(&json)?;

			// Apply migrations if needed
			if config.needs_migration() {
				info!(
					"Migrating config from v{} to v{}",
					config.version,
					Self::target_version()
				);
				config.migrate()?;
				config.save()?;
			}

			Ok(config)
		} else {
			warn!("No config found, creating default at {:?}", config_path);
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			Ok(config)
		}
	}

	/// Load or create configuration
	pub fn load_or_create(data_dir: &Path) -> Result<Self> {
		Self::load_from(data_dir).or_else(|e| {
			warn!("Failed to load config, falling back to defaults: {e:#}");
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			Ok(config)
		})
	}

	/// Create default configuration with specific data directory
	pub fn default_with_dir(data_dir: PathBuf) -> Self {
		Self {
			version: Self::target_version(),
			data_dir,
			log_level: "info".to_string(),
			store_file: default_store_file(),
			backup_corrupt_store: true,
			search: SearchConfig::default(),
			watcher: WatcherConfig::default(),
		}
	}

	/// Save configuration to disk
	pub fn save(&self) -> Result<()> {
		// Ensure directory exists
		fs::create_dir_all(&self.data_dir)?;

		let config_path = self.data_dir.join(CONFIG_FILE_NAME);
		let json = serde_json::to_string_pretty(self)?;
		fs::write(&config_path, json)?;
		info!("Saved config to {:?}", config_path);
		Ok(())
	}

	/// Where the favorites store lives
	pub fn store_path(&self) -> PathBuf {
		self.data_dir.join(&self.store_file)
	}
}

impl Default for FavoritesConfig {
	fn default() -> Self {
		let data_dir = default_data_dir().unwrap_or_else(|_| PathBuf::from("."));
		Self::default_with_dir(data_dir)
	}
}

impl Migrate for FavoritesConfig {
	fn current_version(&self) -> u32 {
		self.version
	}

	fn target_version() -> u32 {
		1 // Current schema version
	}

	fn migrate(&mut self) -> Result<()> {
		match self.version {
			0 => {
				// v0 predates the watcher section, serde defaults already filled it in
				self.version = 1;
				Ok(())
			}
			1 => Ok(()), // Already at target version
			v => Err(anyhow!("Unknown config version: {}", v)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use tempfile::tempdir;

	#[test]
	fn creates_default_config_when_missing() {
		let dir = tempdir().unwrap();

		let config = FavoritesConfig::load_from(dir.path()).unwrap();

		assert_eq!(config.version, FavoritesConfig::target_version());
		assert_eq!(config.search.max_depth, 5);
		assert!(config.backup_corrupt_store);
		assert_eq!(config.store_path(), dir.path().join("favorites.json"));
		assert!(dir.path().join(CONFIG_FILE_NAME).exists());
	}

	#[test]
	fn migrates_old_config_and_fills_defaults() {
		let dir = tempdir().unwrap();
		let legacy = serde_json::json!({
			"version": 0,
			"data_dir": dir.path(),
			"log_level": "debug",
		});
		fs::write(dir.path().join(CONFIG_FILE_NAME), legacy.to_string()).unwrap();

		let config = FavoritesConfig::load_from(dir.path()).unwrap();

		assert_eq!(config.version, 1);
		assert_eq!(config.log_level, "debug");
		assert!(config.watcher.enabled);
		assert_eq!(config.store_file, "favorites.json");
	}

	#[test]
	fn unreadable_config_falls_back_to_defaults() {
		let dir = tempdir().unwrap();
		fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();

		assert!(FavoritesConfig::load_from(dir.path()).is_err());

		let config = FavoritesConfig::load_or_create(dir.path()).unwrap();
		assert_eq!(config.data_dir, dir.path());
		assert_eq!(config.log_level, "info");
	}
}
