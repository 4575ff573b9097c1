//! Provider configuration.
//!
//! Settings come from a `.k8s-provider.yaml` file, searched from the working
//! directory upward to the filesystem root, overlaid with command-line flags.

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

/// The name of the config file looked up in the directory hierarchy
pub const CONFIG_FILE_NAME: &str = ".k8s-provider.yaml";

/// Default client binary, resolved through `PATH`
pub const DEFAULT_KUBECTL: &str = "kubectl";

/// Provider-level settings shared by every resource operation.
///
/// Empty strings are treated the same as unset values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
	/// Path to a kubeconfig file
	#[serde(default)]
	pub kubeconfig: Option<String>,

	/// Inline kubeconfig, written to a temporary file for each operation
	#[serde(default)]
	pub kubeconfig_content: Option<String>,

	/// Context to select from the kubeconfig
	#[serde(default)]
	pub kubeconfig_context: Option<String>,

	/// kubectl binary to run
	#[serde(default)]
	pub kubectl: Option<PathBuf>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
	value.as_deref().filter(|v| !v.is_empty())
}

impl ProviderConfig {
	pub fn kubeconfig(&self) -> Option<&str> {
		non_empty(&self.kubeconfig)
	}

	pub fn kubeconfig_content(&self) -> Option<&str> {
		non_empty(&self.kubeconfig_content)
	}

	pub fn context(&self) -> Option<&str> {
		non_empty(&self.kubeconfig_context)
	}

	pub fn kubectl(&self) -> &Path {
		self.kubectl
			.as_deref()
			.filter(|p| !p.as_os_str().is_empty())
			.unwrap_or_else(|| Path::new(DEFAULT_KUBECTL))
	}

	/// Load config by searching from the given directory upward
	pub fn load_from_directory(start_dir: &Path) -> Result<Option<Self>> {
		find_config_file(start_dir)
			.map(|path| Self::load_from_file(&path))
			.transpose()
	}

	/// Load config from a specific file path
	pub fn load_from_file(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)
			.with_context(|| format!("failed to read config file: {}", path.display()))?;
		if content.trim().is_empty() {
			return Ok(Self::default());
		}
		serde_yaml_with_quirks::from_str(&content)
			.with_context(|| format!("failed to parse config file: {}", path.display()))
	}

	/// Overlay values set in `overrides` onto this config
	pub fn merge_from(&mut self, overrides: ProviderConfig) {
		if overrides.kubeconfig.is_some() {
			self.kubeconfig = overrides.kubeconfig;
		}
		if overrides.kubeconfig_content.is_some() {
			self.kubeconfig_content = overrides.kubeconfig_content;
		}
		if overrides.kubeconfig_context.is_some() {
			self.kubeconfig_context = overrides.kubeconfig_context;
		}
		if overrides.kubectl.is_some() {
			self.kubectl = overrides.kubectl;
		}
	}
}

/// Search for a config file starting from `start_dir` and walking up to the filesystem root
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
	let start = start_dir
		.canonicalize()
		.unwrap_or_else(|_| start_dir.to_path_buf());

	start
		.ancestors()
		.map(|dir| dir.join(CONFIG_FILE_NAME))
		.find(|candidate| candidate.is_file())
}
