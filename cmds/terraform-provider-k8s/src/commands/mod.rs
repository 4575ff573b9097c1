//! Command handlers, one per lifecycle operation.

use std::{
	fs, io,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Args;

use crate::{config::ProviderConfig, resource::Manifest};

pub mod create;
pub mod delete;
pub mod read;
pub mod update;

/// Provider settings, overriding the config file.
#[derive(Args, Debug, Default)]
pub struct ProviderArgs {
	/// Provider config file. Defaults to the nearest .k8s-provider.yaml
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// Path to the kubeconfig file
	#[arg(long)]
	pub kubeconfig: Option<String>,

	/// Kubeconfig content, written to a temporary file for the operation
	#[arg(long)]
	pub kubeconfig_content: Option<String>,

	/// Kubeconfig context to use
	#[arg(long)]
	pub kubeconfig_context: Option<String>,

	/// kubectl binary to run
	#[arg(long)]
	pub kubectl: Option<PathBuf>,
}

impl ProviderArgs {
	/// Resolve the provider config relative to the working directory.
	pub fn load(&self) -> Result<ProviderConfig> {
		let cwd = std::env::current_dir().context("determining working directory")?;
		self.load_from(&cwd)
	}

	pub fn load_from(&self, dir: &Path) -> Result<ProviderConfig> {
		let mut config = match &self.config {
			Some(path) => ProviderConfig::load_from_file(path)?,
			None => ProviderConfig::load_from_directory(dir)?.unwrap_or_default(),
		};

		config.merge_from(ProviderConfig {
			kubeconfig: self.kubeconfig.clone(),
			kubeconfig_content: self.kubeconfig_content.clone(),
			kubeconfig_context: self.kubeconfig_context.clone(),
			kubectl: self.kubectl.clone(),
		});
		Ok(config)
	}
}

/// Fields identifying the managed object.
#[derive(Args, Debug)]
pub struct IdentityArgs {
	/// metadata.name of the object
	#[arg(long)]
	pub name: String,

	/// metadata.namespace of the object, omit for cluster-wide kinds
	#[arg(long)]
	pub namespace: Option<String>,

	/// Kind of the object
	#[arg(long)]
	pub kind: String,
}

impl IdentityArgs {
	pub fn into_manifest(self, content: String) -> Manifest {
		Manifest {
			name: self.name,
			namespace: self.namespace,
			kind: self.kind,
			content,
		}
	}
}

/// Where the manifest document comes from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ContentArgs {
	/// Manifest as YAML or JSON
	#[arg(long)]
	pub content: Option<String>,

	/// File holding the manifest, `-` for stdin
	#[arg(long)]
	pub content_file: Option<PathBuf>,
}

impl ContentArgs {
	pub fn read(&self) -> Result<String> {
		match (&self.content, &self.content_file) {
			(Some(content), _) => Ok(content.clone()),
			(None, Some(path)) if path.as_os_str() == "-" => {
				io::read_to_string(io::stdin()).context("reading content from stdin")
			}
			(None, Some(path)) => fs::read_to_string(path)
				.with_context(|| format!("reading content file {}", path.display())),
			(None, None) => anyhow::bail!("one of --content or --content-file is required"),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use tempfile::TempDir;

	use super::*;
	use crate::config::CONFIG_FILE_NAME;

	#[test]
	fn test_flags_override_discovered_file() {
		let temp = TempDir::new().unwrap();
		fs::write(
			temp.path().join(CONFIG_FILE_NAME),
			"kubeconfig: /from/file\nkubeconfig_context: file-context\n",
		)
		.unwrap();
		let args = ProviderArgs {
			kubeconfig_context: Some("flag-context".to_owned()),
			..ProviderArgs::default()
		};

		let config = args.load_from(temp.path()).unwrap();

		assert_eq!(config.kubeconfig(), Some("/from/file"));
		assert_eq!(config.context(), Some("flag-context"));
	}

	#[test]
	fn test_explicit_config_file() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join("provider.yaml");
		fs::write(&path, "kubectl: /usr/local/bin/kubectl\n").unwrap();
		let args = ProviderArgs {
			config: Some(path),
			..ProviderArgs::default()
		};

		let config = args.load_from(Path::new("/")).unwrap();

		assert_eq!(config.kubectl(), Path::new("/usr/local/bin/kubectl"));
	}

	#[test]
	fn test_missing_explicit_config_file() {
		let args = ProviderArgs {
			config: Some(PathBuf::from("/nonexistent/provider.yaml")),
			..ProviderArgs::default()
		};

		let err = args.load_from(Path::new("/")).unwrap_err();
		assert!(err.to_string().starts_with("failed to read config file"));
	}

	#[test]
	fn test_content_from_file() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join("manifest.yaml");
		fs::write(&path, "data:\n  a: b\n").unwrap();
		let args = ContentArgs {
			content: None,
			content_file: Some(path),
		};

		assert_eq!(args.read().unwrap(), "data:\n  a: b\n");
	}
}
