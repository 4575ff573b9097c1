//! Kubeconfig resolution.
//!
//! Inline kubeconfig content is materialized into a temporary file that lives
//! exactly as long as the [`ResolvedKubeconfig`] returned for one operation.

use std::{
	env,
	io::{self, Write},
	path::{Path, PathBuf},
};

use tempfile::{NamedTempFile, TempPath};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ProviderConfig;

const TEMP_PREFIX: &str = "kubeconfig_";

#[derive(Debug, Error)]
pub enum KubeconfigError {
	#[error(
		"both kubeconfig and kubeconfig_content are defined, please use only one of the parameters"
	)]
	Conflict,

	#[error("creating a kubeconfig file")]
	Create(#[source] io::Error),

	#[error("writing kubeconfig to file")]
	Write(#[source] io::Error),

	#[error("completion of write to kubeconfig file")]
	Close(#[source] io::Error),
}

/// Kubeconfig location for the duration of one operation.
///
/// Dropping it removes the temporary file, if one was written.
#[derive(Debug, Default)]
pub struct ResolvedKubeconfig {
	path: Option<PathBuf>,
	temp: Option<TempPath>,
}

impl ResolvedKubeconfig {
	/// Path to pass as `--kubeconfig`, or `None` to let kubectl use its defaults.
	pub fn path(&self) -> Option<&Path> {
		self.temp.as_deref().or(self.path.as_deref())
	}

	/// Whether the file is a temporary copy of inline content.
	pub fn is_temporary(&self) -> bool {
		self.temp.is_some()
	}
}

impl Drop for ResolvedKubeconfig {
	fn drop(&mut self) {
		let Some(temp) = self.temp.take() else {
			return;
		};
		let path = temp.to_path_buf();
		match temp.close() {
			Ok(()) => debug!(path = %path.display(), "removed temporary kubeconfig"),
			Err(e) => warn!(path = %path.display(), error = %e, "failed to remove temporary kubeconfig"),
		}
	}
}

/// Determine which kubeconfig file kubectl should use.
pub fn resolve(config: &ProviderConfig) -> Result<ResolvedKubeconfig, KubeconfigError> {
	match (config.kubeconfig(), config.kubeconfig_content()) {
		(Some(_), Some(_)) => Err(KubeconfigError::Conflict),
		(None, Some(content)) => {
			let temp = write_temporary(content)?;
			debug!(path = %temp.display(), "wrote inline kubeconfig");
			Ok(ResolvedKubeconfig {
				path: None,
				temp: Some(temp),
			})
		}
		(path, None) => Ok(ResolvedKubeconfig {
			path: path.map(PathBuf::from),
			temp: None,
		}),
	}
}

fn write_temporary(content: &str) -> Result<TempPath, KubeconfigError> {
	write_temporary_in(&env::temp_dir(), content)
}

fn write_temporary_in(dir: &Path, content: &str) -> Result<TempPath, KubeconfigError> {
	let file = tempfile::Builder::new()
		.prefix(TEMP_PREFIX)
		.tempfile_in(dir)
		.map_err(KubeconfigError::Create)?;
	finish(file, content)
}

// On error the file is unlinked when `file` drops.
fn finish<F: Write>(
	mut file: NamedTempFile<F>,
	content: &str,
) -> Result<TempPath, KubeconfigError> {
	file.write_all(content.as_bytes()).map_err(KubeconfigError::Write)?;
	file.flush().map_err(KubeconfigError::Close)?;
	Ok(file.into_temp_path())
}
