//! Resource lifecycle.
//!
//! Every operation resolves the kubeconfig afresh, runs one kubectl command
//! and maps the outcome onto the resource state. Nothing is retried; the host
//! decides whether to try again.

use std::ffi::OsString;

use k8s_manifest::MergeError;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
	config::ProviderConfig,
	kubeconfig::{self, KubeconfigError, ResolvedKubeconfig},
	kubectl::{CommandError, CommandRunner, Environment, Invocation, ProcessRunner},
	resource::{Manifest, ResourceData, ResourceId},
};

#[derive(Debug, Error)]
pub enum ResourceError {
	#[error("{0} is required")]
	MissingField(&'static str),

	#[error("cannot change {current} into {desired}: name, namespace and kind are immutable")]
	IdentityChanged {
		current: ResourceId,
		desired: ResourceId,
	},

	#[error("determining kubeconfig")]
	Kubeconfig(#[from] KubeconfigError),

	#[error("processing content")]
	Content(#[from] MergeError),

	#[error(transparent)]
	Command(#[from] CommandError),
}

/// Manages manifests through kubectl.
pub struct Provider<R = ProcessRunner> {
	config: ProviderConfig,
	runner: R,
}

impl Provider {
	/// Provider running the configured kubectl with this process's environment.
	pub fn new(config: ProviderConfig) -> Self {
		let runner = ProcessRunner::new(config.kubectl(), Environment::capture());
		Self { config, runner }
	}
}

impl<R: CommandRunner> Provider<R> {
	pub fn with_runner(config: ProviderConfig, runner: R) -> Self {
		Self { config, runner }
	}

	pub fn runner(&self) -> &R {
		&self.runner
	}

	/// Apply the manifest and record its identity.
	#[instrument(skip_all, fields(id = %resource.manifest.id()))]
	pub fn create(&self, resource: &mut ResourceData) -> Result<(), ResourceError> {
		validate(&resource.manifest)?;
		self.apply(&resource.manifest)?;

		let id = resource.manifest.id();
		info!("created");
		resource.id = Some(id);
		Ok(())
	}

	/// Re-apply changed content. The identity is left as is.
	#[instrument(skip_all, fields(id = %resource.manifest.id()))]
	pub fn update(&self, resource: &ResourceData) -> Result<(), ResourceError> {
		validate(&resource.manifest)?;
		if let Some(current) = &resource.id {
			let desired = resource.manifest.id();
			if *current != desired {
				return Err(ResourceError::IdentityChanged {
					current: current.clone(),
					desired,
				});
			}
		}

		self.apply(&resource.manifest)?;
		info!("updated");
		Ok(())
	}

	/// Check whether the object still exists, clearing the identity if not.
	///
	/// Only existence is checked; the content is not compared.
	#[instrument(skip_all, fields(id = %resource.manifest.id()))]
	pub fn read(&self, resource: &mut ResourceData) -> Result<(), ResourceError> {
		if !resource.manifest.has_identity() {
			debug!("name or kind unknown, nothing to read");
			resource.id = None;
			return Ok(());
		}

		let kubeconfig = kubeconfig::resolve(&self.config)?;
		let mut args = vec!["get".to_owned(), "--ignore-not-found".to_owned()];
		args.extend(resource.manifest.selector_args());

		let stdout = self
			.runner
			.run(&self.invocation(&kubeconfig, args).capturing_stdout())?;

		if stdout.trim().is_empty() {
			debug!("object no longer exists");
			resource.id = None;
		}
		Ok(())
	}

	/// Delete the object. Clearing the identity is up to the caller.
	#[instrument(skip_all, fields(id = %resource.manifest.id()))]
	pub fn delete(&self, resource: &ResourceData) -> Result<(), ResourceError> {
		let kubeconfig = kubeconfig::resolve(&self.config)?;
		let mut args = vec!["delete".to_owned()];
		args.extend(resource.manifest.selector_args());

		self.runner.run(&self.invocation(&kubeconfig, args))?;
		info!("deleted");
		Ok(())
	}

	fn apply(&self, manifest: &Manifest) -> Result<(), ResourceError> {
		let kubeconfig = kubeconfig::resolve(&self.config)?;
		let document = k8s_manifest::merge(
			&manifest.content,
			&manifest.name,
			manifest.namespace(),
			&manifest.kind,
		)?;

		let invocation = self
			.invocation(&kubeconfig, ["apply", "-f", "-"])
			.with_stdin(document);
		self.runner.run(&invocation)?;
		Ok(())
	}

	fn invocation<I, S>(&self, kubeconfig: &ResolvedKubeconfig, operation: I) -> Invocation
	where
		I: IntoIterator<Item = S>,
		S: Into<OsString>,
	{
		Invocation::new(kubeconfig.path(), self.config.context(), operation)
	}
}

fn validate(manifest: &Manifest) -> Result<(), ResourceError> {
	if manifest.name.is_empty() {
		return Err(ResourceError::MissingField("name"));
	}
	if manifest.kind.is_empty() {
		return Err(ResourceError::MissingField("kind"));
	}
	Ok(())
}
