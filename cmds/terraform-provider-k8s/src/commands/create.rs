//! Create command handler.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use super::{ContentArgs, IdentityArgs, ProviderArgs};
use crate::{
	kubectl::CommandRunner,
	provider::Provider,
	resource::{Manifest, ResourceData, ResourceId},
};

#[derive(Args, Debug)]
pub struct CreateArgs {
	#[command(flatten)]
	pub provider: ProviderArgs,

	#[command(flatten)]
	pub identity: IdentityArgs,

	#[command(flatten)]
	pub content: ContentArgs,
}

/// Run the create command, printing the new resource id.
pub fn run<W: Write>(args: CreateArgs, writer: W) -> Result<()> {
	let provider = Provider::new(args.provider.load()?);
	let manifest = args.identity.into_manifest(args.content.read()?);
	create(&provider, manifest, writer).map(|_| ())
}

pub fn create<R: CommandRunner, W: Write>(
	provider: &Provider<R>,
	manifest: Manifest,
	mut writer: W,
) -> Result<ResourceId> {
	let mut resource = ResourceData::new(manifest);
	provider
		.create(&mut resource)
		.with_context(|| format!("creating {}", resource.manifest.id()))?;

	let id = resource.id.context("resource created without an id")?;
	writeln!(writer, "{id}")?;
	Ok(id)
}
