//! Update command handler.

use anyhow::{Context, Result};
use clap::Args;

use super::{ContentArgs, IdentityArgs, ProviderArgs};
use crate::{
	provider::Provider,
	resource::{ResourceData, ResourceId},
};

#[derive(Args, Debug)]
pub struct UpdateArgs {
	#[command(flatten)]
	pub provider: ProviderArgs,

	/// Current resource id, checked against the identity flags
	#[arg(long)]
	pub id: Option<ResourceId>,

	#[command(flatten)]
	pub identity: IdentityArgs,

	#[command(flatten)]
	pub content: ContentArgs,
}

/// Run the update command.
pub fn run(args: UpdateArgs) -> Result<()> {
	let provider = Provider::new(args.provider.load()?);
	let manifest = args.identity.into_manifest(args.content.read()?);

	let mut resource = ResourceData::new(manifest);
	resource.id = args.id;

	provider
		.update(&resource)
		.with_context(|| format!("updating {}", resource.manifest.id()))
}
