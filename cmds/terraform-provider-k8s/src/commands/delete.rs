//! Delete command handler.

use anyhow::{Context, Result};
use clap::Args;

use super::{IdentityArgs, ProviderArgs};
use crate::{provider::Provider, resource::ResourceData};

#[derive(Args, Debug)]
pub struct DeleteArgs {
	#[command(flatten)]
	pub provider: ProviderArgs,

	#[command(flatten)]
	pub identity: IdentityArgs,
}

/// Run the delete command.
pub fn run(args: DeleteArgs) -> Result<()> {
	let provider = Provider::new(args.provider.load()?);
	let resource = ResourceData::new(args.identity.into_manifest(String::new()));

	provider
		.delete(&resource)
		.with_context(|| format!("deleting {}", resource.manifest.id()))
}
