//! Read command handler.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use super::ProviderArgs;
use crate::{
	kubectl::CommandRunner,
	provider::Provider,
	resource::{Manifest, ResourceData, ResourceId},
};

#[derive(Args, Debug)]
pub struct ReadArgs {
	#[command(flatten)]
	pub provider: ProviderArgs,

	/// Current resource id
	#[arg(long)]
	pub id: Option<ResourceId>,

	/// metadata.name of the object, unknown for freshly imported state
	#[arg(long)]
	pub name: Option<String>,

	/// metadata.namespace of the object
	#[arg(long)]
	pub namespace: Option<String>,

	/// Kind of the object, unknown for freshly imported state
	#[arg(long)]
	pub kind: Option<String>,
}

/// Run the read command, printing the id that remains after the refresh.
///
/// An empty line means the object is gone.
pub fn run<W: Write>(args: ReadArgs, writer: W) -> Result<()> {
	let provider = Provider::new(args.provider.load()?);
	let manifest = Manifest {
		name: args.name.unwrap_or_default(),
		namespace: args.namespace,
		kind: args.kind.unwrap_or_default(),
		content: String::new(),
	};
	read(&provider, manifest, args.id, writer).map(|_| ())
}

pub fn read<R: CommandRunner, W: Write>(
	provider: &Provider<R>,
	manifest: Manifest,
	id: Option<ResourceId>,
	mut writer: W,
) -> Result<Option<ResourceId>> {
	let mut resource = ResourceData { id, manifest };
	provider
		.read(&mut resource)
		.with_context(|| format!("reading {}", resource.manifest.id()))?;

	match &resource.id {
		Some(id) => writeln!(writer, "{id}")?,
		None => writeln!(writer)?,
	}
	Ok(resource.id)
}
