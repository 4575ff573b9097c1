use anyhow::Result;
use clap::{Parser, Subcommand};
use terraform_provider_k8s::{commands, telemetry};

#[derive(Parser)]
#[command(name = "terraform-provider-k8s")]
#[command(about = "Manage arbitrary Kubernetes manifests through kubectl", long_about = None)]
#[command(version)]
struct Cli {
	/// Log level (trace, debug, info, warn, error). Falls back to RUST_LOG, then info
	#[arg(long, global = true)]
	log_level: Option<tracing::Level>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Apply a manifest and print its id
	Create(commands::create::CreateArgs),

	/// Check that the object still exists and print the remaining id
	Read(commands::read::ReadArgs),

	/// Re-apply changed manifest content
	Update(commands::update::UpdateArgs),

	/// Delete the object from the cluster
	Delete(commands::delete::DeleteArgs),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	telemetry::init(cli.log_level);

	let stdout = std::io::stdout().lock();

	match cli.command {
		Commands::Create(args) => commands::create::run(args, stdout),
		Commands::Read(args) => commands::read::run(args, stdout),
		Commands::Update(args) => commands::update::run(args),
		Commands::Delete(args) => commands::delete::run(args),
	}
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn test_cli_definition() {
		Cli::command().debug_assert();
	}

	#[test]
	fn test_content_flags_are_exclusive() {
		let result = Cli::try_parse_from([
			"terraform-provider-k8s",
			"create",
			"--name",
			"web",
			"--kind",
			"Service",
			"--content",
			"{}",
			"--content-file",
			"web.yaml",
		]);
		assert!(result.is_err());
	}

	#[test]
	fn test_content_is_required_for_create() {
		let result = Cli::try_parse_from([
			"terraform-provider-k8s",
			"create",
			"--name",
			"web",
			"--kind",
			"Service",
		]);
		assert!(result.is_err());
	}

	#[test]
	fn test_read_parses_id() {
		let cli = Cli::try_parse_from([
			"terraform-provider-k8s",
			"read",
			"--id",
			"Service//web",
			"--log-level",
			"debug",
		])
		.unwrap();

		assert_eq!(cli.log_level, Some(tracing::Level::DEBUG));
		let Commands::Read(args) = cli.command else {
			panic!("expected read command");
		};
		assert_eq!(args.id.unwrap().to_string(), "Service//web");
		assert_eq!(args.name, None);
	}

	#[test]
	fn test_read_rejects_malformed_id() {
		let result = Cli::try_parse_from(["terraform-provider-k8s", "read", "--id", "web"]);
		assert!(result.is_err());
	}
}
