//! Running the kubectl client.
//!
//! [`Invocation`] describes what to run, [`CommandRunner`] runs it. The real
//! runner is [`ProcessRunner`], which spawns a child process with an explicit
//! environment snapshot instead of inheriting ambient state.

use std::{
	ffi::{OsStr, OsString},
	io::{self, Write},
	path::{Path, PathBuf},
	process::{Command, Stdio},
	thread,
};

use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from running a kubectl command.
#[derive(Debug, Error)]
pub enum CommandError {
	#[error("running {command}")]
	Spawn {
		command: String,
		#[source]
		source: io::Error,
	},

	#[error("{command}: {}{}", describe_exit(.code), stderr_suffix(.stderr))]
	Failed {
		command: String,
		/// Exit code, `None` when killed by a signal.
		code: Option<i32>,
		stderr: String,
	},

	#[error("communicating with {command}")]
	Io {
		command: String,
		#[source]
		source: io::Error,
	},
}

fn describe_exit(code: &Option<i32>) -> String {
	match code {
		Some(code) => format!("exit status {code}"),
		None => "terminated by signal".to_owned(),
	}
}

fn stderr_suffix(stderr: &str) -> String {
	let stderr = stderr.trim_end();
	if stderr.is_empty() {
		String::new()
	} else {
		format!(": {stderr}")
	}
}

/// Environment variables handed to a child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
	vars: Vec<(OsString, OsString)>,
}

impl Environment {
	/// Snapshot the environment of the current process.
	pub fn capture() -> Self {
		Self {
			vars: std::env::vars_os().collect(),
		}
	}

	/// Set `key`, replacing any previous value.
	pub fn with(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
		let key = key.into();
		self.vars.retain(|(k, _)| *k != key);
		self.vars.push((key, value.into()));
		self
	}

	pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
		self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
	}
}

/// A single kubectl call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
	args: Vec<OsString>,
	stdin: Option<String>,
	capture_stdout: bool,
}

impl Invocation {
	/// Build the argument vector
	/// `[--kubeconfig <path>] [--context <name>] <operation args...>`.
	pub fn new<I, S>(kubeconfig: Option<&Path>, context: Option<&str>, operation: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<OsString>,
	{
		let mut args = Vec::new();
		if let Some(path) = kubeconfig {
			args.push("--kubeconfig".into());
			args.push(path.as_os_str().to_owned());
		}
		if let Some(context) = context {
			args.push("--context".into());
			args.push(context.into());
		}
		args.extend(operation.into_iter().map(Into::into));

		Self {
			args,
			stdin: None,
			capture_stdout: false,
		}
	}

	/// Pipe `input` to the command's standard input.
	pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
		self.stdin = Some(input.into());
		self
	}

	/// Collect standard output instead of discarding it.
	pub fn capturing_stdout(mut self) -> Self {
		self.capture_stdout = true;
		self
	}

	pub fn args(&self) -> &[OsString] {
		&self.args
	}

	pub fn stdin(&self) -> Option<&str> {
		self.stdin.as_deref()
	}

	pub fn captures_stdout(&self) -> bool {
		self.capture_stdout
	}

	/// Value following `flag` in the argument vector.
	pub fn flag_value(&self, flag: &str) -> Option<&OsStr> {
		self.args
			.iter()
			.position(|a| a == flag)
			.and_then(|i| self.args.get(i + 1))
			.map(OsString::as_os_str)
	}

	/// Render the command line for diagnostics.
	pub fn command_line(&self, program: &Path) -> String {
		std::iter::once(program.as_os_str())
			.chain(self.args.iter().map(OsString::as_os_str))
			.map(OsStr::to_string_lossy)
			.collect::<Vec<_>>()
			.join(" ")
	}
}

/// Executes kubectl invocations.
pub trait CommandRunner {
	/// Run to completion, returning captured standard output.
	///
	/// Output is empty unless the invocation asked for it.
	fn run(&self, invocation: &Invocation) -> Result<String, CommandError>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
	program: PathBuf,
	env: Environment,
}

impl ProcessRunner {
	pub fn new(program: impl Into<PathBuf>, env: Environment) -> Self {
		Self {
			program: program.into(),
			env,
		}
	}
}

impl CommandRunner for ProcessRunner {
	#[instrument(skip_all)]
	fn run(&self, invocation: &Invocation) -> Result<String, CommandError> {
		let command = invocation.command_line(&self.program);
		debug!(command = %command, "running kubectl");

		let mut cmd = Command::new(&self.program);
		cmd.args(invocation.args())
			.env_clear()
			.envs(self.env.iter())
			.stdin(if invocation.stdin().is_some() {
				Stdio::piped()
			} else {
				Stdio::null()
			})
			.stdout(if invocation.captures_stdout() {
				Stdio::piped()
			} else {
				Stdio::null()
			})
			.stderr(Stdio::piped());

		let mut child = cmd.spawn().map_err(|source| CommandError::Spawn {
			command: command.clone(),
			source,
		})?;

		// stdin is written on its own thread while stdout and stderr drain.
		let writer = match (invocation.stdin(), child.stdin.take()) {
			(Some(input), Some(mut stdin)) => {
				let input = input.to_owned();
				Some(thread::spawn(move || stdin.write_all(input.as_bytes())))
			}
			_ => None,
		};

		let output = child
			.wait_with_output()
			.map_err(|source| CommandError::Io {
				command: command.clone(),
				source,
			})?;

		let written = writer.map_or(Ok(()), |handle| {
			handle
				.join()
				.unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")))
		});

		if !output.status.success() {
			return Err(CommandError::Failed {
				command,
				code: output.status.code(),
				stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
			});
		}
		written.map_err(|source| CommandError::Io {
			command: command.clone(),
			source,
		})?;

		debug!(command = %command, "kubectl finished");
		Ok(String::from_utf8_lossy(&output.stdout).into_owned())
	}
}
