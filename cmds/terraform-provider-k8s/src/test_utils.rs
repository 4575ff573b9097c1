//! Common test utilities.

use std::{
	cell::RefCell,
	collections::VecDeque,
	fs,
	path::{Path, PathBuf},
};

use crate::kubectl::{CommandError, CommandRunner, Invocation};

/// One call observed by [`RecordingRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
	pub args: Vec<String>,
	pub stdin: Option<String>,
	pub captures_stdout: bool,
	/// The `--kubeconfig` file and its content at the time of the call.
	pub kubeconfig: Option<(PathBuf, Option<String>)>,
}

enum Response {
	Stdout(String),
	Fail { code: i32, stderr: String },
}

/// A command runner that records invocations instead of spawning kubectl.
///
/// Responses are consumed in order; once exhausted every call succeeds with
/// empty output.
#[derive(Default)]
pub struct RecordingRunner {
	calls: RefCell<Vec<RecordedCall>>,
	responses: RefCell<VecDeque<Response>>,
}

impl RecordingRunner {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queue a successful response with the given standard output.
	pub fn respond(self, stdout: impl Into<String>) -> Self {
		self.responses
			.borrow_mut()
			.push_back(Response::Stdout(stdout.into()));
		self
	}

	/// Queue a failing response.
	pub fn fail(self, code: i32, stderr: impl Into<String>) -> Self {
		self.responses.borrow_mut().push_back(Response::Fail {
			code,
			stderr: stderr.into(),
		});
		self
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		self.calls.borrow().clone()
	}
}

impl CommandRunner for RecordingRunner {
	fn run(&self, invocation: &Invocation) -> Result<String, CommandError> {
		let kubeconfig = invocation.flag_value("--kubeconfig").map(|path| {
			let path = PathBuf::from(path);
			let content = fs::read_to_string(&path).ok();
			(path, content)
		});

		self.calls.borrow_mut().push(RecordedCall {
			args: invocation
				.args()
				.iter()
				.map(|a| a.to_string_lossy().into_owned())
				.collect(),
			stdin: invocation.stdin().map(ToOwned::to_owned),
			captures_stdout: invocation.captures_stdout(),
			kubeconfig,
		});

		match self.responses.borrow_mut().pop_front() {
			None => Ok(String::new()),
			Some(Response::Stdout(stdout)) if invocation.captures_stdout() => Ok(stdout),
			Some(Response::Stdout(_)) => Ok(String::new()),
			Some(Response::Fail { code, stderr }) => Err(CommandError::Failed {
				command: invocation.command_line(Path::new("kubectl")),
				code: Some(code),
				stderr,
			}),
		}
	}
}
