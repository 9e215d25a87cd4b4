//! Scripted [`ProcessRunner`] for exercising the pipeline without external
//! tools installed.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::process::{ExitStatus, ProcessCommand, ProcessError, ProcessOutput, ProcessRunner};

/// What a scripted program does when invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    Exit(ExitStatus),
    NotFound,
}

/// Responses are queued per program. The last queued response repeats once
/// the queue is down to one entry; unscripted programs are "not found".
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    history: Arc<Mutex<Vec<ProcessCommand>>>,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for `program`.
    pub fn respond(self, program: &str, response: MockResponse) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses
                .entry(program.to_string())
                .or_default()
                .push_back(response);
        }
        self
    }

    pub fn succeed(self, program: &str) -> Self {
        self.respond(program, MockResponse::Exit(ExitStatus::Success))
    }

    pub fn fail(self, program: &str, code: i32) -> Self {
        self.respond(program, MockResponse::Exit(ExitStatus::Error(code)))
    }

    pub fn calls(&self) -> Vec<ProcessCommand> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn calls_to(&self, program: &str) -> Vec<ProcessCommand> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }

    fn next_response(&self, program: &str) -> MockResponse {
        let Ok(mut responses) = self.responses.lock() else {
            return MockResponse::NotFound;
        };
        match responses.get_mut(program) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(MockResponse::NotFound),
            Some(queue) => queue.front().cloned().unwrap_or(MockResponse::NotFound),
            None => MockResponse::NotFound,
        }
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        if let Ok(mut history) = self.history.lock() {
            history.push(command.clone());
        }
        match self.next_response(&command.program) {
            MockResponse::NotFound => Err(ProcessError::CommandNotFound(command.program)),
            MockResponse::Exit(status) => Ok(ProcessOutput {
                stderr: if status.success() {
                    String::new()
                } else {
                    format!("{}: scripted failure", command.program)
                },
                status,
                stdout: String::new(),
                duration: Duration::from_millis(1),
            }),
        }
    }
}
