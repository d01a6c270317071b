// ABOUTME: Process supervisor owning one backend child process from spawn to reap
// ABOUTME: Streams stdout lines as Token events, honors cancellation, maps failures to AgentError

use crate::backend::CommandLine;
use crate::error::AgentError;
use crate::types::StreamEvent;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command as ProcessCommand};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Upper bound on captured stderr kept for the error message.
const STDERR_LIMIT: usize = 64 * 1024;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Timing knobs for one supervised invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorSettings {
    /// How long a terminated child gets to exit before it is killed.
    pub grace_period: Duration,
    /// Hard bound on waiting for a killed child to be reaped.
    pub kill_timeout: Duration,
    /// Whole-request limit. `None` means no limit.
    pub timeout: Option<Duration>,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(2),
            kill_timeout: Duration::from_secs(2),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Spawning,
    Streaming,
    Finished,
    Failed,
    Cancelled,
}

impl SupervisorState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SupervisorState::Finished | SupervisorState::Failed | SupervisorState::Cancelled
        )
    }
}

/// How a supervised invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    Failed(AgentError),
    Cancelled,
}

impl Outcome {
    /// The event that closes the stream for this outcome. Cancellation has none.
    pub fn terminal_event(&self) -> Option<StreamEvent> {
        match self {
            Outcome::Finished => Some(StreamEvent::Final),
            Outcome::Failed(err) => Some(StreamEvent::Error(err.clone())),
            Outcome::Cancelled => None,
        }
    }
}

enum Interrupt {
    Cancelled,
    TimedOut,
    ReceiverClosed,
}

enum StreamEnd {
    Eof,
    Interrupted(Interrupt),
    ReadFailed(std::io::Error),
}

/// Supervises a single backend process.
///
/// Tokens are sent on the event channel as they arrive; the terminal event is
/// returned as an [`Outcome`] so the caller can release session resources
/// before publishing it.
pub struct ProcessSupervisor {
    agent: String,
    settings: SupervisorSettings,
    state: SupervisorState,
}

impl ProcessSupervisor {
    pub fn new(agent: impl Into<String>, settings: SupervisorSettings) -> Self {
        Self {
            agent: agent.into(),
            settings,
            state: SupervisorState::Idle,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    fn transition(&mut self, next: SupervisorState) {
        tracing::debug!(agent = %self.agent, from = ?self.state, to = ?next, "Supervisor state");
        self.state = next;
    }

    fn fail(&mut self, err: AgentError) -> Outcome {
        self.transition(SupervisorState::Failed);
        Outcome::Failed(err)
    }

    /// Spawn `command`, stream its stdout, and reap it.
    ///
    /// The child is never left running when this returns.
    pub async fn run(
        &mut self,
        command: &CommandLine,
        cancel: &CancellationToken,
        events: &mpsc::Sender<StreamEvent>,
    ) -> Outcome {
        if self.state != SupervisorState::Idle {
            return Outcome::Failed(AgentError::Spawn {
                name: self.agent.clone(),
                reason: "supervisor already started".to_string(),
            });
        }

        self.transition(SupervisorState::Spawning);
        let mut child = match spawn_child(command) {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(agent = %self.agent, error = %e, "Failed to spawn backend");
                let err = AgentError::Spawn {
                    name: self.agent.clone(),
                    reason: e.to_string(),
                };
                return self.fail(err);
            }
        };
        let pid = child.id();
        tracing::debug!(
            agent = %self.agent,
            pid = ?pid,
            argc = command.argv.len(),
            "Spawned backend"
        );

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                self.terminate(&mut child, pid).await;
                let err = AgentError::Stream {
                    name: self.agent.clone(),
                    reason: "failed to capture output pipes".to_string(),
                };
                return self.fail(err);
            }
        };

        let mut stderr_task = tokio::spawn(collect_stderr(stderr, self.agent.clone()));
        self.transition(SupervisorState::Streaming);

        let deadline = self.settings.timeout.map(|t| Instant::now() + t);
        let end = stream_stdout(stdout, cancel, events, deadline).await;

        let interrupt = match end {
            StreamEnd::Eof => {
                let waited = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(Interrupt::Cancelled),
                    _ = sleep_until(deadline) => Err(Interrupt::TimedOut),
                    _ = events.closed() => Err(Interrupt::ReceiverClosed),
                    status = child.wait() => Ok(status),
                };
                match waited {
                    Ok(Ok(status)) => {
                        let captured = match tokio::time::timeout(
                            self.settings.kill_timeout,
                            &mut stderr_task,
                        )
                        .await
                        {
                            Ok(Ok(captured)) => captured,
                            Ok(Err(e)) => {
                                tracing::warn!(error = %e, "stderr reader task failed to complete");
                                String::new()
                            }
                            Err(_) => {
                                stderr_task.abort();
                                String::new()
                            }
                        };
                        if status.success() {
                            self.transition(SupervisorState::Finished);
                            return Outcome::Finished;
                        }
                        tracing::debug!(agent = %self.agent, code = ?status.code(), "Backend exited with failure");
                        let err = AgentError::process(self.agent.clone(), status.code(), &captured);
                        return self.fail(err);
                    }
                    Ok(Err(e)) => {
                        stderr_task.abort();
                        self.terminate(&mut child, pid).await;
                        let err = AgentError::Stream {
                            name: self.agent.clone(),
                            reason: e.to_string(),
                        };
                        return self.fail(err);
                    }
                    Err(interrupt) => interrupt,
                }
            }
            StreamEnd::Interrupted(interrupt) => interrupt,
            StreamEnd::ReadFailed(e) => {
                tracing::warn!(agent = %self.agent, error = %e, "Failed reading backend output");
                stderr_task.abort();
                self.terminate(&mut child, pid).await;
                let err = AgentError::Stream {
                    name: self.agent.clone(),
                    reason: e.to_string(),
                };
                return self.fail(err);
            }
        };

        stderr_task.abort();
        self.terminate(&mut child, pid).await;

        match interrupt {
            Interrupt::TimedOut => {
                let secs = self.settings.timeout.map(|t| t.as_secs()).unwrap_or_default();
                tracing::error!(agent = %self.agent, timeout_secs = secs, "Backend timed out");
                let err = AgentError::Timeout {
                    name: self.agent.clone(),
                    secs,
                };
                self.fail(err)
            }
            Interrupt::Cancelled | Interrupt::ReceiverClosed => {
                self.transition(SupervisorState::Cancelled);
                Outcome::Cancelled
            }
        }
    }

    /// Terminate gracefully, escalating to a kill after the grace period.
    /// Bounded by `grace_period + kill_timeout`.
    async fn terminate(&self, child: &mut Child, pid: Option<u32>) {
        if let Ok(Some(_)) = child.try_wait() {
            sweep_process_group(pid);
            return;
        }

        request_exit(child, pid);
        match tokio::time::timeout(self.settings.grace_period, child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!(agent = %self.agent, status = ?status, "Backend exited after terminate");
                sweep_process_group(pid);
                return;
            }
            Ok(Err(e)) => {
                tracing::warn!(agent = %self.agent, error = %e, "Failed waiting for backend exit");
            }
            Err(_) => {
                tracing::warn!(
                    agent = %self.agent,
                    grace_ms = self.settings.grace_period.as_millis() as u64,
                    "Backend ignored terminate, killing"
                );
            }
        }

        force_kill(child, pid);
        if tokio::time::timeout(self.settings.kill_timeout, child.wait())
            .await
            .is_err()
        {
            tracing::error!(agent = %self.agent, pid = ?pid, "Backend could not be reaped after kill");
        }
    }
}

fn spawn_child(command: &CommandLine) -> std::io::Result<Child> {
    let mut cmd = ProcessCommand::new(command.program());
    cmd.args(command.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group so terminate reaches wrapper-script children too.
    #[cfg(unix)]
    cmd.process_group(0);

    #[cfg(windows)]
    if command.needs_hidden_window {
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    cmd.spawn()
}

async fn stream_stdout(
    stdout: ChildStdout,
    cancel: &CancellationToken,
    events: &mpsc::Sender<StreamEvent>,
    deadline: Option<Instant>,
) -> StreamEnd {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();

    loop {
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => return StreamEnd::Interrupted(Interrupt::Cancelled),
            _ = sleep_until(deadline) => return StreamEnd::Interrupted(Interrupt::TimedOut),
            _ = events.closed() => {
                tracing::debug!("Event receiver closed while waiting for output");
                return StreamEnd::Interrupted(Interrupt::ReceiverClosed);
            }
            read = reader.read_until(b'\n', &mut buf) => read,
        };

        match read {
            Ok(0) => return StreamEnd::Eof,
            Ok(_) => {
                let line = decode_line(&buf);
                buf.clear();
                if line.is_empty() {
                    continue;
                }
                if cancel.is_cancelled() {
                    return StreamEnd::Interrupted(Interrupt::Cancelled);
                }
                let sent = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return StreamEnd::Interrupted(Interrupt::Cancelled),
                    sent = events.send(StreamEvent::Token(line)) => sent,
                };
                if sent.is_err() {
                    tracing::debug!("Event receiver closed, stopping stream");
                    return StreamEnd::Interrupted(Interrupt::ReceiverClosed);
                }
            }
            Err(e) => return StreamEnd::ReadFailed(e),
        }
    }
}

async fn collect_stderr(stderr: ChildStderr, agent: String) -> String {
    read_capped(stderr, &agent).await
}

async fn read_capped<R: AsyncRead + Unpin>(source: R, agent: &str) -> String {
    let mut reader = BufReader::new(source);
    let mut captured = String::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = decode_line(&buf);
                if !line.is_empty() {
                    tracing::debug!(agent = %agent, stderr = %line, "Backend stderr");
                }
                if captured.len() < STDERR_LIMIT {
                    captured.push_str(&line);
                    captured.push('\n');
                }
            }
            Err(e) => {
                tracing::debug!(agent = %agent, error = %e, "stderr read failed");
                break;
            }
        }
    }
    captured
}

/// Strip the line terminator; invalid UTF-8 is replaced, not rejected.
fn decode_line(buf: &[u8]) -> String {
    let mut line = String::from_utf8_lossy(buf).into_owned();
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Signal the process group led by `pid`. The pid is captured at spawn time
/// because `Child::id` is cleared once the leader has been reaped.
#[cfg(unix)]
fn signal_group(pid: Option<u32>, signal: nix::sys::signal::Signal) {
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    if let Some(pid) = pid {
        if let Err(e) = killpg(Pid::from_raw(pid as i32), signal) {
            if e != nix::errno::Errno::ESRCH {
                tracing::debug!(pid, signal = ?signal, error = %e, "Failed to signal process group");
            }
        }
    }
}

#[cfg(unix)]
fn request_exit(_child: &mut Child, pid: Option<u32>) {
    signal_group(pid, nix::sys::signal::Signal::SIGTERM);
}

#[cfg(not(unix))]
fn request_exit(child: &mut Child, _pid: Option<u32>) {
    // No graceful signal here; terminating is the only option.
    let _ = child.start_kill();
}

#[cfg(unix)]
fn force_kill(child: &mut Child, pid: Option<u32>) {
    signal_group(pid, nix::sys::signal::Signal::SIGKILL);
    let _ = child.start_kill();
}

#[cfg(not(unix))]
fn force_kill(child: &mut Child, _pid: Option<u32>) {
    let _ = child.start_kill();
}

/// Kill whatever is left in the group after the leader exited.
#[cfg(unix)]
fn sweep_process_group(pid: Option<u32>) {
    signal_group(pid, nix::sys::signal::Signal::SIGKILL);
}

#[cfg(not(unix))]
fn sweep_process_group(_pid: Option<u32>) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandLine {
        CommandLine {
            argv: vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            needs_hidden_window: false,
        }
    }

    fn fast_settings() -> SupervisorSettings {
        SupervisorSettings {
            grace_period: Duration::from_millis(300),
            kill_timeout: Duration::from_secs(2),
            timeout: None,
        }
    }

    async fn run_to_end(
        command: CommandLine,
        settings: SupervisorSettings,
    ) -> (Outcome, SupervisorState, Vec<StreamEvent>) {
        let (tx, mut rx) = mpsc::channel(100);
        let cancel = CancellationToken::new();
        let mut supervisor = ProcessSupervisor::new("stub", settings);
        let outcome = supervisor.run(&command, &cancel, &tx).await;
        drop(tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (outcome, supervisor.state(), events)
    }

    fn tokens(lines: &[&str]) -> Vec<StreamEvent> {
        lines
            .iter()
            .map(|l| StreamEvent::Token(l.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_streams_lines_then_finishes() {
        let (outcome, state, events) =
            run_to_end(sh("printf 'one\\ntwo\\n\\nthree\\n'"), fast_settings()).await;

        assert_eq!(outcome, Outcome::Finished);
        assert_eq!(state, SupervisorState::Finished);
        assert_eq!(events, tokens(&["one", "two", "three"]));
        assert_eq!(outcome.terminal_event(), Some(StreamEvent::Final));
    }

    #[tokio::test]
    async fn test_last_line_without_newline_and_crlf() {
        let (outcome, _, events) =
            run_to_end(sh("printf 'dos\\r\\nlast'"), fast_settings()).await;

        assert_eq!(outcome, Outcome::Finished);
        assert_eq!(events, tokens(&["dos", "last"]));
    }

    #[tokio::test]
    async fn test_whitespace_only_lines_are_kept() {
        let (_, _, events) = run_to_end(sh("printf 'a\\n  \\nb\\n'"), fast_settings()).await;
        assert_eq!(events, tokens(&["a", "  ", "b"]));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_decoded_lossily() {
        let (outcome, _, events) = run_to_end(sh("printf 'ok\\377\\n'"), fast_settings()).await;
        assert_eq!(outcome, Outcome::Finished);
        assert_eq!(events, vec![StreamEvent::Token("ok\u{FFFD}".to_string())]);
    }

    #[tokio::test]
    async fn test_nonzero_exit_carries_stderr() {
        let (outcome, state, events) =
            run_to_end(sh("echo boom >&2; exit 2"), fast_settings()).await;

        assert_eq!(state, SupervisorState::Failed);
        assert!(events.is_empty());
        match outcome {
            Outcome::Failed(AgentError::Process { name, code, stderr }) => {
                assert_eq!(name, "stub");
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "boom");
            }
            other => panic!("Expected process failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_stderr() {
        let (outcome, _, _) = run_to_end(sh("echo partial; exit 1"), fast_settings()).await;
        match outcome {
            Outcome::Failed(err) => assert_eq!(err.to_string(), "stub CLI error: unknown error"),
            other => panic!("Expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let command = CommandLine {
            argv: vec!["/nonexistent/prompt-anywhere-stub".to_string()],
            needs_hidden_window: false,
        };
        let (outcome, state, events) = run_to_end(command, fast_settings()).await;

        assert_eq!(state, SupervisorState::Failed);
        assert!(events.is_empty());
        assert!(matches!(outcome, Outcome::Failed(AgentError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_supervisor_runs_once() {
        let (tx, _rx) = mpsc::channel(10);
        let cancel = CancellationToken::new();
        let mut supervisor = ProcessSupervisor::new("stub", fast_settings());
        assert_eq!(supervisor.run(&sh("true"), &cancel, &tx).await, Outcome::Finished);

        let second = supervisor.run(&sh("true"), &cancel, &tx).await;
        assert!(matches!(second, Outcome::Failed(AgentError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_precancelled_token_emits_nothing() {
        let (tx, mut rx) = mpsc::channel(10);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut supervisor = ProcessSupervisor::new("stub", fast_settings());
        let outcome = supervisor.run(&sh("echo hello"), &cancel, &tx).await;
        drop(tx);

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(supervisor.state(), SupervisorState::Cancelled);
        assert!(outcome.terminal_event().is_none());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_mid_stream() {
        let (tx, mut rx) = mpsc::channel(100);
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        let worker = tokio::spawn(async move {
            let mut supervisor = ProcessSupervisor::new("stub", fast_settings());
            let command = sh("while true; do echo tick; sleep 0.05; done");
            let outcome = supervisor.run(&command, &worker_cancel, &tx).await;
            (outcome, supervisor.state())
        });

        for _ in 0..2 {
            assert_eq!(rx.recv().await, Some(StreamEvent::Token("tick".to_string())));
        }
        cancel.cancel();

        let (outcome, state) = tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .expect("worker did not return in time")
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(state, SupervisorState::Cancelled);

        // Nothing terminal follows a cancellation.
        while let Some(event) = rx.recv().await {
            assert!(!event.is_terminal());
        }
    }

    #[tokio::test]
    async fn test_cancel_kills_child_ignoring_sigterm() {
        let (tx, mut rx) = mpsc::channel(100);
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        let worker = tokio::spawn(async move {
            let mut supervisor = ProcessSupervisor::new("stub", fast_settings());
            let command = sh("trap '' TERM; echo ready; while true; do sleep 0.05; done");
            supervisor.run(&command, &worker_cancel, &tx).await
        });

        assert_eq!(rx.recv().await, Some(StreamEvent::Token("ready".to_string())));
        let started = std::time::Instant::now();
        cancel.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .expect("worker did not return in time")
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        // grace period + kill timeout, with slack
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_silent_child_is_cancellable() {
        let (tx, _rx) = mpsc::channel(10);
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        let worker = tokio::spawn(async move {
            let mut supervisor = ProcessSupervisor::new("stub", fast_settings());
            supervisor.run(&sh("sleep 30"), &worker_cancel, &tx).await
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        let outcome = tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .expect("worker did not return in time")
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
    }

    #[tokio::test]
    async fn test_timeout_fails_request() {
        let settings = SupervisorSettings {
            timeout: Some(Duration::from_millis(200)),
            ..fast_settings()
        };
        let (outcome, state, _) = run_to_end(sh("echo start; sleep 30"), settings).await;

        assert_eq!(state, SupervisorState::Failed);
        assert!(matches!(outcome, Outcome::Failed(AgentError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_receiver_dropped_counts_as_cancel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let cancel = CancellationToken::new();

        let mut supervisor = ProcessSupervisor::new("stub", fast_settings());
        let command = sh("while true; do echo tick; sleep 0.05; done");
        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            supervisor.run(&command, &cancel, &tx),
        )
        .await
        .expect("supervisor did not return in time");
        assert_eq!(outcome, Outcome::Cancelled);
    }

    #[tokio::test]
    async fn test_receiver_dropped_while_child_silent() {
        let (tx, rx) = mpsc::channel(10);
        let cancel = CancellationToken::new();

        let worker = tokio::spawn(async move {
            let mut supervisor = ProcessSupervisor::new("stub", fast_settings());
            let outcome = supervisor.run(&sh("sleep 30"), &cancel, &tx).await;
            (outcome, supervisor.state())
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(rx);
        let (outcome, state) = tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .expect("supervisor kept waiting on a silent child")
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(state, SupervisorState::Cancelled);
    }

    #[tokio::test]
    async fn test_receiver_dropped_after_output_closed() {
        let (tx, rx) = mpsc::channel(10);
        let cancel = CancellationToken::new();

        // stdout is closed but the process keeps running
        let worker = tokio::spawn(async move {
            let mut supervisor = ProcessSupervisor::new("stub", fast_settings());
            supervisor
                .run(&sh("exec >/dev/null; sleep 30"), &cancel, &tx)
                .await
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(rx);
        let outcome = tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .expect("supervisor kept waiting for exit")
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
    }

    #[test]
    fn test_decode_line() {
        assert_eq!(decode_line(b"abc\n"), "abc");
        assert_eq!(decode_line(b"abc\r\n"), "abc");
        assert_eq!(decode_line(b"abc"), "abc");
        assert_eq!(decode_line(b"\n"), "");
    }

    #[tokio::test]
    async fn test_read_capped_limits_capture() {
        let big = vec![b'x'; STDERR_LIMIT * 2];
        let mut input = big.clone();
        input.push(b'\n');
        input.extend_from_slice(b"tail\n");

        let captured = read_capped(&input[..], "stub").await;
        assert!(captured.len() <= STDERR_LIMIT * 2 + 1);
        assert!(!captured.contains("tail"));
    }
}
