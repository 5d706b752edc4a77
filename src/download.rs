//! # Remote Template Download
//!
//! This module fetches a repository (or a subpath of one) into a local
//! directory by running an external sparse-fetch executable (`npx degit` by
//! default) through the system shell.
//!
//! ## Design
//!
//! Process plumbing sits behind the [`ProcessLauncher`] trait. A launcher
//! starts the process and reports everything that happens to it as
//! [`ProcessEvent`]s on a channel. [`Downloader::fetch`] consumes that channel
//! with a deadline:
//!
//! - the first terminal event (`Exited` or `Failed`) settles the call,
//! - reaching the deadline kills the process once and settles with a
//!   `Timeout` error,
//! - anything arriving after settlement is dropped together with the
//!   receiver.
//!
//! Failures are classified into a [`DownloadError`] by matching the
//! accumulated stderr (or the spawn error text) against an ordered rule
//! table; the first matching rule wins.
//!
//! [`ShellLauncher`] is the real implementation; tests inject their own
//! launchers to script process behaviour.

use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, LazyLock, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use regex::Regex;

use crate::defaults::{DEFAULT_DOWNLOADER, DEFAULT_DOWNLOAD_TIMEOUT};
use crate::error::{DownloadError, DownloadErrorKind, Error};

/// Interval at which the waiter thread polls the child for an exit status.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// One invocation of the download executable.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    /// Repository identifier, optionally with a subpath (`owner/repo/sub/dir`)
    pub repo: String,
    pub destination: PathBuf,
    pub timeout: Duration,
    /// Echo the process output to the terminal
    pub verbose: bool,
}

impl DownloadTask {
    pub fn new(repo: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            destination: destination.into(),
            timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            verbose: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_options(self, options: &FetchOptions) -> Self {
        self.with_timeout(options.timeout).with_verbose(options.verbose)
    }
}

/// Per-run settings shared by every download of a scaffolding run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub verbose: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            verbose: false,
        }
    }
}

/// Something that happened to a launched process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Stdout(String),
    Stderr(String),
    /// The process exited; `None` when it was terminated by a signal.
    Exited(Option<i32>),
    /// The process could not be started or waited on.
    Failed(String),
}

/// Handle to a running process, used to terminate it on timeout.
pub trait ProcessHandle: Send {
    fn kill(&mut self) -> io::Result<()>;
}

/// Trait for starting download processes - allows scripting process
/// behaviour in tests.
pub trait ProcessLauncher: Send + Sync {
    /// Start the process for `task`, reporting its output and termination on
    /// `events`.
    ///
    /// An `Err` return means the process could not be spawned at all.
    fn launch(
        &self,
        task: &DownloadTask,
        events: Sender<ProcessEvent>,
    ) -> io::Result<Box<dyn ProcessHandle>>;

    /// Name of the executable, used to recognize "not found" failures.
    fn executable(&self) -> &str;
}

/// Runs `<program> <repo> <destination>` through the system shell.
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    program: String,
}

impl ShellLauncher {
    /// `program` may carry arguments of its own, such as `npx degit`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The full command line handed to the shell.
    pub fn command_line(&self, task: &DownloadTask) -> String {
        format!(
            "{} {} {}",
            self.program,
            shell_quote(&task.repo),
            shell_quote(&task.destination.to_string_lossy())
        )
    }

    fn shell_command(&self, task: &DownloadTask) -> Command {
        let line = self.command_line(task);
        let mut command = if cfg!(windows) {
            let mut command = Command::new("cmd");
            command.args(["/C", line.as_str()]);
            command
        } else {
            let mut command = Command::new("sh");
            command.args(["-c", line.as_str()]);
            command
        };
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for ShellLauncher {
    fn default() -> Self {
        Self::new(DEFAULT_DOWNLOADER)
    }
}

impl ProcessLauncher for ShellLauncher {
    fn launch(
        &self,
        task: &DownloadTask,
        events: Sender<ProcessEvent>,
    ) -> io::Result<Box<dyn ProcessHandle>> {
        let mut child = self.shell_command(task).spawn()?;

        let readers = vec![
            child
                .stdout
                .take()
                .map(|out| spawn_line_reader(out, events.clone(), ProcessEvent::Stdout)),
            child
                .stderr
                .take()
                .map(|err| spawn_line_reader(err, events.clone(), ProcessEvent::Stderr)),
        ];

        let child = Arc::new(Mutex::new(child));
        let waited = Arc::clone(&child);
        thread::spawn(move || {
            // Drain the pipes first so every output line precedes the exit event.
            for reader in readers.into_iter().flatten() {
                let _ = reader.join();
            }
            let event = wait_for_exit(&waited);
            let _ = events.send(event);
        });

        Ok(Box::new(ChildHandle { child }))
    }

    fn executable(&self) -> &str {
        self.program.split_whitespace().next().unwrap_or(&self.program)
    }
}

fn spawn_line_reader<R>(
    stream: R,
    events: Sender<ProcessEvent>,
    wrap: fn(String) -> ProcessEvent,
) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        for line in BufReader::new(stream).lines() {
            let Ok(line) = line else { break };
            if events.send(wrap(line)).is_err() {
                break;
            }
        }
    })
}

fn wait_for_exit(child: &Mutex<Child>) -> ProcessEvent {
    loop {
        let status = match child.lock() {
            Ok(mut child) => child.try_wait(),
            Err(_) => return ProcessEvent::Failed("process handle lock poisoned".to_string()),
        };
        match status {
            Ok(Some(status)) => return ProcessEvent::Exited(status.code()),
            Ok(None) => thread::sleep(EXIT_POLL_INTERVAL),
            Err(e) => return ProcessEvent::Failed(e.to_string()),
        }
    }
}

struct ChildHandle {
    child: Arc<Mutex<Child>>,
}

impl ProcessHandle for ChildHandle {
    fn kill(&mut self) -> io::Result<()> {
        self.child
            .lock()
            .map_err(|_| io::Error::other("process handle lock poisoned"))?
            .kill()
    }
}

/// Quote an argument for the platform shell.
fn shell_quote(arg: &str) -> String {
    if cfg!(windows) {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// A row of the classification table.
struct ErrorRule {
    pattern: Regex,
    kind: DownloadErrorKind,
    message: String,
}

/// Ordered rule table; the first matching rule wins.
struct ErrorClassifier {
    rules: Vec<ErrorRule>,
}

static REPO_NOT_FOUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)could not find commit hash").expect("repo-not-found regex is valid"));

static NETWORK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ENOTFOUND|ECONNREFUSED").expect("network regex is valid"));

static RATE_LIMIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rate limit").expect("rate-limit regex is valid"));

/// Shell and runtime messages reporting that `executable` does not exist.
fn spawn_not_found_pattern(executable: &str) -> Result<Regex, Error> {
    let exe = regex::escape(executable);
    Regex::new(&format!(
        r"(?i)ENOENT.*{exe}|{exe}.*ENOENT|spawn {exe}|{exe}: (command )?not found|{exe}: No such file or directory|command not found: {exe}|'{exe}' is not recognized"
    ))
    .map_err(Error::Regex)
}

impl ErrorClassifier {
    fn new(executable: &str) -> Result<Self, Error> {
        let rules = vec![
            ErrorRule {
                pattern: Regex::clone(&REPO_NOT_FOUND_RE),
                kind: DownloadErrorKind::RepoNotFound,
                message: "The repository or path might not exist.".to_string(),
            },
            ErrorRule {
                pattern: Regex::clone(&NETWORK_RE),
                kind: DownloadErrorKind::NetworkError,
                message: "Network error - please check your internet connection.".to_string(),
            },
            ErrorRule {
                pattern: Regex::clone(&RATE_LIMIT_RE),
                kind: DownloadErrorKind::RateLimit,
                message: "GitHub rate limit exceeded. Please try again later.".to_string(),
            },
            ErrorRule {
                pattern: spawn_not_found_pattern(executable)?,
                kind: DownloadErrorKind::SpawnNotFound,
                message: format!(
                    "{} command not found. Please ensure the runtime and package manager are installed.",
                    executable
                ),
            },
        ];
        Ok(Self { rules })
    }

    fn first_match(&self, text: &str) -> Option<&ErrorRule> {
        self.rules.iter().find(|rule| rule.pattern.is_match(text))
    }

    /// Classify process stderr and/or a spawn error message.
    ///
    /// Stderr is consulted first, then the error message. Unmatched text
    /// yields `Unknown` carrying the raw text.
    fn categorize(&self, stderr: &str, error: Option<&str>) -> (DownloadErrorKind, String, String) {
        let stderr = stderr.trim();
        let candidates = [Some(stderr), error].into_iter().flatten();
        for text in candidates.filter(|text| !text.is_empty()) {
            if let Some(rule) = self.first_match(text) {
                return (rule.kind, rule.message.clone(), text.to_string());
            }
        }

        let message = if !stderr.is_empty() {
            format!("Error: {}", stderr)
        } else {
            error.unwrap_or("Unknown error occurred").to_string()
        };
        let details = if stderr.is_empty() {
            error.unwrap_or_default()
        } else {
            stderr
        };
        (DownloadErrorKind::Unknown, message, details.to_string())
    }

    fn exit_error(&self, exit_code: i32, stderr: &str) -> DownloadError {
        let (kind, message, details) = self.categorize(stderr, None);
        DownloadError::new(
            kind,
            format!("Failed to download template (exit code {}). {}", exit_code, message),
            details,
        )
    }

    fn spawn_error(&self, error: &str) -> DownloadError {
        let (kind, message, details) = self.categorize("", Some(error));
        DownloadError::new(
            kind,
            format!("Failed to spawn download process. {}", message),
            details,
        )
    }
}

/// Downloads repositories through a [`ProcessLauncher`].
pub struct Downloader {
    launcher: Box<dyn ProcessLauncher>,
    classifier: ErrorClassifier,
}

impl Downloader {
    /// A downloader running `program` through the shell.
    pub fn new(program: impl Into<String>) -> Result<Self, Error> {
        Self::with_launcher(Box::new(ShellLauncher::new(program)))
    }

    /// A downloader with a custom launcher.
    ///
    /// Fails only if the launcher's executable name cannot be turned into
    /// a "not found" pattern.
    pub fn with_launcher(launcher: Box<dyn ProcessLauncher>) -> Result<Self, Error> {
        let classifier = ErrorClassifier::new(launcher.executable())?;
        Ok(Self {
            launcher,
            classifier,
        })
    }

    /// Run one download and wait for it to settle.
    ///
    /// Exactly one outcome is produced per call: the first terminal process
    /// event or the timeout, whichever comes first.
    pub fn fetch(&self, task: &DownloadTask) -> Result<(), DownloadError> {
        if task.verbose {
            info!("Downloading {} into {}", task.repo, task.destination.display());
        }

        let started = Instant::now();
        let (events, receiver) = mpsc::channel();
        let mut handle = self
            .launcher
            .launch(task, events)
            .map_err(|e| self.classifier.spawn_error(&e.to_string()))?;

        let mut stderr = String::new();
        loop {
            let remaining = task.timeout.saturating_sub(started.elapsed());
            match receiver.recv_timeout(remaining) {
                Ok(ProcessEvent::Stdout(line)) => {
                    debug!("download stdout: {}", line);
                    if task.verbose {
                        println!("[download stdout]: {}", line);
                    }
                }
                Ok(ProcessEvent::Stderr(line)) => {
                    debug!("download stderr: {}", line);
                    if task.verbose {
                        println!("[download stderr]: {}", line);
                    }
                    stderr.push_str(&line);
                    stderr.push('\n');
                }
                Ok(ProcessEvent::Exited(Some(0))) => {
                    debug!("Download of {} finished in {:?}", task.repo, started.elapsed());
                    return Ok(());
                }
                Ok(ProcessEvent::Exited(code)) => {
                    return Err(self.classifier.exit_error(code.unwrap_or(1), &stderr));
                }
                Ok(ProcessEvent::Failed(message)) => {
                    return Err(self.classifier.spawn_error(&message));
                }
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(e) = handle.kill() {
                        warn!("Failed to terminate download process: {}", e);
                    }
                    return Err(DownloadError::timeout(task.timeout.as_secs_f64()));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(DownloadError::new(
                        DownloadErrorKind::Unknown,
                        "Download process ended without reporting an exit status.",
                        stderr.trim(),
                    ));
                }
            }
        }
    }
}

/// Launcher for tests elsewhere in the crate: writes a fixed file tree into
/// the task destination and exits, optionally with a failure.
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::fs;

    pub(crate) struct FakeFetcher {
        pub files: Vec<(String, String)>,
        pub failure: Option<String>,
        pub calls: Arc<Mutex<Vec<DownloadTask>>>,
    }

    impl FakeFetcher {
        pub fn with_files(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(path, content)| (path.to_string(), content.to_string()))
                    .collect(),
                failure: None,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn failing(stderr: &str) -> Self {
            Self {
                failure: Some(stderr.to_string()),
                ..Self::with_files(&[])
            }
        }
    }

    struct Finished;

    impl ProcessHandle for Finished {
        fn kill(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl ProcessLauncher for FakeFetcher {
        fn launch(&self, task: &DownloadTask, events: Sender<ProcessEvent>) -> io::Result<Box<dyn ProcessHandle>> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(task.clone());
            }
            for (path, content) in &self.files {
                let target = task.destination.join(path);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(target, content)?;
            }
            let exit = match &self.failure {
                Some(stderr) => {
                    let _ = events.send(ProcessEvent::Stderr(stderr.clone()));
                    1
                }
                None => 0,
            };
            let _ = events.send(ProcessEvent::Exited(Some(exit)));
            Ok(Box::new(Finished))
        }

        fn executable(&self) -> &str {
            "npx"
        }
    }
}
