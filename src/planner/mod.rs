//! Planner process runner
//!
//! Launches the planner as `<executable> <domain> <problem> -u <bound>` and
//! captures its whole stdout. The executable is checked once, when the
//! runner is built; individual runs never re-check it.
//!
//! Runs are synchronous. Without a timeout the runner waits for the planner
//! however long it takes; with one, a planner that outlives it is killed and
//! the output captured so far is returned with `timed_out` set.
//!
//! On unix a planner run with a timeout leads its own process group, so the
//! kill also reaches anything it spawned, such as a wrapper script's child.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::{Error, Result};

/// Poll period while waiting on a planner with a timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long a killed planner's stdout may take to reach EOF before the
/// reader is abandoned.
const READER_GRACE: Duration = Duration::from_secs(2);

/// How to launch the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerSettings {
    /// Path to the planner executable
    pub executable: PathBuf,
    /// Kill the planner after this long (`None` waits forever)
    pub timeout: Option<Duration>,
    /// Pass `-v`, the planner's own verbose mode
    pub planner_verbose: bool,
}

impl PlannerSettings {
    /// Settings with no timeout and the planner's quiet mode.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: None,
            planner_verbose: false,
        }
    }

    /// Set a wall-clock timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Toggle the planner's `-v` flag.
    #[must_use]
    pub const fn with_planner_verbose(mut self, planner_verbose: bool) -> Self {
        self.planner_verbose = planner_verbose;
        self
    }
}

/// What one planner invocation printed and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerOutput {
    /// Entire stdout, decoded as UTF-8
    pub stdout: String,
    /// Exit code; `None` when terminated by a signal
    pub exit_code: Option<i32>,
    /// Killed for exceeding the timeout
    pub timed_out: bool,
}

impl PlannerOutput {
    /// Exited on its own with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        !self.timed_out && matches!(self.exit_code, Some(0))
    }
}

/// Anything that can run the planner on a domain/problem pair.
pub trait Planner {
    /// Run once and return the captured output.
    ///
    /// # Errors
    ///
    /// Returns error if the process cannot be started or awaited.
    fn run(&self, domain_path: &str, problem_path: &str, bound: u32) -> Result<PlannerOutput>;
}

/// The real planner, run as a child process.
#[derive(Debug, Clone)]
pub struct PlannerProcess {
    settings: PlannerSettings,
}

impl PlannerProcess {
    /// Validate the executable and build the runner.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExecutableNotFound`] if the path is not an executable file.
    pub fn new(settings: PlannerSettings) -> Result<Self> {
        ensure_executable(&settings.executable)?;
        tracing::debug!(executable = %settings.executable.display(), "planner located");
        Ok(Self { settings })
    }

    /// Settings this runner was built with.
    #[must_use]
    pub const fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Arguments passed after the executable.
    #[must_use]
    pub fn command_args(&self, domain_path: &str, problem_path: &str, bound: u32) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            domain_path.into(),
            problem_path.into(),
            "-u".into(),
            bound.to_string().into(),
        ];
        if self.settings.planner_verbose {
            args.push("-v".into());
        }
        args
    }
}

impl Planner for PlannerProcess {
    fn run(&self, domain_path: &str, problem_path: &str, bound: u32) -> Result<PlannerOutput> {
        let executable = &self.settings.executable;
        let mut command = Command::new(executable);
        command
            .args(self.command_args(domain_path, problem_path, bound))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if self.settings.timeout.is_some() {
                command.process_group(0);
            }
        }
        let mut child = command.spawn().map_err(|e| {
            Error::Process(format!("failed to spawn {}: {e}", executable.display()))
        })?;

        // Drain stdout on its own thread so a full pipe cannot stall the wait loop.
        let pipe = child
            .stdout
            .take()
            .ok_or_else(|| Error::Process("planner stdout was not captured".to_string()))?;
        let reader = StdoutReader::spawn(pipe);

        let (status, timed_out) = match self.settings.timeout {
            Some(timeout) => match child.wait_timeout(timeout)? {
                Some(status) => (status, false),
                None => {
                    tracing::warn!(
                        problem = problem_path,
                        timeout_secs = timeout.as_secs_f64(),
                        "planner exceeded timeout, killing"
                    );
                    kill_planner(&mut child);
                    (child.wait()?, true)
                }
            },
            None => (child.wait()?, false),
        };

        let bytes = if timed_out {
            reader.finish_within(READER_GRACE)?
        } else {
            reader.finish()?
        };

        Ok(PlannerOutput {
            stdout: decode_stdout(bytes),
            exit_code: status.code(),
            timed_out,
        })
    }
}

/// Kill the planner and, on unix, every process in its group.
fn kill_planner(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Ok(pid) = i32::try_from(child.id()) {
            if let Err(err) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                tracing::debug!(pid, %err, "killpg failed, killing planner only");
            }
        }
    }
    // Already-exited races are fine; the caller's wait() reaps either way.
    let _ = child.kill();
}

/// Background stdout drain whose bytes stay readable even if the pipe never
/// reaches EOF.
struct StdoutReader {
    buf: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<std::io::Result<()>>,
}

impl StdoutReader {
    fn spawn<R: Read + Send + 'static>(mut pipe: R) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();
        let sink = Arc::clone(&buf);
        thread::spawn(move || {
            let mut chunk = [0_u8; 8192];
            let result = loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break Ok(()),
                    Ok(n) => match sink.lock() {
                        Ok(mut guard) => guard.extend_from_slice(&chunk[..n]),
                        Err(_) => break Ok(()),
                    },
                    Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(err) => break Err(err),
                }
            };
            let _ = tx.send(result);
        });
        Self { buf, done }
    }

    /// Wait for EOF, however long it takes.
    fn finish(self) -> Result<Vec<u8>> {
        match self.done.recv() {
            Ok(result) => result?,
            Err(_) => return Err(Error::Process("planner stdout reader panicked".to_string())),
        }
        Ok(self.take())
    }

    /// Wait up to `grace` for EOF, then return what was read so far.
    fn finish_within(self, grace: Duration) -> Result<Vec<u8>> {
        match self.done.recv_timeout(grace) {
            Ok(result) => result?,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!("planner stdout still open after kill, abandoning reader");
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(Error::Process("planner stdout reader panicked".to_string()));
            }
        }
        Ok(self.take())
    }

    fn take(&self) -> Vec<u8> {
        self.buf
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }
}

/// The planner must be an existing file with an execute bit.
fn ensure_executable(path: &Path) -> Result<()> {
    let not_found = || Error::ExecutableNotFound(path.to_path_buf());
    let meta = std::fs::metadata(path).map_err(|_| not_found())?;
    if !meta.is_file() {
        return Err(not_found());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 == 0 {
            return Err(not_found());
        }
    }
    Ok(())
}

fn decode_stdout(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|err| {
        tracing::warn!("planner output is not valid UTF-8, replacing invalid sequences");
        String::from_utf8_lossy(err.as_bytes()).into_owned()
    })
}

/// Extension trait to add `wait_timeout` to `Child`.
trait ChildExt {
    fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>>;
}

impl ChildExt for Child {
    fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
        let start = Instant::now();
        loop {
            if let Some(status) = self.try_wait()? {
                return Ok(Some(status));
            }
            if start.elapsed() >= timeout {
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}
