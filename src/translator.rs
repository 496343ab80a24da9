//! External translator invocation
//!
//! The composed document is piped into the translator (`butane` by default)
//! and its standard output is captured. The run has a hard wall-clock
//! limit covering both the child's run and the collection of its output:
//! when it expires the child is killed and reaped before the timeout is
//! reported.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::defaults;
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// An external translator command.
#[derive(Debug, Clone)]
pub struct Translator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(defaults::TRANSLATOR)
    }
}

impl Translator {
    /// Create a translator running `program` with the default timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: defaults::TRANSLATOR_TIMEOUT,
        }
    }

    /// Add an argument passed before `--files-dir`.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the wall-clock limit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The executable.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The wall-clock limit.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the translator on `input` and return its standard output.
    ///
    /// `files_dir` is where the translator resolves `local` file references.
    pub fn translate(&self, input: &[u8], files_dir: &Path) -> Result<Vec<u8>> {
        debug!(
            "Running {} {:?} --files-dir {}",
            self.program,
            self.args,
            files_dir.display()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("--files-dir")
            .arg(files_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => Error::TranslatorNotFound {
                    program: self.program.clone(),
                },
                _ => Error::Io(err),
            })?;

        let stdin = child.stdin.take();
        let input = input.to_vec();
        thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                if let Err(err) = stdin.write_all(&input) {
                    debug!("Writing translator input failed: {}", err);
                }
            }
        });

        let (sender, receiver) = mpsc::channel();
        spawn_reader(Stream::Stdout, child.stdout.take(), sender.clone());
        spawn_reader(Stream::Stderr, child.stderr.take(), sender);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            let polled = match child.try_wait() {
                Ok(polled) => polled,
                Err(err) => {
                    terminate(&mut child);
                    return Err(Error::Io(err));
                }
            };
            match polled {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    terminate(&mut child);
                    return Err(self.timed_out());
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        // Processes left behind by the translator may keep the pipes open,
        // so collecting the output is bounded by the same deadline.
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        for _ in 0..2 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match receiver.recv_timeout(remaining) {
                Ok((Stream::Stdout, bytes)) => stdout = bytes,
                Ok((Stream::Stderr, bytes)) => stderr = bytes,
                Err(RecvTimeoutError::Timeout) => return Err(self.timed_out()),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();

        if !status.success() {
            return Err(Error::TranslatorFailed {
                program: self.program.clone(),
                status: status.to_string(),
                stderr,
            });
        }
        if !stderr.is_empty() {
            warn!("{}: {}", self.program, stderr);
        }

        Ok(stdout)
    }

    fn timed_out(&self) -> Error {
        Error::TranslatorTimeout {
            program: self.program.clone(),
            timeout: self.timeout,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn spawn_reader<R>(stream: Stream, source: Option<R>, sender: Sender<(Stream, Vec<u8>)>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut source) = source {
            if let Err(err) = source.read_to_end(&mut buffer) {
                debug!("Reading translator {:?} failed: {}", stream, err);
            }
        }
        // The receiver is gone once the deadline has passed.
        let _ = sender.send((stream, buffer));
    });
}

/// Kill the child and reap it.
fn terminate(child: &mut Child) {
    if let Err(err) = child.kill() {
        debug!("Killing translator failed: {}", err);
    }
    let _ = child.wait();
}
