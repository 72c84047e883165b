/*
    Copyright 2025 TII (SSRC) and the contributors
    SPDX-License-Identifier: Apache-2.0
*/
use crate::error::Error;
use log::{debug, error, info, warn};
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use std::fmt;
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

pub const SYSFS_NET: &str = "/sys/class/net";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Up,
    Down,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Up => "up",
            Verb::Down => "down",
        }
    }

    fn pending(self) -> Transition {
        match self {
            Verb::Up => Transition::Starting,
            Verb::Down => Transition::Stopping,
        }
    }

    fn done(self) -> Transition {
        match self {
            Verb::Up => Transition::Up,
            Verb::Down => Transition::Down,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of an up/down request as seen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Starting,
    Up,
    Stopping,
    Down,
    Failed { verb: Verb, reason: String },
}

/// Receives transitions in the order they happen.
pub trait NoticeSink {
    fn notify(&mut self, transition: Transition);
}

impl NoticeSink for Vec<Transition> {
    fn notify(&mut self, transition: Transition) {
        self.push(transition);
    }
}

/// What a finished `wg-quick` invocation left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    pub status: Option<i32>,
    pub output: String,
    pub timed_out: bool,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.status == Some(0)
    }

    fn describe(&self) -> String {
        let last_line = self.output.lines().rev().find(|l| !l.trim().is_empty());
        let cause = if self.timed_out {
            "timed out".to_owned()
        } else {
            match self.status {
                Some(code) => format!("exited with status {code}"),
                None => "was terminated by a signal".to_owned(),
            }
        };

        match last_line {
            Some(line) => format!("{cause}: {}", line.trim()),
            None => cause,
        }
    }
}

/// Runs the external up/down tool.
pub trait CommandRunner: Send + Sync {
    fn run(&self, verb: Verb, name: &str) -> io::Result<CommandOutcome>;
}

/// `wg-quick <verb> <name>` bounded by a timeout.
#[derive(Debug, Clone)]
pub struct WgQuick {
    program: PathBuf,
    timeout: Duration,
}

impl WgQuick {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl CommandRunner for WgQuick {
    fn run(&self, verb: Verb, name: &str) -> io::Result<CommandOutcome> {
        let child = Command::new(&self.program)
            .args([verb.as_str(), name])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Own group, so a timeout also reaches `ip`, `wg` and friends.
            .process_group(0)
            .spawn()?;

        wait_with_timeout(child, self.timeout)
    }
}

/// How long output is still collected after the process exited.
const OUTPUT_GRACE: Duration = Duration::from_millis(200);

/// Forward every line of `pipe` to `lines` until EOF.
fn forward_lines(pipe: impl Read + Send + 'static, lines: mpsc::Sender<String>) {
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = vec![];
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).trim_end_matches('\n').to_owned();
                    if lines.send(line).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

/// Kill the process group led by `child`, or just `child` if it leads none.
fn kill_group(child: &mut Child) -> io::Result<()> {
    let pgid = Pid::from_raw(child.id() as i32);
    if let Err(errno) = killpg(pgid, Signal::SIGKILL) {
        debug!("killpg({pgid}) failed: {errno}, killing the process only");
        child.kill()?;
    }
    Ok(())
}

/// Wait for `child`, killing its process group once `timeout` elapses, and
/// collect stdout and stderr in arrival order. Pipes are read while waiting;
/// a descendant still holding them open cannot delay the result by more
/// than [`OUTPUT_GRACE`].
pub fn wait_with_timeout(mut child: Child, timeout: Duration) -> io::Result<CommandOutcome> {
    let (tx, rx) = mpsc::channel();
    if let Some(stdout) = child.stdout.take() {
        forward_lines(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(stderr, tx.clone());
    }
    drop(tx);

    let (status, timed_out) = match child.wait_timeout(timeout)? {
        Some(status) => (status.code(), false),
        None => {
            debug!("Killing the process group of {:?}", child);
            kill_group(&mut child)?;
            (child.wait()?.code(), true)
        }
    };

    let deadline = Instant::now() + OUTPUT_GRACE;
    let mut output = String::new();
    while let Ok(line) = rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        output.push_str(&line);
        output.push('\n');
    }

    Ok(CommandOutcome {
        status,
        output,
        timed_out,
    })
}

/// Whether failures of the external tool reach the user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReportPolicy {
    #[default]
    Strict,
    /// Log failures but report every request as successful.
    Optimistic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Up,
    Down,
    Absent,
}

/// Brings interfaces up and down through a [`CommandRunner`].
#[derive(Clone)]
pub struct InterfaceController {
    runner: Arc<dyn CommandRunner>,
    policy: ReportPolicy,
    sysfs_net: PathBuf,
}

impl fmt::Debug for InterfaceController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceController")
            .field("policy", &self.policy)
            .field("sysfs_net", &self.sysfs_net)
            .finish_non_exhaustive()
    }
}

impl InterfaceController {
    pub fn new(runner: Arc<dyn CommandRunner>, policy: ReportPolicy) -> Self {
        Self {
            runner,
            policy,
            sysfs_net: PathBuf::from(SYSFS_NET),
        }
    }

    pub fn with_sysfs_net(mut self, sysfs_net: impl Into<PathBuf>) -> Self {
        self.sysfs_net = sysfs_net.into();
        self
    }

    /// Returns whether the interface was reported as up.
    pub fn bring_up(&self, name: &str, sink: &mut dyn NoticeSink) -> bool {
        self.toggle(Verb::Up, name, sink)
    }

    /// Returns whether the interface was reported as down.
    pub fn bring_down(&self, name: &str, sink: &mut dyn NoticeSink) -> bool {
        self.toggle(Verb::Down, name, sink)
    }

    /// Down then up. The up runs even if the down failed, since
    /// `wg-quick down` refuses interfaces that are not up.
    pub fn restart(&self, name: &str, sink: &mut dyn NoticeSink) -> bool {
        let down = self.bring_down(name, sink);
        if !down {
            warn!("Restart of {name}: continuing after failed down");
        }
        self.bring_up(name, sink)
    }

    pub fn link_state(&self, name: &str) -> LinkState {
        link_state(&self.sysfs_net, name)
    }

    fn toggle(&self, verb: Verb, name: &str, sink: &mut dyn NoticeSink) -> bool {
        sink.notify(verb.pending());

        let failure = match self.runner.run(verb, name) {
            Ok(outcome) if outcome.success() => {
                info!("wg-quick {verb} {name} succeeded");
                debug!("wg-quick {verb} {name} output: {}", outcome.output.trim());
                None
            }
            Ok(outcome) => {
                error!(
                    "wg-quick {verb} {name} failed (status {:?}, timed out: {}): {}",
                    outcome.status,
                    outcome.timed_out,
                    outcome.output.trim()
                );
                Some(outcome.describe())
            }
            Err(source) => {
                let reason = source.to_string();
                let err = Error::Command {
                    verb: verb.to_string(),
                    name: name.to_owned(),
                    source,
                };
                error!("{err}");
                Some(reason)
            }
        };

        match (failure, self.policy) {
            (None, _) => {
                sink.notify(verb.done());
                true
            }
            (Some(_), ReportPolicy::Optimistic) => {
                sink.notify(verb.done());
                true
            }
            (Some(reason), ReportPolicy::Strict) => {
                sink.notify(Transition::Failed { verb, reason });
                false
            }
        }
    }
}

/// Read `<sysfs_net>/<name>/operstate`. WireGuard links report `unknown` while up.
pub fn link_state(sysfs_net: &Path, name: &str) -> LinkState {
    match fs::read_to_string(sysfs_net.join(name).join("operstate")) {
        Ok(state) => match state.trim() {
            "up" | "unknown" => LinkState::Up,
            _ => LinkState::Down,
        },
        Err(_) => LinkState::Absent,
    }
}
