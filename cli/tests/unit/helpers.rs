//! Shared test helpers: mock port implementations and an engine harness
//! rooted in a temp directory.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;

use anyhow::{Context, Result};
use hive_cli::application::ports::{
    BusPublisher, CommandRunner, ProcessControl, ProgressReporter, SourceFetcher,
};
use hive_cli::application::services::Engine;
use hive_cli::domain::config::HiveConfig;
use hive_cli::domain::paths::HivePaths;
use hive_cli::infra::fs::HostFs;
use hive_cli::infra::permissions::AdminList;
use hive_common::BusMessage;
use tempfile::TempDir;

// ── Output constructors ──────────────────────────────────────────────────────

pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

pub fn output(code: i32) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

// ── Command runner ───────────────────────────────────────────────────────────

/// Records every program run and answers with a fixed exit code.
pub struct RecordingRunner {
    pub calls: Mutex<Vec<(String, PathBuf)>>,
    pub exit_code: i32,
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            exit_code: 0,
        }
    }
}

impl RecordingRunner {
    /// File names of the programs run, in order.
    pub fn programs(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| {
                Path::new(p)
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_in(program, args, Path::new(".")).await
    }

    async fn run_in(&self, program: &str, _args: &[&str], cwd: &Path) -> Result<Output> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), cwd.to_path_buf()));
        Ok(output(self.exit_code))
    }
}

// ── Source fetcher ───────────────────────────────────────────────────────────

/// Serves in-memory source trees keyed by source URI.
#[derive(Default)]
pub struct FakeFetcher {
    pub trees: Mutex<HashMap<String, Vec<(String, String)>>>,
    pub fetched: Mutex<Vec<String>>,
}

impl FakeFetcher {
    /// Replace the tree served for `source`.
    pub fn publish(&self, source: &str, files: &[(&str, &str)]) {
        self.trees.lock().unwrap().insert(
            source.to_string(),
            files
                .iter()
                .map(|(p, c)| ((*p).to_string(), (*c).to_string()))
                .collect(),
        );
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }
}

impl SourceFetcher for FakeFetcher {
    async fn fetch(&self, source: &str, dest: &Path) -> Result<()> {
        self.fetched.lock().unwrap().push(source.to_string());
        let files = self
            .trees
            .lock()
            .unwrap()
            .get(source)
            .cloned()
            .with_context(|| format!("repository '{source}' not found"))?;
        std::fs::create_dir_all(dest)?;
        for (relative, content) in files {
            let path = dest.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        Ok(())
    }
}

// ── Process control ──────────────────────────────────────────────────────────

/// Hands out PIDs from 4000 upwards and tracks which are alive.
pub struct FakeProcess {
    pub next_pid: Mutex<u32>,
    pub alive: Mutex<HashSet<u32>>,
    pub spawned: Mutex<Vec<(PathBuf, PathBuf)>>,
    /// When set, `terminate` reports the signal as undelivered.
    pub refuse_signals: bool,
}

impl Default for FakeProcess {
    fn default() -> Self {
        Self {
            next_pid: Mutex::new(4000),
            alive: Mutex::new(HashSet::new()),
            spawned: Mutex::new(Vec::new()),
            refuse_signals: false,
        }
    }
}

impl FakeProcess {
    pub fn is_alive_now(&self, pid: u32) -> bool {
        self.alive.lock().unwrap().contains(&pid)
    }

    /// Simulate the process exiting on its own.
    pub fn crash(&self, pid: u32) {
        self.alive.lock().unwrap().remove(&pid);
    }

    pub fn spawn_count(&self) -> usize {
        self.spawned.lock().unwrap().len()
    }
}

impl ProcessControl for FakeProcess {
    fn spawn_detached(&self, program: &Path, cwd: &Path, _log: &Path) -> Result<u32> {
        let mut next = self.next_pid.lock().unwrap();
        let pid = *next;
        *next += 1;
        self.alive.lock().unwrap().insert(pid);
        self.spawned
            .lock()
            .unwrap()
            .push((program.to_path_buf(), cwd.to_path_buf()));
        Ok(pid)
    }

    async fn terminate(&self, pid: u32) -> Result<bool> {
        if self.refuse_signals {
            return Ok(false);
        }
        Ok(self.alive.lock().unwrap().remove(&pid))
    }

    async fn is_alive(&self, pid: u32) -> Result<bool> {
        Ok(self.is_alive_now(pid))
    }
}

// ── Bus ──────────────────────────────────────────────────────────────────────

/// Keeps every message sent; optionally fails every send.
#[derive(Default)]
pub struct RecordingBus {
    pub sent: Mutex<Vec<BusMessage>>,
    pub unreachable: bool,
}

impl RecordingBus {
    pub fn messages(&self) -> Vec<BusMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Messages whose `dst` field equals `dst`.
    pub fn to(&self, dst: &str) -> Vec<BusMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.get("dst") == Some(dst))
            .collect()
    }
}

impl BusPublisher for RecordingBus {
    async fn send(&self, message: &BusMessage) -> Result<()> {
        if self.unreachable {
            anyhow::bail!("connection refused");
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    pub steps: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.steps.lock().unwrap().push(message.to_string());
    }

    fn success(&self, message: &str) {
        self.steps.lock().unwrap().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
}

// ── Harness ──────────────────────────────────────────────────────────────────

pub type TestEngine<'a> = Engine<
    'a,
    HostFs,
    RecordingRunner,
    FakeFetcher,
    FakeProcess,
    RecordingBus,
    AdminList,
    RecordingReporter,
>;

/// Ports and state for one test, all rooted in a fresh temp directory.
pub struct Harness {
    pub dir: TempDir,
    pub config: HiveConfig,
    pub paths: HivePaths,
    pub fs: HostFs,
    pub runner: RecordingRunner,
    pub fetcher: FakeFetcher,
    pub process: FakeProcess,
    pub bus: RecordingBus,
    pub auth: AdminList,
    pub reporter: RecordingReporter,
}

pub const ADMIN: &str = "boss@example.org";

impl Harness {
    pub fn new() -> Self {
        Self::with(FakeProcess::default(), RecordingBus::default())
    }

    pub fn with(process: FakeProcess, bus: RecordingBus) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let config = HiveConfig {
            admins: vec![ADMIN.to_string()],
            ..HiveConfig::default()
        };
        let paths = HivePaths::under(dir.path());
        Self {
            auth: AdminList::new(&config.admins),
            dir,
            config,
            paths,
            fs: HostFs,
            runner: RecordingRunner::default(),
            fetcher: FakeFetcher::default(),
            process,
            bus,
            reporter: RecordingReporter::default(),
        }
    }

    pub fn engine(&self) -> TestEngine<'_> {
        Engine {
            fs: &self.fs,
            runner: &self.runner,
            fetcher: &self.fetcher,
            process: &self.process,
            bus: &self.bus,
            auth: &self.auth,
            reporter: &self.reporter,
            config: &self.config,
            paths: &self.paths,
        }
    }

    /// Absolute path of `relative` under the install root.
    pub fn installed(&self, relative: &str) -> PathBuf {
        self.paths.installed(relative)
    }

    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path).unwrap_or_default()
    }

    pub fn runtime_config(&self) -> String {
        self.read(&self.paths.runtime_config())
    }

    pub fn agent_list(&self) -> String {
        self.read(&self.paths.agent_list())
    }
}

// ── Fixture trees ────────────────────────────────────────────────────────────

pub const ECHO_SOURCE: &str = "https://example.org/echo.git";

/// Info file for the echo agent at `version`, subscribing to `topics`.
pub fn echo_info(version: &str, topics: &str) -> String {
    format!(
        "agent = echo\nversion = {version}\nscript = run.sh\ntopics = {topics}\n\
         description = Echoes every message\n"
    )
}

/// Echo agent v1: a run script, a library file, a config file and hooks.
pub fn publish_echo_v1(h: &Harness) {
    let info = echo_info("1.0.0", "chat mail");
    h.fetcher.publish(
        ECHO_SOURCE,
        &[
            ("hive/info", &info),
            ("hive/conf", "etc/echo.conf\n"),
            ("hive/preinst", "#!/bin/sh\n"),
            ("hive/postinst", "#!/bin/sh\n"),
            ("agents/echo/run.sh", "#!/bin/sh\nexec sleep 1000\n"),
            ("agents/echo/lib/old.py", "print('old')\n"),
            ("cmdproc/echo", "#!/bin/sh\n"),
            ("etc/echo.conf", "greeting = hello\n"),
            (".git/HEAD", "ref: refs/heads/main\n"),
        ],
    );
}

/// Echo agent v2: `old.py` replaced by `new.py`, topics changed.
pub fn publish_echo_v2(h: &Harness) {
    let info = echo_info("1.1.0", "chat news");
    h.fetcher.publish(
        ECHO_SOURCE,
        &[
            ("hive/info", &info),
            ("hive/conf", "etc/echo.conf\n"),
            ("hive/preupd", "#!/bin/sh\n"),
            ("hive/postupd", "#!/bin/sh\n"),
            ("agents/echo/run.sh", "#!/bin/sh\nexec sleep 2000\n"),
            ("agents/echo/lib/new.py", "print('new')\n"),
            ("cmdproc/echo", "#!/bin/sh\n"),
            ("etc/echo.conf", "greeting = hello again\n"),
        ],
    );
}

/// A run-script-less agent made only of a command processor.
pub fn publish_tool(h: &Harness, source: &str, version: &str) {
    let info = format!("version = {version}\ntopics = chat\n");
    h.fetcher.publish(
        source,
        &[("hive/info", &info), ("cmdproc/tool", "#!/bin/sh\n")],
    );
}
