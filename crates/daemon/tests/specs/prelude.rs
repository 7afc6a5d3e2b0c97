// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for binary specs

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Child, Command as StdCommand, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use predicates::prelude::*;
use tempfile::TempDir;
use ureq::Agent;

pub const BIN: &str = env!("CARGO_BIN_EXE_librarian");

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// A scratch directory holding one librarian log
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn log_path(&self) -> PathBuf {
        self.path("librarian.log")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.path("librarian.log.lock")
    }

    pub fn write_log(&self, contents: &str) {
        std::fs::write(self.log_path(), contents).unwrap();
    }

    pub fn log_lines(&self) -> Vec<String> {
        std::fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// A `librarian` invocation with no arguments yet
    pub fn librarian(&self) -> Cli {
        let mut cmd = Command::new(BIN);
        cmd.current_dir(self.dir.path()).env_remove("RUST_LOG");
        Cli { cmd }
    }

    /// Start a server on a free local port and wait until it accepts connections
    pub fn serve(&self, extra_args: &[&str]) -> Server {
        let addr = free_addr();
        let mut child = StdCommand::new(BIN)
            .current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .arg("--http")
            .arg(addr.to_string())
            .args(extra_args)
            .arg(self.log_path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();

        let deadline = Instant::now() + STARTUP_TIMEOUT;
        loop {
            if TcpStream::connect(addr).is_ok() {
                break;
            }
            if let Some(status) = child.try_wait().unwrap() {
                panic!("librarian exited during startup: {status}");
            }
            if Instant::now() > deadline {
                let _ = child.kill();
                panic!("librarian did not start listening on {addr}");
            }
            thread::sleep(Duration::from_millis(20));
        }

        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(STARTUP_TIMEOUT))
            .build()
            .into();

        Server { child, addr, agent }
    }
}

fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn arg(mut self, arg: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.arg(arg);
        self
    }

    pub fn passes(mut self) -> Outcome {
        Outcome {
            assert: self.cmd.timeout(STARTUP_TIMEOUT).assert().success(),
        }
    }

    pub fn fails(mut self) -> Outcome {
        Outcome {
            assert: self.cmd.timeout(STARTUP_TIMEOUT).assert().failure(),
        }
    }
}

pub struct Outcome {
    assert: Assert,
}

impl Outcome {
    pub fn stdout_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stdout(predicate::str::contains(expected)),
        }
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stderr(predicate::str::contains(expected)),
        }
    }
}

/// A running `librarian` process, killed on drop
pub struct Server {
    child: Child,
    addr: SocketAddr,
    agent: Agent,
}

impl Server {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// `GET path`, returning the status code and body
    pub fn get(&self, path: &str) -> (u16, String) {
        let response = self.agent.get(&self.url(path)).call().unwrap();
        read_response(response)
    }

    /// `PUT path` with an empty body, returning the status code and body
    pub fn put(&self, path: &str) -> (u16, String) {
        let response = self.agent.put(&self.url(path)).send_empty().unwrap();
        read_response(response)
    }

    /// Simulate a crash: SIGKILL, no cleanup
    pub fn crash(mut self) {
        self.child.kill().unwrap();
        self.child.wait().unwrap();
    }

    /// Ask for a graceful shutdown with SIGTERM and wait for exit
    pub fn terminate(mut self) -> ExitStatus {
        let pid = Pid::from_raw(i32::try_from(self.child.id()).unwrap());
        kill(pid, Signal::SIGTERM).unwrap();

        let deadline = Instant::now() + STARTUP_TIMEOUT;
        loop {
            if let Some(status) = self.child.try_wait().unwrap() {
                return status;
            }
            if Instant::now() > deadline {
                panic!("librarian did not exit after SIGTERM");
            }
            thread::sleep(Duration::from_millis(20));
        }
    }
}

fn read_response(mut response: ureq::http::Response<ureq::Body>) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap();
    (status, body)
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
