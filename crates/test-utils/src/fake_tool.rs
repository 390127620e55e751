//! Scripted stand-in for the download tool.
//!
//! Builds a small `/bin/sh` script that plays the tool's role in tests:
//! prints the lines it was given, optionally sleeps or touches files in
//! its working directory, then exits with a chosen code.

use std::io;
use std::path::{Path, PathBuf};

pub struct FakeToolScript {
    body: Vec<String>,
    exit_code: i32,
}

impl FakeToolScript {
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            exit_code: 0,
        }
    }

    /// Print one line of output.
    pub fn line(mut self, line: &str) -> Self {
        self.body
            .push(format!("printf '%s\\n' '{}'", shell_quote(line)));
        self
    }

    /// Print raw bytes followed by a newline; lets tests emit invalid UTF-8.
    pub fn raw_line(mut self, bytes: &[u8]) -> Self {
        let escaped: String = bytes.iter().map(|b| format!("\\{b:03o}")).collect();
        self.body.push(format!("printf '{escaped}\\n'"));
        self
    }

    /// Sleep before whatever comes next.
    pub fn sleep_secs(mut self, secs: u32) -> Self {
        self.body.push(format!("sleep {secs}"));
        self
    }

    /// Fractional sleep, for spacing file timestamps.
    pub fn sleep_millis(mut self, millis: u64) -> Self {
        let secs = millis as f64 / 1000.0;
        self.body.push(format!("sleep {secs}"));
        self
    }

    /// Create an empty file, relative names resolving against the script's
    /// working directory.
    pub fn touch(mut self, name: &str) -> Self {
        self.body.push(format!(": > '{}'", shell_quote(name)));
        self
    }

    /// Append one raw script line verbatim.
    pub fn script(mut self, line: &str) -> Self {
        self.body.push(line.to_string());
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Write the script under `dir` and return its path.
    pub fn write_to(self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join("fake-tool.sh");
        let mut contents = String::from("#!/bin/sh\n");
        for line in &self.body {
            contents.push_str(line);
            contents.push('\n');
        }
        contents.push_str(&format!("exit {}\n", self.exit_code));
        std::fs::write(&path, contents)?;
        make_executable(&path)?;
        Ok(path)
    }
}

impl Default for FakeToolScript {
    fn default() -> Self {
        Self::new()
    }
}

fn shell_quote(s: &str) -> String {
    s.replace('\'', r"'\''")
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
