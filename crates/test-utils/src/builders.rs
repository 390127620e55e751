#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dlpilot::command::CommandSpec;

/// Builder for `CommandSpec` to simplify test setup.
pub struct SpecBuilder {
    program: PathBuf,
    args: Vec<String>,
    target_dir: PathBuf,
}

impl SpecBuilder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            target_dir: PathBuf::from("."),
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn target_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.target_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn build(self) -> CommandSpec {
        CommandSpec {
            program: self.program,
            args: self.args,
            target_dir: self.target_dir,
        }
    }
}
