use crate::domain::ExecutorSpec;
use anyhow::Context;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

const PAPERMILL: &str = "papermill";
const JUPYTER: &str = "jupyter";

pub trait NotebookExecutor {
    /// Executes the notebook at `input`, writing the executed copy to `output`.
    /// Blocks until the underlying engine is done.
    fn execute(&mut self, input: &Path, output: &Path) -> anyhow::Result<()>;
}

/// Executes notebooks by shelling out to an external engine.
pub struct ProcessExecutor {
    spec: ExecutorSpec,
}

impl From<ExecutorSpec> for ProcessExecutor {
    fn from(spec: ExecutorSpec) -> Self {
        Self { spec }
    }
}

impl ProcessExecutor {
    fn command(&self, input: &Path, output: &Path) -> Command {
        match &self.spec {
            ExecutorSpec::Papermill { kernel } => {
                let mut cmd = Command::new(PAPERMILL);
                if let Some(k) = kernel {
                    cmd.arg("-k").arg(k);
                }
                cmd.arg(input).arg(output);
                cmd
            }
            ExecutorSpec::Nbconvert { kernel } => {
                let mut cmd = Command::new(JUPYTER);
                cmd.args(["nbconvert", "--to", "notebook", "--execute"]);
                if let Some(k) = kernel {
                    cmd.arg(format!("--ExecutePreprocessor.kernel_name={k}"));
                }
                cmd.arg(input);

                // nbconvert resolves --output relative to --output-dir
                let output_dir = match output.parent() {
                    Some(p) if !p.as_os_str().is_empty() => p.as_os_str().to_owned(),
                    _ => OsString::from("."),
                };
                cmd.arg("--output-dir").arg(output_dir);
                if let Some(name) = output.file_name() {
                    cmd.arg("--output").arg(name);
                }
                cmd
            }
            ExecutorSpec::Command { program, args } => {
                let mut cmd = Command::new(program);
                cmd.args(args).arg(input).arg(output);
                cmd
            }
        }
    }

    fn program_name(&self) -> &str {
        match &self.spec {
            ExecutorSpec::Papermill { .. } => PAPERMILL,
            ExecutorSpec::Nbconvert { .. } => JUPYTER,
            ExecutorSpec::Command { program, .. } => program,
        }
    }
}

impl NotebookExecutor for ProcessExecutor {
    fn execute(&mut self, input: &Path, output: &Path) -> anyhow::Result<()> {
        let status = self
            .command(input, output)
            .status()
            .with_context(|| format!("couldn't run \"{}\"; is it installed?", self.program_name()))?;

        if !status.success() {
            anyhow::bail!(
                "\"{}\" failed to execute {} ({})",
                self.program_name(),
                input.to_string_lossy(),
                status
            );
        }

        Ok(())
    }
}
