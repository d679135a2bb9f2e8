use crate::domain::{
    DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_PREFIX, ExecutorKind, ExecutorSpec, NotebookRef,
};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    notebooks: Vec<NotebookRef>,
    output_dir: Option<PathBuf>,
    output_prefix: Option<String>,
    executor: Option<RawExecutor>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExecutor {
    kind: Option<ExecutorKind>,
    kernel: Option<String>,
    program: Option<String>,
    #[serde(default)]
    args: Vec<String>,
}

#[derive(Debug)]
pub struct Config {
    pub notebooks: Vec<NotebookRef>,
    pub output_dir: PathBuf,
    pub output_prefix: String,
    pub executor: ExecutorSpec,
}

impl TryFrom<RawConfig> for Config {
    type Error = anyhow::Error;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let output_prefix = raw
            .output_prefix
            .unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.to_string());

        if output_prefix.is_empty() {
            anyhow::bail!("output_prefix can't be empty");
        }

        let executor = match raw.executor {
            Some(e) => e.try_into()?,
            None => ExecutorSpec::default(),
        };

        Ok(Config {
            notebooks: raw.notebooks,
            output_dir: raw
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            output_prefix,
            executor,
        })
    }
}

impl TryFrom<RawExecutor> for ExecutorSpec {
    type Error = anyhow::Error;

    fn try_from(raw: RawExecutor) -> Result<Self, Self::Error> {
        let kind = raw.kind.unwrap_or(ExecutorKind::Papermill);

        if kind != ExecutorKind::Command && (raw.program.is_some() || !raw.args.is_empty()) {
            anyhow::bail!(r#""program" and "args" are only allowed when executor kind is "command""#);
        }

        match kind {
            ExecutorKind::Papermill => Ok(ExecutorSpec::Papermill { kernel: raw.kernel }),
            ExecutorKind::Nbconvert => Ok(ExecutorSpec::Nbconvert { kernel: raw.kernel }),
            ExecutorKind::Command => {
                if raw.kernel.is_some() {
                    anyhow::bail!(r#""kernel" is not supported when executor kind is "command""#);
                }

                let program = raw
                    .program
                    .filter(|p| !p.trim().is_empty())
                    .context(r#"executor kind "command" needs a non-empty "program""#)?;

                Ok(ExecutorSpec::Command {
                    program,
                    args: raw.args,
                })
            }
        }
    }
}

pub fn get_config<P>(path: P) -> anyhow::Result<Config>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("couldn't read config file {}", path.to_string_lossy()))?;

    parse_config(&contents)
        .with_context(|| format!("config file {} is invalid", path.to_string_lossy()))
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let raw: RawConfig = toml::from_str(contents)?;

    raw.try_into()
}
