use crate::domain::NotebookRef;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// nbrun executes your analysis notebooks one after another
#[derive(Parser, Debug)]
pub struct Args {
    #[command(subcommand)]
    pub command: NbrunCommand,
    /// Output debug information without doing anything
    #[arg(long = "debug", global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum NbrunCommand {
    /// Execute notebooks in order, stopping at the first failure
    #[command(name = "run")]
    Run {
        /// Path to nbrun's config file
        #[arg(
            long = "config",
            short = 'c',
            value_name = "PATH",
            default_value = "nbrun.toml"
        )]
        config_file: PathBuf,
        /// Notebooks to execute (will override notebooks in config)
        #[arg(long = "notebooks",
            short = 'n',
            value_name = "PATH,PATH",
            value_delimiter = ',',
            value_parser = validate_notebook
            )]
        notebooks: Vec<NotebookRef>,
        /// Directory to write executed notebooks to (will override output_dir in config)
        #[arg(long = "output-dir", short = 'o', value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Prefix for executed notebooks' file names (will override output_prefix in config)
        #[arg(long = "prefix", value_name = "STRING", value_parser = validate_prefix)]
        output_prefix: Option<String>,
        /// Whether to write nbrun's log to a file
        #[arg(long = "log-to-file", short = 'l')]
        log_to_file: bool,
        /// File to write nbrun's log to
        #[arg(
            long = "log-path",
            value_name = "FILE",
            default_value = "nbrun-log.txt",
            value_parser = validate_txt_path,
        )]
        log_path: PathBuf,
        /// Whether to use output text to stdout without color
        #[arg(long = "plain", short = 'p')]
        plain_stdout: bool,
    },
    /// Interact with nbrun's config
    Config {
        #[command(subcommand)]
        config_command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate nbrun's config
    Validate {
        /// Path to nbrun's config file
        #[arg(
            long = "path",
            short = 'p',
            value_name = "PATH",
            default_value = "nbrun.toml"
        )]
        config_file: PathBuf,
    },
    /// Print out a sample config
    Sample,
}

fn validate_notebook(value: &str) -> Result<NotebookRef, String> {
    NotebookRef::try_from(value)
}

fn validate_prefix(value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err(String::from("prefix can't be empty"))
    } else {
        Ok(value.to_string())
    }
}

fn validate_txt_path(s: &str) -> Result<PathBuf, String> {
    if s.ends_with(".txt") {
        Ok(PathBuf::from(s))
    } else {
        Err(String::from("file must have a .txt extension"))
    }
}

impl std::fmt::Display for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match &self.command {
            NbrunCommand::Run {
                config_file,
                notebooks,
                output_dir,
                output_prefix,
                log_to_file,
                log_path,
                plain_stdout,
            } => format!(
                r#"
command:                  Run
config file:              {}
notebooks (overridden):   {:?}
output dir (overridden):  {}
prefix (overridden):      {}
log to file:              {}
log file:                 {}
plain stdout:             {}
"#,
                config_file.to_string_lossy(),
                notebooks
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<String>>(),
                output_dir
                    .as_ref()
                    .map(|d| d.to_string_lossy().to_string())
                    .unwrap_or_else(|| "-".to_string()),
                output_prefix.as_deref().unwrap_or("-"),
                log_to_file,
                log_path.to_string_lossy(),
                plain_stdout,
            ),
            NbrunCommand::Config { config_command } => match config_command {
                ConfigCommand::Validate { config_file } => format!(
                    r#"
command:                  Validate config
config file:              {}
"#,
                    config_file.to_string_lossy(),
                ),

                ConfigCommand::Sample => r#"
command:                  Show sample config
"#
                .to_string(),
            },
        };

        f.write_str(&output)
    }
}
