mod args;
mod config;
mod domain;
mod run;

use args::Args;
use args::{ConfigCommand, NbrunCommand};
use clap::Parser;
use config::get_config;
use domain::RunPlan;
use run::{LocalClock, ProcessExecutor, RunBehaviours, run_notebooks};

const SAMPLE_CONFIG: &str = include_str!("./assets/sample-config.toml");

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.debug {
        print!("DEBUG INFO\n{args}");
        return Ok(());
    }

    match args.command {
        NbrunCommand::Run {
            config_file,
            notebooks,
            output_dir,
            output_prefix,
            log_to_file,
            log_path,
            plain_stdout,
        } => {
            let config = get_config(config_file)?;

            let plan = RunPlan {
                notebooks: if notebooks.is_empty() {
                    config.notebooks
                } else {
                    notebooks
                },
                output_dir: output_dir.unwrap_or(config.output_dir),
                output_prefix: output_prefix.unwrap_or(config.output_prefix),
            };

            let behaviours = RunBehaviours {
                log_path: if log_to_file { Some(log_path) } else { None },
                plain_stdout,
            };

            let mut executor = ProcessExecutor::from(config.executor);
            let mut stdout = std::io::stdout().lock();
            run_notebooks(&mut stdout, &mut executor, &LocalClock, &plan, &behaviours)?;
        }
        NbrunCommand::Config { config_command } => match config_command {
            ConfigCommand::Validate { config_file } => {
                get_config(config_file)?;
                println!("config looks good ✅");
            }
            ConfigCommand::Sample => print!("{SAMPLE_CONFIG}"),
        },
    }

    Ok(())
}
