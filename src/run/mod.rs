mod behaviours;
mod clock;
mod execute;
mod log;
#[cfg(test)]
mod tests;

pub use behaviours::RunBehaviours;
pub use clock::{Clock, LocalClock};
pub use execute::{NotebookExecutor, ProcessExecutor};

use crate::domain::RunPlan;
use anyhow::Context;
use log::RunLog;
use std::io::Write;

/// Executes every notebook in the plan, in order, stopping at the first failure.
///
/// The output directory is created up front if it doesn't exist; anything
/// already inside it is left alone, and executed copies from earlier runs
/// get overwritten.
pub fn run_notebooks<W, E, C>(
    writer: &mut W,
    executor: &mut E,
    clock: &C,
    plan: &RunPlan,
    behaviours: &RunBehaviours,
) -> anyhow::Result<()>
where
    W: Write,
    E: NotebookExecutor + ?Sized,
    C: Clock + ?Sized,
{
    std::fs::create_dir_all(&plan.output_dir).with_context(|| {
        format!(
            "couldn't create output directory {}",
            plan.output_dir.to_string_lossy()
        )
    })?;

    let mut l = RunLog::new(writer, behaviours);
    l.start(clock.now());

    let result = execute_in_order(&mut l, executor, clock, plan);

    if result.is_ok() {
        l.done(clock.now());
    }

    let log_result = match &behaviours.log_path {
        Some(log_path) => l.write_output(log_path).with_context(|| {
            format!("couldn't write run log to {}", log_path.to_string_lossy())
        }),
        None => Ok(()),
    };

    // a failed notebook takes precedence over a failed log write
    result.and(log_result)
}

fn execute_in_order<W, E, C>(
    l: &mut RunLog<'_, W>,
    executor: &mut E,
    clock: &C,
    plan: &RunPlan,
) -> anyhow::Result<()>
where
    W: Write,
    E: NotebookExecutor + ?Sized,
    C: Clock + ?Sized,
{
    for (i, notebook) in plan.notebooks.iter().enumerate() {
        let output_path = plan.output_path(notebook);
        l.running(notebook);

        if let Err(err) = executor.execute(notebook.path(), &output_path) {
            l.error(notebook, plan.notebooks.len() - i - 1, clock.now());
            return Err(err.context(format!("couldn't execute notebook {}", notebook)));
        }

        l.finished(notebook, clock.now());
    }

    Ok(())
}
