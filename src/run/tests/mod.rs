use super::{Clock, NotebookExecutor, RunBehaviours, run_notebooks};
use crate::domain::{NotebookRef, RunPlan};
use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const NOW: &str = "2025-09-09T14:05:07+08:00";

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(NOW).expect("timestamp should've been parsed")
    }
}

/// Records every call; fails on the n-th one (1-indexed) if asked to.
#[derive(Default)]
struct StubExecutor {
    calls: Vec<(PathBuf, PathBuf)>,
    fail_on: Option<usize>,
}

impl StubExecutor {
    fn failing_on(n: usize) -> Self {
        Self {
            calls: vec![],
            fail_on: Some(n),
        }
    }
}

impl NotebookExecutor for StubExecutor {
    fn execute(&mut self, input: &Path, output: &Path) -> anyhow::Result<()> {
        self.calls.push((input.to_path_buf(), output.to_path_buf()));

        if self.fail_on == Some(self.calls.len()) {
            anyhow::bail!("cell raised an exception");
        }

        std::fs::write(output, "executed")?;
        Ok(())
    }
}

fn plan(dir: &TempDir, notebooks: &[&str]) -> RunPlan {
    RunPlan {
        notebooks: notebooks
            .iter()
            .map(|n| NotebookRef::try_from(*n).expect("notebook ref should've been valid"))
            .collect(),
        output_dir: dir.path().join("pics"),
        output_prefix: "executed_".to_string(),
    }
}

fn to_string(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).expect("buffer contents should've been converted to a string")
}

//-------------//
//  SUCCESSES  //
//-------------//

#[test]
fn empty_plan_only_creates_output_dir_and_prints_banners() -> anyhow::Result<()> {
    // GIVEN
    let dir = tempfile::tempdir()?;
    let plan = plan(&dir, &[]);
    let mut executor = StubExecutor::default();
    let mut buffer = vec![];

    // WHEN
    run_notebooks(
        &mut buffer,
        &mut executor,
        &FixedClock,
        &plan,
        &RunBehaviours::default(),
    )?;

    // THEN
    assert!(plan.output_dir.is_dir());
    assert!(executor.calls.is_empty());
    assert_eq!(
        to_string(buffer),
        " 2:05PM +08:00 on Sep 09, 2025 Start -- \n 2:05PM +08:00 on Sep 09, 2025 \nAll selected notebooks executed successfully.\n"
    );

    Ok(())
}

#[test]
fn notebooks_are_executed_once_each_in_order() -> anyhow::Result<()> {
    // GIVEN
    let dir = tempfile::tempdir()?;
    let plan = plan(&dir, &["b.ipynb", "a.ipynb", "nested/c.ipynb"]);
    let mut executor = StubExecutor::default();
    let mut buffer = vec![];

    // WHEN
    run_notebooks(
        &mut buffer,
        &mut executor,
        &FixedClock,
        &plan,
        &RunBehaviours::default(),
    )?;

    // THEN
    let pics = dir.path().join("pics");
    assert_eq!(
        executor.calls,
        vec![
            (PathBuf::from("b.ipynb"), pics.join("executed_b.ipynb")),
            (PathBuf::from("a.ipynb"), pics.join("executed_a.ipynb")),
            (PathBuf::from("nested/c.ipynb"), pics.join("executed_c.ipynb")),
        ]
    );

    Ok(())
}

#[test]
fn progress_is_printed_for_every_notebook() -> anyhow::Result<()> {
    // GIVEN
    let dir = tempfile::tempdir()?;
    let plan = plan(&dir, &["Fig1.ipynb", "Fig2.ipynb"]);
    let mut executor = StubExecutor::default();
    let mut buffer = vec![];

    // WHEN
    run_notebooks(
        &mut buffer,
        &mut executor,
        &FixedClock,
        &plan,
        &RunBehaviours::default(),
    )?;

    // THEN
    let expected = [
        " 2:05PM +08:00 on Sep 09, 2025 Start -- ",
        "",
        ">>> Running Fig1.ipynb ...",
        "--- Finished Fig1.ipynb at 14:05:07 on 2025-09-09 ---",
        "",
        ">>> Running Fig2.ipynb ...",
        "--- Finished Fig2.ipynb at 14:05:07 on 2025-09-09 ---",
        " 2:05PM +08:00 on Sep 09, 2025 ",
        "All selected notebooks executed successfully.",
        "",
    ]
    .join("\n");
    assert_eq!(to_string(buffer), expected);

    Ok(())
}

#[test]
fn existing_output_dir_contents_are_left_alone() -> anyhow::Result<()> {
    // GIVEN
    let dir = tempfile::tempdir()?;
    let plan = plan(&dir, &["a.ipynb"]);
    std::fs::create_dir_all(&plan.output_dir)?;
    let unrelated = plan.output_dir.join("figure.png");
    std::fs::write(&unrelated, "png")?;
    let mut executor = StubExecutor::default();
    let mut buffer = vec![];

    // WHEN
    run_notebooks(
        &mut buffer,
        &mut executor,
        &FixedClock,
        &plan,
        &RunBehaviours::default(),
    )?;

    // THEN
    assert_eq!(std::fs::read_to_string(&unrelated)?, "png");
    assert_eq!(executor.calls.len(), 1);

    Ok(())
}

#[test]
fn running_twice_works() -> anyhow::Result<()> {
    // GIVEN
    let dir = tempfile::tempdir()?;
    let plan = plan(&dir, &["a.ipynb", "b.ipynb"]);
    let mut executor = StubExecutor::default();

    // WHEN
    for _ in 0..2 {
        let mut buffer = vec![];
        run_notebooks(
            &mut buffer,
            &mut executor,
            &FixedClock,
            &plan,
            &RunBehaviours::default(),
        )?;
    }

    // THEN
    assert_eq!(executor.calls.len(), 4);
    assert_eq!(
        std::fs::read_to_string(plan.output_dir.join("executed_b.ipynb"))?,
        "executed"
    );

    Ok(())
}

#[test]
fn run_log_is_written_to_file_if_requested() -> anyhow::Result<()> {
    // GIVEN
    let dir = tempfile::tempdir()?;
    let plan = plan(&dir, &["a.ipynb"]);
    let log_path = dir.path().join("log.txt");
    let behaviours = RunBehaviours::default().log_to(log_path.clone());
    let mut executor = StubExecutor::default();
    let mut buffer = vec![];

    // WHEN
    run_notebooks(&mut buffer, &mut executor, &FixedClock, &plan, &behaviours)?;

    // THEN
    let log = std::fs::read_to_string(&log_path)?;
    assert_eq!(format!("{log}\n"), to_string(buffer));

    Ok(())
}

//-------------//
//  FAILURES   //
//-------------//

#[test]
fn execution_stops_at_the_first_failure() -> anyhow::Result<()> {
    // GIVEN
    let dir = tempfile::tempdir()?;
    let plan = plan(&dir, &["a.ipynb", "b.ipynb", "c.ipynb", "d.ipynb"]);
    let mut executor = StubExecutor::failing_on(2);
    let mut buffer = vec![];

    // WHEN
    let result = run_notebooks(
        &mut buffer,
        &mut executor,
        &FixedClock,
        &plan,
        &RunBehaviours::default(),
    );

    // THEN
    let err = result.expect_err("result should've been an error");
    assert_eq!(format!("{err:#}"), "couldn't execute notebook b.ipynb: cell raised an exception");
    let attempted: Vec<_> = executor.calls.iter().map(|(i, _)| i.clone()).collect();
    assert_eq!(
        attempted,
        vec![PathBuf::from("a.ipynb"), PathBuf::from("b.ipynb")]
    );
    assert!(!plan.output_dir.join("executed_c.ipynb").exists());

    let out = to_string(buffer);
    assert!(out.contains("xxx b.ipynb failed at 14:05:07 on 2025-09-09; 2 notebook(s) after it were not run"));
    assert!(!out.contains("All selected notebooks executed successfully."));

    Ok(())
}

#[test]
fn failure_on_first_notebook_leaves_nothing_executed() -> anyhow::Result<()> {
    // GIVEN
    let dir = tempfile::tempdir()?;
    let plan = plan(&dir, &["a.ipynb", "b.ipynb"]);
    let mut executor = StubExecutor::failing_on(1);
    let mut buffer = vec![];

    // WHEN
    let result = run_notebooks(
        &mut buffer,
        &mut executor,
        &FixedClock,
        &plan,
        &RunBehaviours::default(),
    );

    // THEN
    assert!(result.is_err());
    assert_eq!(executor.calls.len(), 1);
    assert_eq!(std::fs::read_dir(&plan.output_dir)?.count(), 0);

    Ok(())
}

#[test]
fn run_log_is_written_to_file_even_when_a_notebook_fails() -> anyhow::Result<()> {
    // GIVEN
    let dir = tempfile::tempdir()?;
    let plan = plan(&dir, &["a.ipynb"]);
    let log_path = dir.path().join("log.txt");
    let behaviours = RunBehaviours::default().log_to(log_path.clone());
    let mut executor = StubExecutor::failing_on(1);
    let mut buffer = vec![];

    // WHEN
    let result = run_notebooks(&mut buffer, &mut executor, &FixedClock, &plan, &behaviours);

    // THEN
    assert!(result.is_err());
    let log = std::fs::read_to_string(&log_path)?;
    assert!(log.contains("xxx a.ipynb failed"));

    Ok(())
}

#[test]
fn output_dir_that_cannot_be_created_results_in_an_error() -> anyhow::Result<()> {
    // GIVEN
    let dir = tempfile::tempdir()?;
    let blocker = dir.path().join("pics");
    std::fs::write(&blocker, "not a directory")?;
    let plan = plan(&dir, &["a.ipynb"]);
    let mut executor = StubExecutor::default();
    let mut buffer = vec![];

    // WHEN
    let result = run_notebooks(
        &mut buffer,
        &mut executor,
        &FixedClock,
        &plan,
        &RunBehaviours::default(),
    );

    // THEN
    assert!(result.is_err());
    assert!(executor.calls.is_empty());
    assert!(buffer.is_empty());

    Ok(())
}
