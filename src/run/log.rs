use super::RunBehaviours;
use crate::domain::NotebookRef;
use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use colored::{ColoredString, Colorize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

const BANNER_TIME_FORMAT: &str = "%l:%M%p %:z on %b %d, %Y";
const FINISHED_TIME_FORMAT: &str = "%H:%M:%S on %Y-%m-%d";

pub(super) struct RunLog<'a, W: Write> {
    writer: &'a mut W,
    plain: bool,
    lines: Option<Vec<String>>,
}

impl<'a, W: Write> RunLog<'a, W> {
    pub(super) fn new(writer: &'a mut W, behaviours: &RunBehaviours) -> Self {
        RunLog {
            writer,
            plain: behaviours.plain_stdout,
            lines: behaviours.log_path.as_ref().map(|_| vec![]),
        }
    }

    fn emit(&mut self, msg: String, styled: ColoredString) {
        // a closed stdout shouldn't abort a run that's halfway through
        let _ = if self.plain {
            writeln!(self.writer, "{}", msg)
        } else {
            writeln!(self.writer, "{}", styled)
        };

        if let Some(lines) = self.lines.as_mut() {
            lines.push(msg);
        }
    }

    pub(super) fn start(&mut self, at: DateTime<FixedOffset>) {
        let msg = format!("{} Start -- ", at.format(BANNER_TIME_FORMAT));
        let styled = msg.as_str().green().bold();
        self.emit(msg, styled);
    }

    pub(super) fn running(&mut self, notebook: &NotebookRef) {
        let msg = format!("\n>>> Running {} ...", notebook);
        let styled = msg.as_str().cyan();
        self.emit(msg, styled);
    }

    pub(super) fn finished(&mut self, notebook: &NotebookRef, at: DateTime<FixedOffset>) {
        let msg = format!(
            "--- Finished {} at {} ---",
            notebook,
            at.format(FINISHED_TIME_FORMAT)
        );
        let styled = msg.as_str().blue();
        self.emit(msg, styled);
    }

    pub(super) fn done(&mut self, at: DateTime<FixedOffset>) {
        let msg = format!(
            "{} \nAll selected notebooks executed successfully.",
            at.format(BANNER_TIME_FORMAT)
        );
        let styled = msg.as_str().green().bold();
        self.emit(msg, styled);
    }

    pub(super) fn error(
        &mut self,
        notebook: &NotebookRef,
        remaining: usize,
        at: DateTime<FixedOffset>,
    ) {
        let msg = format!(
            "xxx {} failed at {}; {} notebook(s) after it were not run",
            notebook,
            at.format(FINISHED_TIME_FORMAT),
            remaining,
        );
        let styled = msg.as_str().red();
        self.emit(msg, styled);
    }

    pub(super) fn write_output<P>(&self, log_file: P) -> anyhow::Result<()>
    where
        P: AsRef<Path>,
    {
        let Some(lines) = &self.lines else {
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file)
            .context("couldn't open a handle to the log file")?;

        file.write_all(lines.join("\n").as_bytes())
            .context("couldn't write log to file")?;

        Ok(())
    }
}
