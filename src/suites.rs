//! Running configured pytest suites and summarizing their outcomes.

use colored::*;

use crate::command::Context;
use crate::config::{Project, Suite};
use crate::error::{CommandError, TaskResult};
use crate::exec::Invocation;

/// Arguments handed to pytest for `suite`: extra options, suite options, files.
pub fn pytest_args(suite: &Suite, extra: &[String]) -> Vec<String> {
    extra
        .iter()
        .chain(&suite.options)
        .chain(&suite.files)
        .cloned()
        .collect()
}

/// Suite standing for plain pytest with the `[pytest]` options and files.
pub fn default_suite(project: &Project) -> Suite {
    let pytest = &project.config().pytest;
    Suite {
        name: "pytest".to_string(),
        files: pytest.files.clone(),
        options: pytest.options.clone(),
        ..Suite::default()
    }
}

/// The configured suites, or the default suite when none is configured.
pub fn planned(project: &Project) -> Vec<Suite> {
    if project.suites().is_empty() {
        vec![default_suite(project)]
    } else {
        project.suites().to_vec()
    }
}

/// `program <args>` for `suite`, in the suite's directory and environment.
pub fn suite_invocation(
    ctx: &Context,
    suite: &Suite,
    program: &str,
    args: Vec<String>,
) -> Invocation {
    let invocation = Invocation::new(program)
        .args(args)
        .envs(suite.env.clone());
    match &suite.cwd {
        Some(dir) => invocation.dir(ctx.project().root().join(dir)),
        None => invocation,
    }
}

/// Run `suite` with pytest.
pub fn run_suite(ctx: &Context, suite: &Suite, extra: &[String]) -> TaskResult<()> {
    let pytest = &ctx.project().config().tools.pytest;
    suite_invocation(ctx, suite, pytest, pytest_args(suite, extra)).run(ctx)
}

/// Pass/fail lines for a batch of suites.
///
/// A failing item is recorded instead of aborting the batch; only fatal
/// errors stop it.
#[derive(Debug, Default)]
pub struct Summary {
    lines: Vec<String>,
    failed: bool,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of `name`; fatal errors are passed through.
    pub fn record(&mut self, name: &str, result: TaskResult<()>) -> TaskResult<()> {
        match result {
            Ok(()) => {
                self.lines.push(format!(
                    "{} {:.<80}[{}].",
                    "✅".green(),
                    name,
                    "passed".green()
                ));
                Ok(())
            }
            Err(err) if err.is_failure() => {
                self.lines.push(format!(
                    "{} {:.<80}[{}].",
                    "❌".red(),
                    name,
                    "failed".red()
                ));
                self.failed = true;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[cfg(test)]
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Print the lines; fail if any item failed.
    pub fn finish(self) -> TaskResult<()> {
        for line in &self.lines {
            println!("{}", line);
        }
        if self.failed {
            return Err(CommandError::new("One or more tests failed.").into());
        }
        Ok(())
    }
}
