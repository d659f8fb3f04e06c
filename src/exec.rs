//! External processes: the exec command shape and the launcher behind it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::FromArgMatches;

use crate::command::{CommandInfo, Context, ParsedCommand};
use crate::config::Project;
use crate::error::{CommandError, TaskResult};

/// Where a child's output stream goes; relative files resolve against the child's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Sink {
    #[default]
    Inherit,
    Null,
    File(PathBuf),
}

/// One external process, launched synchronously.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    dir: Option<PathBuf>,
    stdout: Sink,
    stderr: Sink,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Variables added on top of the inherited environment.
    pub fn envs(mut self, env: BTreeMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    /// Run in `dir` instead of the context's working directory.
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn stdout(mut self, sink: Sink) -> Self {
        self.stdout = sink;
        self
    }

    pub fn stderr(mut self, sink: Sink) -> Self {
        self.stderr = sink;
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Launch and wait; a non-zero exit status is a domain failure.
    pub fn run(&self, ctx: &Context) -> TaskResult<()> {
        let dir = self.dir.clone().unwrap_or_else(|| ctx.cwd());
        info!("==> {}", self.command_line());
        debug!("    in {}", dir.display());

        let mut expr = duct::cmd(self.program.as_str(), self.args.iter().map(String::as_str))
            .dir(&dir)
            .unchecked();
        for (key, value) in &self.env {
            expr = expr.env(key, value);
        }
        expr = match &self.stdout {
            Sink::Inherit => expr,
            Sink::Null => expr.stdout_null(),
            Sink::File(path) => expr.stdout_path(dir.join(path)),
        };
        expr = match &self.stderr {
            Sink::Inherit => expr,
            Sink::Null => expr.stderr_null(),
            Sink::File(path) => expr.stderr_path(dir.join(path)),
        };

        let output = expr.run()?;
        if output.status.success() {
            Ok(())
        } else {
            debug!("`{}` exited with {}", self.program, output.status);
            Err(CommandError::silent().into())
        }
    }
}

/// A parsed command that launches one external process.
///
/// The hooks compute the argument list, extra environment and output sinks
/// from the parsed arguments.
pub trait ExecCommand: CommandInfo {
    type Args: FromArgMatches;

    fn program(&self, project: &Project) -> String;

    fn add_arguments(&self, parser: clap::Command) -> clap::Command;

    fn get_args(&self, _args: &Self::Args) -> Vec<String> {
        Vec::new()
    }

    fn get_env(&self, _args: &Self::Args) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn get_stdout(&self, _args: &Self::Args) -> Sink {
        Sink::Inherit
    }

    fn get_stderr(&self, _args: &Self::Args) -> Sink {
        Sink::Inherit
    }
}

/// Adapter turning an [`ExecCommand`] into a [`ParsedCommand`].
pub struct Exec<C>(pub C);

impl<C: ExecCommand> CommandInfo for Exec<C> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn description(&self) -> &'static str {
        self.0.description()
    }

    fn cwd(&self, project: &Project) -> Option<PathBuf> {
        self.0.cwd(project)
    }
}

impl<C: ExecCommand> ParsedCommand for Exec<C> {
    type Args = C::Args;

    fn add_arguments(&self, parser: clap::Command) -> clap::Command {
        self.0.add_arguments(parser)
    }

    fn handle(&self, ctx: &Context, args: Self::Args) -> TaskResult<()> {
        Invocation::new(self.0.program(ctx.project()))
            .args(self.0.get_args(&args))
            .envs(self.0.get_env(&args))
            .stdout(self.0.get_stdout(&args))
            .stderr(self.0.get_stderr(&args))
            .run(ctx)
    }
}
