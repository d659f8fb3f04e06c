//! Command traits, the invocation boundary and the execution context.
//!
//! Three shapes of command share one contract:
//!
//! - [`ParsedCommand`]: arguments are declared with clap and parsed into one
//!   typed struct before `handle` runs.
//! - [`ForwardingCommand`]: the raw argument list goes straight to `handle`,
//!   for commands wrapping a tool that owns its own parser.
//! - [`ExecCommand`](crate::exec::ExecCommand): a parsed command whose
//!   `handle` launches one external process.
//!
//! Each shape is wrapped in an adapter ([`Parsed`], [`Forwarded`],
//! [`Exec`](crate::exec::Exec)) implementing the object-safe [`Command`]
//! trait stored in the registry.

use std::iter;
use std::path::PathBuf;

use clap::FromArgMatches;
use xshell::{PushDir, Shell};

use crate::config::Project;
use crate::error::{TaskError, TaskResult};
use crate::prompt::Prompt;

/// Identity shared by every command shape.
pub trait CommandInfo: Send + Sync {
    /// Registry key; an empty name marks an abstract command that is never registered.
    fn name(&self) -> &'static str;

    /// Short description (shown in help list).
    fn description(&self) -> &'static str;

    /// Working directory override for the duration of `handle`.
    fn cwd(&self, _project: &Project) -> Option<PathBuf> {
        None
    }
}

/// A registered, invocable command.
pub trait Command: CommandInfo {
    /// Parse `args`, run the command and translate a domain failure into a status.
    fn invoke(&self, ctx: &Context, args: &[String]) -> TaskResult<Status>;
}

/// How an invocation ended, when it did not end in a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failed,
}

impl Status {
    pub fn code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::Failed => 1,
        }
    }
}

/// Everything a command runs against.
///
/// The working directory lives in the context's shell, never in the
/// process: overrides are pushed onto the shell and popped by a guard.
pub struct Context {
    project: Project,
    sh: Shell,
    prompt: Box<dyn Prompt>,
}

impl Context {
    pub fn new(project: Project, prompt: Box<dyn Prompt>) -> TaskResult<Self> {
        let sh = Shell::new()?;
        Ok(Self {
            project,
            sh,
            prompt,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn shell(&self) -> &Shell {
        &self.sh
    }

    /// Current working directory of this context.
    pub fn cwd(&self) -> PathBuf {
        self.sh.current_dir()
    }

    pub fn confirm(&self, message: &str, default: bool) -> TaskResult<bool> {
        Ok(self.prompt.confirm(message, default)?)
    }

    /// Enter `dir` until the returned guard drops.
    pub fn enter(&self, dir: Option<PathBuf>) -> Option<PushDir<'_>> {
        dir.map(|dir| {
            debug!("entering {}", dir.display());
            self.sh.push_dir(dir)
        })
    }
}

/// Catch the domain failure at the invocation boundary.
pub fn conclude(name: &str, result: TaskResult<()>) -> TaskResult<Status> {
    match result {
        Ok(()) => Ok(Status::Success),
        Err(TaskError::Failed(err)) => {
            if let Some(message) = err.message() {
                eprintln!("{}", message);
            }
            debug!("{} failed", name);
            Ok(Status::Failed)
        }
        Err(err) => Err(err),
    }
}

/// Run `handle` inside the command's working directory.
fn scoped<C, F>(command: &C, ctx: &Context, handle: F) -> TaskResult<Status>
where
    C: CommandInfo + ?Sized,
    F: FnOnce() -> TaskResult<()>,
{
    let result = {
        let _dir = ctx.enter(command.cwd(ctx.project()));
        handle()
    };
    conclude(command.name(), result)
}

/// A command with a declarative clap parser.
pub trait ParsedCommand: CommandInfo {
    type Args: FromArgMatches;

    fn parser(&self) -> clap::Command {
        clap::Command::new(self.name()).about(self.description())
    }

    fn add_arguments(&self, parser: clap::Command) -> clap::Command;

    fn handle(&self, ctx: &Context, args: Self::Args) -> TaskResult<()>;
}

/// Parse `args` (without the program name) against the command's parser.
pub fn parse<C: ParsedCommand + ?Sized>(command: &C, args: &[String]) -> TaskResult<C::Args> {
    let parser = command.add_arguments(command.parser());
    let argv = iter::once(command.name().to_string()).chain(args.iter().cloned());
    let matches = parser.try_get_matches_from(argv)?;
    Ok(C::Args::from_arg_matches(&matches)?)
}

/// A command forwarding its raw arguments to `handle`.
pub trait ForwardingCommand: CommandInfo {
    fn handle(&self, ctx: &Context, args: &[String]) -> TaskResult<()>;
}

/// Arguments of a command that takes none.
#[derive(Debug, Default, Clone, clap::Args)]
pub struct NoArgs {}

/// Adapter registering a [`ParsedCommand`].
pub struct Parsed<C>(pub C);

impl<C: ParsedCommand> CommandInfo for Parsed<C> {
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

impl<C: ParsedCommand> Command for Parsed<C> {
    fn invoke(&self, ctx: &Context, args: &[String]) -> TaskResult<Status> {
        let args = parse(&self.0, args)?;
        scoped(self, ctx, || self.0.handle(ctx, args))
    }
}

/// Adapter registering a [`ForwardingCommand`].
pub struct Forwarded<C>(pub C);

impl<C: ForwardingCommand> CommandInfo for Forwarded<C> {
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

impl<C: ForwardingCommand> Command for Forwarded<C> {
    fn invoke(&self, ctx: &Context, args: &[String]) -> TaskResult<Status> {
        scoped(self, ctx, || self.0.handle(ctx, args))
    }
}
