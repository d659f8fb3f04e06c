//! Builders for CI documents: pipelines (workflows) and composite actions.
//!
//! Both are parsed commands with a `create` / `delete` sub-command surface.
//! `create` assembles the document from the builder's hooks and writes it to
//! a path derived from the builder's identifier; `delete` removes that file
//! and does nothing when it is absent.

use std::path::PathBuf;

use clap::{ArgMatches, FromArgMatches};

use crate::command::{CommandInfo, Context, ParsedCommand};
use crate::config::Project;
use crate::document::{self, Entries, Node};
use crate::entries;
use crate::error::{CommandError, TaskResult};

/// Parsed `create` / `delete` sub-command.
#[derive(Debug)]
pub enum DocumentRequest<O> {
    Create(O),
    Delete,
    /// No sub-command given.
    Missing,
}

impl<O: FromArgMatches> FromArgMatches for DocumentRequest<O> {
    fn from_arg_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        match matches.subcommand() {
            Some(("create", sub)) => Ok(Self::Create(O::from_arg_matches(sub)?)),
            Some(("delete", _)) => Ok(Self::Delete),
            _ => Ok(Self::Missing),
        }
    }

    fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
        *self = Self::from_arg_matches(matches)?;
        Ok(())
    }
}

fn missing_request() -> CommandError {
    CommandError::new("No command provided. Use `create` or `delete` command.")
}

/// Attach `create` (with `O`'s options) and `delete` sub-commands.
fn document_subcommands<O: clap::Args>(parser: clap::Command, kind: &'static str) -> clap::Command {
    let create = O::augment_args(clap::Command::new("create").about(format!("Create {}", kind)));
    let delete = clap::Command::new("delete").about(format!("Delete {}", kind));
    parser.subcommand(delete).subcommand(create)
}

/// Default triggers: push and pull request against the integration branch.
pub fn default_triggers(project: &Project) -> Entries {
    let branch = project.config().ci.branch.clone();
    entries! {
        "push" => entries! { "branches" => vec![branch.clone()] },
        "pull_request" => entries! { "branches" => vec![branch] },
    }
}

/// A pipeline document builder.
pub trait Workflow: CommandInfo {
    type Options: clap::Args;

    /// Display name of the pipeline.
    fn workflow_name(&self) -> &'static str;

    /// Identifier; also names the written file.
    fn workflow_id(&self) -> &'static str;

    fn permissions(&self, _ctx: &Context, _options: &Self::Options) -> TaskResult<Entries> {
        Ok(Entries::new())
    }

    fn triggers(&self, ctx: &Context, _options: &Self::Options) -> TaskResult<Entries> {
        Ok(default_triggers(ctx.project()))
    }

    fn jobs(&self, ctx: &Context, options: &Self::Options) -> TaskResult<Entries>;

    /// `name`, `run-name`, `permissions`, `on`, `jobs`; empty mappings are omitted.
    fn definition(&self, ctx: &Context, options: &Self::Options) -> TaskResult<Entries> {
        let mut workflow = entries! {
            "name" => self.workflow_name(),
            "run-name" => self.workflow_id(),
        };

        let permissions = self.permissions(ctx, options)?;
        if !permissions.is_empty() {
            workflow.insert("permissions", permissions);
        }

        let triggers = self.triggers(ctx, options)?;
        if !triggers.is_empty() {
            workflow.insert("on", triggers);
        }

        workflow.insert("jobs", self.jobs(ctx, options)?);
        Ok(workflow)
    }

    fn path(&self, project: &Project) -> PathBuf {
        project
            .workflows_dir()
            .join(format!("{}.yml", self.workflow_id()))
    }

    fn create(&self, ctx: &Context, options: &Self::Options) -> TaskResult<()> {
        let definition = self.definition(ctx, options)?;
        document::write(ctx.shell(), &self.path(ctx.project()), &definition)
    }

    fn delete(&self, ctx: &Context) -> TaskResult<()> {
        document::remove(ctx.shell(), &self.path(ctx.project()))
    }
}

/// A composite action document builder.
pub trait Action: CommandInfo {
    type Options: clap::Args;

    fn action_name(&self) -> &'static str;

    /// Identifier; names the action's directory.
    fn action_id(&self) -> &'static str;

    fn using(&self) -> &'static str {
        "composite"
    }

    fn steps(&self, _ctx: &Context, _options: &Self::Options) -> TaskResult<Vec<Node>> {
        Ok(Vec::new())
    }

    fn definition(&self, ctx: &Context, options: &Self::Options) -> TaskResult<Entries> {
        Ok(entries! {
            "name" => self.action_name(),
            "description" => self.description(),
            "runs" => entries! {
                "using" => self.using(),
                "steps" => self.steps(ctx, options)?,
            },
        })
    }

    fn path(&self, project: &Project) -> PathBuf {
        project
            .actions_dir()
            .join(self.action_id())
            .join("action.yml")
    }

    fn create(&self, ctx: &Context, options: &Self::Options) -> TaskResult<()> {
        let definition = self.definition(ctx, options)?;
        document::write(ctx.shell(), &self.path(ctx.project()), &definition)
    }

    fn delete(&self, ctx: &Context) -> TaskResult<()> {
        document::remove(ctx.shell(), &self.path(ctx.project()))
    }
}

/// Adapter turning a [`Workflow`] into a [`ParsedCommand`].
pub struct Pipeline<W>(pub W);

impl<W: Workflow> CommandInfo for Pipeline<W> {
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

impl<W: Workflow> ParsedCommand for Pipeline<W> {
    type Args = DocumentRequest<W::Options>;

    fn add_arguments(&self, parser: clap::Command) -> clap::Command {
        document_subcommands::<W::Options>(parser, "workflow")
    }

    fn handle(&self, ctx: &Context, request: Self::Args) -> TaskResult<()> {
        match request {
            DocumentRequest::Create(options) => self.0.create(ctx, &options),
            DocumentRequest::Delete => self.0.delete(ctx),
            DocumentRequest::Missing => Err(missing_request().into()),
        }
    }
}

/// Adapter turning an [`Action`] into a [`ParsedCommand`].
pub struct ActionDocument<A>(pub A);

impl<A: Action> CommandInfo for ActionDocument<A> {
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

impl<A: Action> ParsedCommand for ActionDocument<A> {
    type Args = DocumentRequest<A::Options>;

    fn add_arguments(&self, parser: clap::Command) -> clap::Command {
        document_subcommands::<A::Options>(parser, "action")
    }

    fn handle(&self, ctx: &Context, request: Self::Args) -> TaskResult<()> {
        match request {
            DocumentRequest::Create(options) => self.0.create(ctx, &options),
            DocumentRequest::Delete => self.0.delete(ctx),
            DocumentRequest::Missing => Err(missing_request().into()),
        }
    }
}
