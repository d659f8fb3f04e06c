//! GitHub workflow approving pull requests from trusted authors.

use crate::command::{CommandInfo, Context};
use crate::document::{Entries, Node};
use crate::entries;
use crate::error::TaskResult;
use crate::registry::Registry;
use crate::workflow::Workflow;

pub fn register(registry: &mut Registry) {
    registry.workflow(ApprovalBot);
}

#[derive(Debug, Default, clap::Args)]
pub struct ApprovalBotOptions {
    /// Automatically approve pull requests from owner.
    #[arg(long, short = 'o')]
    pub owner: bool,
    /// Automatically approve pull requests from dependabot.
    #[arg(long, short = 'd')]
    pub dependabot: bool,
    /// Run commit linter on the pull requests.
    #[arg(long, short = 'l')]
    pub commit_linter: bool,
    /// Clear automerge on the pull requests, --dependabot includes this option.
    #[arg(long, short = 'c')]
    pub clear_automerge: bool,
}

const RUNS_ON: &str = "ubuntu-latest";
const DEPENDABOT: &str = "dependabot[bot]";

/// Environment of every `gh` step.
fn gh_env() -> Entries {
    entries! {
        "PR_URL" => "${{github.event.pull_request.html_url}}",
        "GITHUB_TOKEN" => "${{secrets.GITHUB_TOKEN}}",
    }
}

fn gh_step(name: &str, condition: Option<&str>, run: &str) -> Node {
    let mut step = entries! { "name" => name };
    if let Some(condition) = condition {
        step.insert("if", condition);
    }
    step.insert("run", run);
    step.insert("env", gh_env());
    step.into()
}

fn update_type_is(kind: &str) -> String {
    format!("steps.dependabot-metadata.outputs.update-type == 'version-update:semver-{}'", kind)
}

fn dependency_type_is(kind: &str) -> String {
    format!("steps.dependabot-metadata.outputs.dependency-type == 'direct:{}'", kind)
}

pub struct ApprovalBot;

impl ApprovalBot {
    fn clear_automerge() -> Entries {
        entries! {
            "name" => "Clear automerge",
            "runs-on" => RUNS_ON,
            "steps" => vec![gh_step(
                "Disable auto-merge",
                None,
                "gh pr merge --disable-auto \"$PR_URL\" || true",
            )],
        }
    }

    fn approve_owner() -> Entries {
        entries! {
            "name" => "Auto approve owner",
            "runs-on" => RUNS_ON,
            "if" => "${{github.event.pull_request.user.login == github.repository_owner}}",
            "steps" => vec![gh_step(
                "Auto approve owner",
                None,
                "gh pr review \"$PR_URL\" --approve",
            )],
        }
    }

    fn approve_dependabot() -> Entries {
        let patch_or_minor = format!("${{{{{} || {}}}}}", update_type_is("patch"), update_type_is("minor"));
        let major_development = format!(
            "${{{{{} && {}}}}}",
            update_type_is("major"),
            dependency_type_is("development")
        );
        let major_production = format!(
            "${{{{{} && {}}}}}",
            update_type_is("major"),
            dependency_type_is("production")
        );
        let comment_production = [
            "gh pr comment $PR_URL --body \"I'm **not approving** this PR because **it includes a major update of a dependency used in production**\"",
            "gh pr edit $PR_URL --add-label \"requires-manual-qa\"",
            "gh pr edit $PR_URL --add-assignee ${{ github.repository_owner }}",
        ]
        .join("\n");

        entries! {
            "name" => "Auto approve dependabot",
            "runs-on" => RUNS_ON,
            "needs" => vec!["clear-automerge"],
            "if" => format!("${{{{github.event.pull_request.user.login == '{}'}}}}", DEPENDABOT),
            "steps" => vec![
                entries! {
                    "name" => "Dependabot metadata",
                    "id" => "dependabot-metadata",
                    "uses" => "dependabot/fetch-metadata@v2.1.0",
                }
                .into(),
                gh_step(
                    "Approve patch and minor updates",
                    Some(patch_or_minor.as_str()),
                    "gh pr review \"$PR_URL\" --approve -b \"I'm **approving** this pull request because **it includes a patch or minor update**\"",
                ),
                gh_step(
                    "Approve major updates of development dependencies",
                    Some(major_development.as_str()),
                    "gh pr review \"$PR_URL\" --approve -b \"I'm **approving** this pull request because **it includes a major update of a dependency only used in development**\"",
                ),
                gh_step(
                    "Comment major updates of production dependencies",
                    Some(major_production.as_str()),
                    &comment_production,
                ),
                gh_step(
                    "Enable auto merge",
                    Some("${{ github.event.pull_request.assignees != null }}"),
                    "gh pr merge --auto --merge \"$PR_URL\"",
                ),
            ],
        }
    }

    fn commit_linter() -> Entries {
        entries! {
            "name" => "Commit linter",
            "runs-on" => RUNS_ON,
            "if" => format!("${{{{ github.event.pull_request.user.login != '{}' }}}}", DEPENDABOT),
            "steps" => vec![entries! {
                "name" => "Check commit messages",
                "uses" => "opensource-nepal/commitlint@v1",
            }],
        }
    }
}

impl CommandInfo for ApprovalBot {
    fn name(&self) -> &'static str {
        "github_approval_bot"
    }

    fn description(&self) -> &'static str {
        "Automatically approve pull requests."
    }
}

impl Workflow for ApprovalBot {
    type Options = ApprovalBotOptions;

    fn workflow_name(&self) -> &'static str {
        "Approval Bot"
    }

    fn workflow_id(&self) -> &'static str {
        "approval-bot"
    }

    fn permissions(&self, _ctx: &Context, _options: &ApprovalBotOptions) -> TaskResult<Entries> {
        Ok(entries! {
            "contents" => "write",
            "pull-requests" => "write",
        })
    }

    fn triggers(&self, ctx: &Context, _options: &ApprovalBotOptions) -> TaskResult<Entries> {
        let branch = ctx.project().config().ci.branch.as_str();
        Ok(entries! {
            "pull_request" => entries! { "branches" => vec![branch] },
        })
    }

    fn jobs(&self, _ctx: &Context, options: &ApprovalBotOptions) -> TaskResult<Entries> {
        let mut jobs = Entries::new();

        if options.clear_automerge || options.dependabot {
            jobs.insert("clear-automerge", Self::clear_automerge());
        }
        if options.owner {
            jobs.insert("auto-approve-owner", Self::approve_owner());
        }
        if options.dependabot {
            jobs.insert("auto-approve-dependabot", Self::approve_dependabot());
        }
        if options.commit_linter {
            jobs.insert("commit-linter", Self::commit_linter());
        }

        Ok(jobs)
    }
}
