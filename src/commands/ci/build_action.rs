//! Composite action installing the project and its dependencies.

use crate::command::{CommandInfo, Context, NoArgs};
use crate::document::Node;
use crate::entries;
use crate::error::TaskResult;
use crate::registry::Registry;
use crate::workflow::Action;

pub fn register(registry: &mut Registry) {
    registry.action(PythonBuildAction);
}

pub struct PythonBuildAction;

impl CommandInfo for PythonBuildAction {
    fn name(&self) -> &'static str {
        "github_python_build"
    }

    fn description(&self) -> &'static str {
        "Creates python build action for github actions."
    }
}

impl Action for PythonBuildAction {
    type Options = NoArgs;

    fn action_name(&self) -> &'static str {
        "Build python application."
    }

    fn action_id(&self) -> &'static str {
        "build"
    }

    fn steps(&self, ctx: &Context, _options: &NoArgs) -> TaskResult<Vec<Node>> {
        let install = ctx.project().config().ci.install.join("\n");

        Ok(vec![
            entries! {
                "name" => "Install git",
                "shell" => "bash",
                "run" => "apt update && apt install git -y",
            }
            .into(),
            entries! {
                "name" => "Checkout",
                "uses" => "actions/checkout@v4",
            }
            .into(),
            entries! {
                "name" => "Install dependencies",
                "shell" => "bash",
                "run" => install,
            }
            .into(),
        ])
    }
}
