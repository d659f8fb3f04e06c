//! Ruff linter.

use std::path::PathBuf;

use crate::command::CommandInfo;
use crate::config::Project;
use crate::exec::ExecCommand;
use crate::registry::Registry;

pub fn register(registry: &mut Registry) {
    registry.exec(Ruff);
}

#[derive(Debug, clap::Args)]
pub struct RuffArgs {
    /// Files to check (defaults to ruff's own discovery)
    pub files: Vec<PathBuf>,
    /// Apply fixes
    #[arg(long)]
    pub fix: bool,
}

pub struct Ruff;

impl CommandInfo for Ruff {
    fn name(&self) -> &'static str {
        "ruff"
    }

    fn description(&self) -> &'static str {
        "Runs ruff linter of given files."
    }
}

impl ExecCommand for Ruff {
    type Args = RuffArgs;

    fn program(&self, project: &Project) -> String {
        project.config().tools.ruff.clone()
    }

    fn add_arguments(&self, parser: clap::Command) -> clap::Command {
        <RuffArgs as clap::Args>::augment_args(parser)
    }

    fn get_args(&self, args: &RuffArgs) -> Vec<String> {
        let mut command_args = vec!["check".to_string()];
        if args.fix {
            command_args.push("--fix".to_string());
        }
        command_args.extend(args.files.iter().map(|file| file.display().to_string()));
        command_args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse;
    use crate::exec::Exec;

    fn args_for(argv: &[&str]) -> Vec<String> {
        let argv = argv.iter().map(|arg| arg.to_string()).collect::<Vec<_>>();
        let parsed = parse(&Exec(Ruff), &argv).unwrap();
        Ruff.get_args(&parsed)
    }

    #[test]
    fn check_comes_first_then_fix_then_files() {
        assert_eq!(
            args_for(&["a.py", "--fix", "pkg/b.py"]),
            vec!["check", "--fix", "a.py", "pkg/b.py"]
        );
        assert_eq!(args_for(&[]), vec!["check"]);
    }
}
