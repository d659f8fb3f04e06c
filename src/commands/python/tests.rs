//! Test runners, coverage, type checking and import boundaries.

use std::path::PathBuf;

use crate::command::{CommandInfo, Context, ForwardingCommand, NoArgs, ParsedCommand};
use crate::config::Project;
use crate::error::{CommandError, TaskResult};
use crate::exec::{ExecCommand, Invocation};
use crate::registry::Registry;
use crate::suites::{self, Summary};

pub fn register(registry: &mut Registry) {
    registry.forwarded(Pytest);
    registry.parsed(NamedSuites);
    registry.parsed(AllSuites);
    registry.parsed(Coverage);
    registry.forwarded(MyPy);
    registry.exec(ImportLinter);
}

/// Plain pytest; arguments are pytest's own.
pub struct Pytest;

impl CommandInfo for Pytest {
    fn name(&self) -> &'static str {
        "pytest"
    }

    fn description(&self) -> &'static str {
        "Runs pytest"
    }
}

impl ForwardingCommand for Pytest {
    fn handle(&self, ctx: &Context, args: &[String]) -> TaskResult<()> {
        let config = ctx.project().config();
        let args = if args.is_empty() {
            config
                .pytest
                .options
                .iter()
                .chain(&config.pytest.files)
                .cloned()
                .collect()
        } else {
            args.to_vec()
        };

        Invocation::new(&config.tools.pytest).args(args).run(ctx)
    }
}

#[derive(Debug, clap::Args)]
pub struct NamedSuitesArgs {
    /// Suites to run
    pub names: Vec<String>,
}

pub struct NamedSuites;

impl CommandInfo for NamedSuites {
    fn name(&self) -> &'static str {
        "test_suite"
    }

    fn description(&self) -> &'static str {
        "Runs a specific test suite"
    }
}

impl ParsedCommand for NamedSuites {
    type Args = NamedSuitesArgs;

    fn add_arguments(&self, parser: clap::Command) -> clap::Command {
        <NamedSuitesArgs as clap::Args>::augment_args(parser)
    }

    fn handle(&self, ctx: &Context, args: NamedSuitesArgs) -> TaskResult<()> {
        let mut summary = Summary::new();

        for suite in suites::planned(ctx.project()) {
            if args.names.contains(&suite.name) {
                summary.record(&suite.name, suites::run_suite(ctx, &suite, &[]))?;
            }
        }

        if summary.is_empty() {
            return Err(CommandError::new("No tests found.").into());
        }
        summary.finish()
    }
}

#[derive(Debug, clap::Args)]
pub struct AllSuitesArgs {
    /// Extra pytest options for every suite
    #[arg(last = true)]
    pub options: Vec<String>,
}

pub struct AllSuites;

impl CommandInfo for AllSuites {
    fn name(&self) -> &'static str {
        "all_tests"
    }

    fn description(&self) -> &'static str {
        "Runs all tests"
    }
}

impl ParsedCommand for AllSuites {
    type Args = AllSuitesArgs;

    fn add_arguments(&self, parser: clap::Command) -> clap::Command {
        <AllSuitesArgs as clap::Args>::augment_args(parser)
    }

    fn handle(&self, ctx: &Context, args: AllSuitesArgs) -> TaskResult<()> {
        let mut summary = Summary::new();
        for suite in suites::planned(ctx.project()) {
            summary.record(&suite.name, suites::run_suite(ctx, &suite, &args.options))?;
        }
        summary.finish()
    }
}

#[derive(Debug, clap::Args)]
pub struct CoverageArgs {
    /// Fail if coverage is below <value> percent
    #[arg(long, default_value_t = 0)]
    pub fail_under: u32,
    /// Don't create report
    #[arg(long)]
    pub no_report: bool,
}

pub struct Coverage;

impl Coverage {
    fn report_dir(project: &Project) -> PathBuf {
        project
            .source_root()
            .join(&project.config().coverage.report_dir)
    }
}

impl CommandInfo for Coverage {
    fn name(&self) -> &'static str {
        "coverage"
    }

    fn description(&self) -> &'static str {
        "Runs coverage for all tests and create reports in `coverage/`."
    }

    fn cwd(&self, project: &Project) -> Option<PathBuf> {
        Some(project.source_root())
    }
}

impl ParsedCommand for Coverage {
    type Args = CoverageArgs;

    fn add_arguments(&self, parser: clap::Command) -> clap::Command {
        <CoverageArgs as clap::Args>::augment_args(parser)
    }

    fn handle(&self, ctx: &Context, args: CoverageArgs) -> TaskResult<()> {
        let project = ctx.project();
        let coverage = &project.config().tools.coverage;

        Invocation::new(coverage).arg("erase").run(ctx)?;

        for suite in suites::planned(project) {
            let mut run_args = vec![
                "run".to_string(),
                "--append".to_string(),
                "-m".to_string(),
                "pytest".to_string(),
            ];
            run_args.extend(suites::pytest_args(&suite, &[]));

            // a failing suite still contributes its coverage data
            let result = suites::suite_invocation(ctx, &suite, coverage, run_args).run(ctx);
            match result {
                Err(err) if err.is_failure() => warn!("suite {} failed", suite.name),
                other => other?,
            }
        }

        if !args.no_report {
            let report_dir = Self::report_dir(project);
            Invocation::new(coverage)
                .args(["html", "-d"])
                .arg(report_dir.join("html").display().to_string())
                .run(ctx)?;
            Invocation::new(coverage)
                .args(["xml", "-o"])
                .arg(report_dir.join("report.xml").display().to_string())
                .run(ctx)?;
        }

        Invocation::new(coverage).arg("report").run(ctx)?;
        let total = ctx
            .shell()
            .cmd(coverage)
            .args(["report", "--format=total"])
            .quiet()
            .read()?;
        let rate = parse_total(&total)?;

        if rate < f64::from(args.fail_under) {
            return Err(CommandError::new(format!(
                "Coverage is below {}%. Current coverage is {:.0}%",
                args.fail_under, rate
            ))
            .into());
        }
        Ok(())
    }
}

fn parse_total(output: &str) -> TaskResult<f64> {
    output.trim().parse::<f64>().map_err(|_| {
        CommandError::new(format!("Unexpected coverage total: {}", output.trim())).into()
    })
}

/// mypy; arguments are mypy's own.
pub struct MyPy;

impl CommandInfo for MyPy {
    fn name(&self) -> &'static str {
        "mypy"
    }

    fn description(&self) -> &'static str {
        "Runs mypy type checker"
    }

    fn cwd(&self, project: &Project) -> Option<PathBuf> {
        Some(project.source_root())
    }
}

impl ForwardingCommand for MyPy {
    fn handle(&self, ctx: &Context, args: &[String]) -> TaskResult<()> {
        let config = ctx.project().config();
        let args = if args.is_empty() {
            config.mypy.files.clone()
        } else {
            args.to_vec()
        };

        Invocation::new(&config.tools.mypy).args(args).run(ctx)
    }
}

pub struct ImportLinter;

impl CommandInfo for ImportLinter {
    fn name(&self) -> &'static str {
        "import_linter"
    }

    fn description(&self) -> &'static str {
        "Checks for forbidden imports."
    }

    fn cwd(&self, project: &Project) -> Option<PathBuf> {
        Some(project.root().to_path_buf())
    }
}

impl ExecCommand for ImportLinter {
    type Args = NoArgs;

    fn program(&self, project: &Project) -> String {
        project.config().tools.import_linter.clone()
    }

    fn add_arguments(&self, parser: clap::Command) -> clap::Command {
        parser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, Forwarded, Parsed, Status};
    use crate::config::{Config, Suite};
    use crate::prompt::Defaults;
    use std::fs;
    use std::path::Path;

    fn context(root: &Path, config: Config) -> Context {
        let ctx = Context::new(Project::new(root, config), Box::new(Defaults)).unwrap();
        ctx.shell().change_dir(root);
        ctx
    }

    fn suite(name: &str) -> Suite {
        Suite {
            name: name.into(),
            files: vec![format!("{}.marker", name)],
            ..Suite::default()
        }
    }

    /// An executable shell script at `root/name`.
    fn script(root: &Path, name: &str, body: &str) -> String {
        let script = root.join(name);
        fs::write(&script, format!("#!/bin/sh\n{}", body)).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        }
        script.display().to_string()
    }

    /// A pytest stand-in that records its arguments and fails on `bad.marker`.
    fn fake_pytest(root: &Path) -> String {
        script(
            root,
            "fake-pytest",
            "echo \"$@\" >> calls.txt\ncase \"$*\" in *bad.marker*) exit 1;; esac\n",
        )
    }

    /// A coverage stand-in: records its arguments, fails runs of `bad.marker`
    /// and reports a total of 42.
    fn fake_coverage(root: &Path) -> String {
        script(
            root,
            "fake-coverage",
            "echo \"$@\" >> calls.txt\n\
             case \"$*\" in\n\
             *bad.marker*) exit 1;;\n\
             \"report --format=total\") echo 42.0;;\n\
             esac\n",
        )
    }

    fn config_with(root: &Path, suites: Vec<Suite>) -> Config {
        let mut config = Config::default();
        config.tools.pytest = fake_pytest(root);
        config.suites = suites;
        config
    }

    fn calls(root: &Path) -> Vec<String> {
        fs::read_to_string(root.join("calls.txt"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn pytest_forwards_raw_arguments_or_configured_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_with(dir.path(), Vec::new());
        config.pytest.options = vec!["-q".into()];
        config.pytest.files = vec!["tests".into()];
        let ctx = context(dir.path(), config);
        let command = Forwarded(Pytest);

        command.invoke(&ctx, &["-k".into(), "slow".into()]).unwrap();
        command.invoke(&ctx, &[]).unwrap();

        assert_eq!(calls(dir.path()), vec!["-k slow", "-q tests"]);
    }

    #[test]
    fn named_suites_run_only_the_listed_ones() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), config_with(dir.path(), vec![suite("unit"), suite("e2e")]));

        let status = Parsed(NamedSuites).invoke(&ctx, &["e2e".into()]).unwrap();

        assert_eq!(status, Status::Success);
        assert_eq!(calls(dir.path()), vec!["e2e.marker"]);
    }

    #[test]
    fn unknown_suite_names_fail() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), config_with(dir.path(), vec![suite("unit")]));

        let status = Parsed(NamedSuites).invoke(&ctx, &["nope".into()]).unwrap();

        assert_eq!(status, Status::Failed);
        assert!(calls(dir.path()).is_empty());
    }

    #[test]
    fn all_suites_run_even_after_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(
            dir.path(),
            config_with(dir.path(), vec![suite("bad"), suite("unit")]),
        );

        let status = Parsed(AllSuites)
            .invoke(&ctx, &["--".into(), "-x".into()])
            .unwrap();

        assert_eq!(status, Status::Failed);
        assert_eq!(calls(dir.path()), vec!["-x bad.marker", "-x unit.marker"]);
    }

    #[test]
    fn suites_run_with_their_environment_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("api")).unwrap();
        let mut api = suite("api");
        api.cwd = Some(PathBuf::from("api"));
        api.env.insert("APP_ENV".into(), "test".into());

        let mut config = Config::default();
        config.tools.pytest = "sh".into();
        api.files = vec!["-c".into(), "test \"$APP_ENV\" = test && touch ran".into()];
        config.suites = vec![api];
        let ctx = context(dir.path(), config);

        let status = Parsed(AllSuites).invoke(&ctx, &[]).unwrap();

        assert_eq!(status, Status::Success);
        assert!(dir.path().join("api/ran").exists());
    }

    #[test]
    fn all_suites_fall_back_to_plain_pytest() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_with(dir.path(), Vec::new());
        config.pytest.options = vec!["-q".into()];
        config.pytest.files = vec!["bad.marker".into()];
        let ctx = context(dir.path(), config);

        let status = Parsed(AllSuites).invoke(&ctx, &[]).unwrap();

        assert_eq!(status, Status::Failed);
        assert_eq!(calls(dir.path()), vec!["-q bad.marker"]);
    }

    #[test]
    fn named_suites_know_the_plain_pytest_suite() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_with(dir.path(), Vec::new());
        config.pytest.files = vec!["tests".into()];
        let ctx = context(dir.path(), config);

        let status = Parsed(NamedSuites).invoke(&ctx, &["pytest".into()]).unwrap();

        assert_eq!(status, Status::Success);
        assert_eq!(calls(dir.path()), vec!["tests"]);
    }

    fn coverage_config(root: &Path, suites: Vec<Suite>) -> Config {
        let mut config = Config::default();
        config.tools.coverage = fake_coverage(root);
        config.suites = suites;
        config
    }

    #[test]
    fn coverage_runs_every_suite_then_reports_and_checks_the_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(
            dir.path(),
            coverage_config(dir.path(), vec![suite("bad"), suite("unit")]),
        );
        let args = CoverageArgs {
            fail_under: 50,
            no_report: false,
        };

        let err = Coverage.handle(&ctx, args).unwrap_err();

        assert!(err.is_failure());
        assert_eq!(
            err.to_string(),
            "Coverage is below 50%. Current coverage is 42%"
        );
        let calls = calls(dir.path());
        assert_eq!(calls.len(), 7);
        assert_eq!(calls[0], "erase");
        assert_eq!(calls[1], "run --append -m pytest bad.marker");
        assert_eq!(calls[2], "run --append -m pytest unit.marker");
        assert!(calls[3].starts_with("html -d "));
        assert!(calls[3].ends_with("coverage/html"));
        assert!(calls[4].starts_with("xml -o "));
        assert!(calls[4].ends_with("coverage/report.xml"));
        assert_eq!(calls[5], "report");
        assert_eq!(calls[6], "report --format=total");
    }

    #[test]
    fn coverage_without_suites_runs_plain_pytest_and_skips_reports() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = coverage_config(dir.path(), Vec::new());
        config.pytest.options = vec!["-q".into()];
        config.pytest.files = vec!["tests".into()];
        let ctx = context(dir.path(), config);

        let status = Parsed(Coverage)
            .invoke(&ctx, &["--no-report".into(), "--fail-under".into(), "40".into()])
            .unwrap();

        assert_eq!(status, Status::Success);
        assert_eq!(
            calls(dir.path()),
            vec![
                "erase",
                "run --append -m pytest -q tests",
                "report",
                "report --format=total",
            ]
        );
    }

    #[test]
    fn coverage_total_is_parsed() {
        assert_eq!(parse_total("87.5\n").unwrap(), 87.5);
        assert!(parse_total("n/a").unwrap_err().is_failure());
    }
}
