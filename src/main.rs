use std::env;
use std::process::exit;

use projtask::error::{TaskError, TaskResult};
use projtask::{prompt, registry, Command, CommandInfo, Context, Project};

#[macro_use]
extern crate log;

/// Exit status of a fatal error that is neither a domain failure nor a usage error.
const FATAL: i32 = 2;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    match try_main() {
        Ok(code) => exit(code),
        // clap prints the message (or the help) and picks the status
        Err(TaskError::Usage(err)) => err.exit(),
        Err(e) => {
            error!("{}", e);
            exit(FATAL);
        }
    }
}

fn try_main() -> TaskResult<i32> {
    let mut args = env::args().skip(1).collect::<Vec<_>>();

    match args.first().map(String::as_str) {
        None | Some("-h") | Some("--help") | Some("help") => {
            print_help();
            return Ok(0);
        }
        Some("--list") => {
            for name in registry().names() {
                println!("{}", name);
            }
            return Ok(0);
        }
        _ => {}
    }

    let task_name = args.remove(0);
    let command = registry().resolve(&task_name)?;

    let project = Project::discover()?;

    let ctx = Context::new(project, prompt::for_terminal())?;
    let status = command.invoke(&ctx, &args)?;
    debug!("{} -> {:?}", command.name(), status);

    Ok(status.code())
}

fn print_help() {
    println!("projtask - project auxiliary tasks");
    println!();
    println!("Usage:");
    println!("  projtask <task> [<options>]");
    println!("  projtask --list");
    println!();
    println!("Tasks:");
    for command in registry().commands() {
        println!("  {}", command.name());
        println!("    {}", command.description());
    }
    println!();
    println!("Use `projtask <task> --help` for more information on a specific task.");
}
