//! # Command Line Interface / 命令行接口
//!
//! Builds the `reach-matrix` command with clap's builder API and dispatches
//! to the `run`, `plan` and `init` commands. Help texts are localized, so the
//! language is pre-parsed before the command is built.
//!
//! 使用 clap 的构建器 API 构建 `reach-matrix` 命令，并分发到 `run`、`plan` 和 `init` 命令。
//! 帮助文本经过本地化，因此在构建命令之前预先解析语言。

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::infra::logging::init_logging;
use crate::{infra::t, resolve_locale};

pub mod commands;

/// Finds an explicit `--lang <VALUE>` or `--lang=<VALUE>` before clap runs.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    for (pos, arg) in args.iter().enumerate() {
        if arg == "--lang" {
            return args.get(pos + 1).cloned();
        }
        if let Some(value) = arg.strip_prefix("--lang=") {
            return Some(value.to_string());
        }
    }
    None
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help(t!("cli.arg_config").to_string())
        .value_name("CONFIG")
        .value_parser(clap::value_parser!(PathBuf))
        .action(ArgAction::Set)
}

fn project_dir_arg() -> Arg {
    Arg::new("project-dir")
        .long("project-dir")
        .help(t!("cli.arg_project_dir").to_string())
        .value_name("PROJECT_DIR")
        .default_value(".")
        .value_parser(clap::value_parser!(PathBuf))
        .action(ArgAction::Set)
}

fn only_arg() -> Arg {
    Arg::new("only")
        .long("only")
        .help(t!("cli.arg_only").to_string())
        .value_name("CONFIGURATION")
        .action(ArgAction::Append)
}

pub fn build_cli() -> Command {
    Command::new("reach-matrix")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about").to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.arg_lang").to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help(t!("cli.arg_verbose").to_string())
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cli.cmd_run_about").to_string())
                .arg(config_arg())
                .arg(project_dir_arg())
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help(t!("cli.arg_jobs").to_string())
                        .value_name("JOBS")
                        .default_value("1")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(only_arg())
                .arg(
                    Arg::new("total-runners")
                        .long("total-runners")
                        .help(t!("cli.arg_total_runners").to_string())
                        .value_name("TOTAL_RUNNERS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set)
                        .requires("runner-index"),
                )
                .arg(
                    Arg::new("runner-index")
                        .long("runner-index")
                        .help(t!("cli.arg_runner_index").to_string())
                        .value_name("RUNNER_INDEX")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set)
                        .requires("total-runners"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help(t!("cli.arg_json").to_string())
                        .value_name("JSON")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help(t!("cli.arg_html").to_string())
                        .value_name("HTML")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("keep-workspaces")
                        .long("keep-workspaces")
                        .help(t!("cli.arg_keep_workspaces").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("plan")
                .about(t!("cli.cmd_plan_about").to_string())
                .arg(config_arg())
                .arg(project_dir_arg())
                .arg(only_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .help(t!("cli.arg_format").to_string())
                        .value_name("FORMAT")
                        .value_parser(["table", "json"])
                        .default_value("table")
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.cmd_init_about").to_string())
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("cli.arg_non_interactive").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("cli.arg_force").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn only_values(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("only")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Parses the command line and runs the selected command.
pub async fn run() -> Result<()> {
    // Help texts are translated, so the locale must be set before clap runs.
    let explicit_lang = pre_parse_language();
    rust_i18n::set_locale(&resolve_locale(explicit_lang.as_deref()));

    let matches = build_cli().get_matches();
    init_logging(matches.get_flag("verbose"));
    let lang_is_explicit = explicit_lang.is_some();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let options = commands::run::RunOptions {
                config: run_matches.get_one::<PathBuf>("config").cloned(),
                project_dir: run_matches
                    .get_one::<PathBuf>("project-dir")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(".")),
                jobs: run_matches.get_one::<usize>("jobs").copied().unwrap_or(1),
                only: only_values(run_matches),
                total_runners: run_matches.get_one::<usize>("total-runners").copied(),
                runner_index: run_matches.get_one::<usize>("runner-index").copied(),
                json: run_matches.get_one::<PathBuf>("json").cloned(),
                html: run_matches.get_one::<PathBuf>("html").cloned(),
                keep_workspaces: run_matches.get_flag("keep-workspaces"),
                lang_is_explicit,
            };
            commands::run::execute(options).await
        }
        Some(("plan", plan_matches)) => {
            let options = commands::plan::PlanOptions {
                config: plan_matches.get_one::<PathBuf>("config").cloned(),
                project_dir: plan_matches
                    .get_one::<PathBuf>("project-dir")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(".")),
                only: only_values(plan_matches),
                json: plan_matches
                    .get_one::<String>("format")
                    .is_some_and(|f| f == "json"),
                lang_is_explicit,
            };
            commands::plan::execute(options)
        }
        Some(("init", init_matches)) => commands::init::execute(
            init_matches.get_flag("non-interactive"),
            init_matches.get_flag("force"),
        ),
        // `subcommand_required` makes clap exit before we get here.
        _ => Ok(()),
    }
}
