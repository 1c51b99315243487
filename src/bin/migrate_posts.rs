use log::*;
use post_migration_rs::{config::MigrationConfig, prompt::StdioPrompter, *};
use std::{path::PathBuf, process::ExitCode};
use tap::prelude::*;

use clap::{Arg, ArgAction, ArgMatches, arg, command, value_parser};

fn parse_args() -> ArgMatches {
    command!()
        .about("Migrates old blog posts into the dated post tree, asking for their metadata")
        .arg(
            Arg::new("verbose")
                .help("-v: debug, -vv: trace")
                .short('v')
                .action(ArgAction::Count),
        )
        .arg(
            arg!([dir] "Folder holding the posts to migrate")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"output-root" <PATH> "Folder the yearly post folders live in")
                .default_value(config::DEFAULT_OUTPUT_ROOT)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--author <NAME> "Author written into every post")
                .default_value(config::DEFAULT_AUTHOR),
        )
        .arg(
            arg!(--year <YEAR> "Year every migrated post is filed under [default: 2025]")
                .value_parser(value_parser!(i32)),
        )
        .arg(arg!(--"no-overwrite" "Fail a post instead of replacing an existing file"))
        .arg(arg!(--"fail-fast" "Stop at the first post that fails"))
        .get_matches()
}

fn config_from_matches(matches: &ArgMatches) -> MigrationConfig {
    MigrationConfig {
        author: matches
            .get_one::<String>("author")
            .cloned()
            .unwrap_or_else(|| config::DEFAULT_AUTHOR.to_owned()),
        default_year: matches
            .get_one::<i32>("year")
            .copied()
            .unwrap_or(config::DEFAULT_YEAR),
        output_root: matches
            .get_one::<PathBuf>("output-root")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(config::DEFAULT_OUTPUT_ROOT)),
        overwrite: !matches.get_flag("no-overwrite"),
        fail_fast: matches.get_flag("fail-fast"),
    }
}

fn main() -> ExitCode {
    let matches = parse_args();

    let verbose = matches.get_count("verbose").pipe(|n| match n {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        2 => LevelFilter::Trace,
        _ => LevelFilter::Off,
    });

    drivers::init_logging_with_level(verbose);

    let source_dir = matches
        .get_one::<PathBuf>("dir")
        .expect("dir is a required argument");

    let config = config_from_matches(&matches);

    debug!("config: {config:?}");

    let mut prompter = StdioPrompter::stdio();

    match drivers::migrate_posts_in_dir(&mut prompter, &config, source_dir) {
        Ok(summary) if summary.has_failures() => {
            error!("{} posts failed: {:?}", summary.failed.len(), summary.failed);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
