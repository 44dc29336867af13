mod coverage;
mod layout;
mod overlap;
mod reads;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "trackrs";
    pub const BIN_NAME: &str = "trackrs";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Interval overlap queries, read layout and coverage for genome alignment viewers.")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug messages (RUST_LOG takes precedence)"),
        )
        .subcommand(overlap::cli::create_overlap_cli())
        .subcommand(layout::cli::create_layout_cli())
        .subcommand(coverage::cli::create_coverage_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    let level = match matches.get_flag("verbose") {
        true => "debug",
        false => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match matches.subcommand() {
        //
        // OVERLAPS
        //
        Some((overlap::cli::OVERLAP_CMD, matches)) => {
            overlap::handlers::run_overlap(matches)?;
        }

        //
        // READ LAYOUT
        //
        Some((layout::cli::LAYOUT_CMD, matches)) => {
            layout::handlers::run_layout(matches)?;
        }

        //
        // COVERAGE
        //
        Some((coverage::cli::COVERAGE_CMD, matches)) => {
            coverage::handlers::run_coverage(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
