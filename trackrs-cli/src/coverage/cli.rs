use clap::{Command, arg};

pub const COVERAGE_CMD: &str = "coverage";

pub fn create_coverage_cli() -> Command {
    Command::new(COVERAGE_CMD)
        .about("Per-base read depth over a region, as bedGraph")
        .arg_required_else_help(true)
        .arg(arg!(-i --input <input> "SAM file (optionally gzipped)").required(true))
        .arg(arg!(-r --region <region> "Region, e.g. chr1:1,000-2,000").required(true))
        .arg(arg!(--threads <threads> "Decode threads (0 = all cores)").value_parser(clap::value_parser!(usize)))
}
