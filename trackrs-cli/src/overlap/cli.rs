use clap::{Command, arg};

pub const OVERLAP_CMD: &str = "overlap";

pub fn create_overlap_cli() -> Command {
    Command::new(OVERLAP_CMD)
        .about("Report the universe intervals each query region overlaps")
        .arg_required_else_help(true)
        .arg(arg!(-q --query <query> "BED file of query regions").required(true))
        .arg(arg!(-u --universe <universe> "BED file of intervals to search").required(true))
}
