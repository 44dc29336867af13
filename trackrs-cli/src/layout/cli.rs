use clap::{Command, arg};

pub const LAYOUT_CMD: &str = "layout";

pub fn create_layout_cli() -> Command {
    Command::new(LAYOUT_CMD)
        .about("Assign display rows to the reads of a region")
        .arg_required_else_help(true)
        .arg(arg!(-i --input <input> "SAM file (optionally gzipped)").required(true))
        .arg(arg!(-r --region <region> "Region to lay out, e.g. chr1:1,000-2,000").required(true))
        .arg(arg!(-c --config <config> "Layout settings in TOML"))
        .arg(arg!(--sort <mode> "Sort mode: none, position, strand, haplotype, strand_and_position, haplotype_and_position"))
        .arg(arg!(--link <mode> "Link mode: none, split_only, all"))
        .arg(arg!(--locus <position> "1-based position whose base orders reads in position sort modes").value_parser(clap::value_parser!(i64)))
        .arg(arg!(--rows <rows> "Visible rows per category").value_parser(clap::value_parser!(usize)))
        .arg(arg!(--threads <threads> "Decode threads (0 = all cores)").value_parser(clap::value_parser!(usize)))
}
