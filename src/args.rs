use clap::{Parser, Subcommand};

/// This is the command line tool of the election administration tracking hub.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. Options passed on the command line
    /// override the values in this file.
    #[clap(short, long, value_parser, global = true)]
    pub config: Option<String>,

    /// (file path) The fixture file containing the records of the hub (JSON dump format).
    /// Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser, global = true)]
    pub data: Option<String>,

    /// (reject or allow, default reject) Whether blanket primaries may name a party.
    #[clap(long, value_parser, global = true)]
    pub blanket_primary_party: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Checks every election and prints the violated rules.
    Validate {
        /// Reports every violated rule of an election instead of stopping at the first one.
        #[clap(long, takes_value = false)]
        all: bool,
    },
    /// Prints the identity keys of the elections and of the contact logs.
    Keys,
    /// Writes the status of all the states in JSON format.
    Status {
        /// (file path, 'stdout' or empty) Where to write the status. Setting this option
        /// overrides the path that may be specified with the --config option.
        #[clap(short, long, value_parser)]
        out: Option<String>,
        /// (file path) A reference file containing the expected status in JSON format. If provided,
        /// hubctl will check that the computed status matches the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
    /// Collapses duplicate primary records and writes the resulting fixture.
    Collapse {
        /// (file path, 'stdout' or empty) Where to write the collapsed records.
        #[clap(short, long, value_parser)]
        out: Option<String>,
        /// Only prints what would be merged and deleted.
        #[clap(long, takes_value = false)]
        dry_run: bool,
    },
}
