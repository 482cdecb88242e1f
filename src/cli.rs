use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "ranked match history analyzer")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Fetch, cache and analyze the target's ranked match history
    Analyze(AnalyzeArgs),
    /// Create the local match cache schema
    InitDb,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct AnalyzeArgs {
    /// Platform region (na, euw, eune, kr)
    #[arg(short, long, default_value = "na")]
    pub region: String,

    /// Display name of the player to analyze
    #[arg(short, long)]
    pub target: String,

    /// Ally that must be present in a match (repeatable)
    #[arg(long = "require", value_name = "NAME")]
    pub required_allies: Vec<String>,

    /// Ally that must not be present in a match (repeatable)
    #[arg(long = "exclude", value_name = "NAME")]
    pub excluded_allies: Vec<String>,

    /// Role tag the target must have, e.g. DUO_CARRY (repeatable)
    #[arg(long = "role", value_name = "ROLE")]
    pub roles: Vec<String>,

    /// Lane tag the target must have, e.g. BOTTOM (repeatable)
    #[arg(long = "lane", value_name = "LANE")]
    pub lanes: Vec<String>,

    /// Lane tag counted into the team aggregates (repeatable)
    #[arg(long = "ally-lane", value_name = "LANE")]
    pub ally_lanes: Vec<String>,
}
