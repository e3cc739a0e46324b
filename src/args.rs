use clap::{ArgAction, Parser};

const CMD_NAME: &str = "edgefold";
const DEFAULT_CONFIG: &str = "workflow.json";

/// Stores our command-line args format.
#[derive(Parser)]
#[command(name = CMD_NAME, version, about = None, long_about = None)]
pub struct Args {
    /// Workflow definition file (JSON)
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    #[arg(env = "EDGEFOLD_CONFIG")]
    pub config: String,

    /// Write the compiled graph here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Print additional debugging info (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Leave graphs unreachable from the entrypoint out of the output
    #[arg(long)]
    pub no_components: bool,
}
