use clap::Parser;
use corrections::DEFAULT_CORRECTIONS_FILE;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fpmanagement")]
#[command(
    author,
    version,
    about = "Loads a bunch of package corrections into Nextlinux"
)]
pub struct Cli {
    /// Application config file (defaults to .fpmanagement.yaml and the usual search locations)
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// JSON file holding the array of corrections to add
    #[clap(short, long, default_value = DEFAULT_CORRECTIONS_FILE)]
    pub file: PathBuf,

    /// Keep submitting after a correction fails and report a summary at the end
    #[clap(long, default_value_t = false)]
    pub continue_on_error: bool,

    /// Enable verbose output with additional information
    #[clap(short, long, default_value_t = false)]
    pub verbose: bool,
}
