use clap::Parser;

/// Run two programs against each other, stdout to stdin both ways, while
/// echoing everything they say onto the console.
#[derive(Parser, Debug)]
#[command(name = "crosswire")]
pub struct Args {
    /// Shell-style command line of the first program.
    pub program1: String,

    /// Shell-style command line of the second program.
    pub program2: String,

    /// Suppress the console echo of both programs' stdout. The programs
    /// stay cross-wired either way.
    #[arg(long)]
    pub disable_stdout: bool,

    #[arg(long)]
    pub program1_stdout_prefix: Option<String>,

    #[arg(long)]
    pub program1_stderr_prefix: Option<String>,

    #[arg(long)]
    pub program2_stdout_prefix: Option<String>,

    #[arg(long)]
    pub program2_stderr_prefix: Option<String>,
}
