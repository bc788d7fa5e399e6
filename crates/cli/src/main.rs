mod commands;
mod logging;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;

use commands::scan::ScanArgs;

#[derive(Parser)]
#[command(name = "artsize")]
#[command(version, about = "Audit embedded cover art in audio files", long_about = None)]
struct Cli {
    /// Show debug diagnostics on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Check the artwork of an audio file or of every audio file in a directory
    Scan(ScanArgs),

    /// List the embedded pictures of a single audio file
    Inspect {
        /// Path to audio file
        path: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Scan(args) => commands::scan::run(args),
        Command::Inspect { path } => commands::inspect::run(path),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "artsize", &mut io::stdout());
            Ok(())
        }
    }
}
