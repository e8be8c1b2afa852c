mod cli;
mod commands;
mod config_doc;
mod datasets;
mod error;
mod logging;
mod state_io;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Fit(args) => commands::fit::run(args),
        Commands::Predict(args) => commands::predict::run(args),
        Commands::Evaluate(args) => commands::evaluate::run(args),
        Commands::GenNoisyXor(args) => commands::gen_noisy_xor::run(args),
    }
}
