use clap::Parser;
use whiskerdb_backend::{config::Cli, logging::initialize_logging, run};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().unwrap_or_default();
    let Cli { command, log_dir } = Cli::parse();

    initialize_logging(log_dir.as_deref());

    for report in run(&command)? {
        println!("{report}");
    }

    Ok(())
}
