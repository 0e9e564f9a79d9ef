use clap::Parser;
use lnstacks_cli::{cmd_convert, Cli};

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();

    if let Err(e) = cmd_convert(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
