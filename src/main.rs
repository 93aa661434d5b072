use clap::Parser;
use todo_tree::cli::commands::Cli;
use todo_tree::cli::handlers;
use todo_tree::io::config_io;

fn main() {
    let cli = Cli::parse();
    let config = config_io::read_config();

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log.level))
        .format_timestamp(None)
        .init();

    if let Err(e) = handlers::dispatch(cli, config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
