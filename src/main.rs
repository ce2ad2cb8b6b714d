use clap::Parser;
use taskdeck::cli::Cli;
use taskdeck::config::Config;
use taskdeck::logging;

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.exit_code());
        }
    };

    // The terminal UI sets up its own file logger.
    if !cli.is_tui() {
        logging::init_stderr(&config.log.level);
    }

    if let Err(err) = cli.run(&config) {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}
