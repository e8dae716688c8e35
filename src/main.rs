/// maskedit entry point for native builds
#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;
    use maskedit::cli::{self, Cli};

    let cli = Cli::parse();
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("maskedit: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    env_logger::Builder::new()
        .filter_level(cli.log_filter(&config))
        .parse_default_env()
        .init();

    match cli::run(&cli, config) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("maskedit: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

// The library is usable on wasm; the command-line front end is not
#[cfg(target_arch = "wasm32")]
fn main() {}
