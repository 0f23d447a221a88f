use std::process::exit;

mod archive;
mod cli;
mod cmd;
mod config;
mod driver;
mod error;
mod fetch;
mod net;
mod package;
mod release;
mod types;

#[cfg(test)]
mod testutil;

#[tokio::main]
async fn main() {
    env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();

    match cli::run(args).await {
        Ok(_) => {}
        Err(error::Error::Usage(message)) => {
            eprintln!("install-matrix: {}", message);
            cli::print_usage();
            exit(1);
        }
        Err(e) => {
            log::error!("{}", e);
            exit(1);
        }
    }
}
