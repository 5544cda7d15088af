use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{crate_version, value_t, App, Arg};

use workflow_webhook::config;
use workflow_webhook::server;
use workflow_webhook::{Emulator, ForwardingRunner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    pretty_env_logger::init();

    let matches = App::new("server")
        .version(crate_version!())
        .about("Serves the workflow webhook handler over plain HTTP")
        .arg(
            Arg::with_name("port")
                .long("port")
                .env("PORT")
                .takes_value(true)
                .default_value("3000"),
        )
        .arg(
            Arg::with_name("env-file")
                .long("env-file")
                .takes_value(true)
                .default_value(".env.test")
                .help("KEY=VALUE file re-read on every invocation"),
        )
        .arg(
            Arg::with_name("timeout-ms")
                .long("timeout-ms")
                .takes_value(true)
                .default_value("10000"),
        )
        .get_matches();

    let port = value_t!(matches, "port", u16).unwrap_or_else(|e| e.exit());
    let timeout_ms = value_t!(matches, "timeout-ms", u64).unwrap_or_else(|e| e.exit());
    let env_file = matches.value_of("env-file").unwrap_or(".env.test");

    let emulator = Emulator::new(config::process_environment(), Arc::new(ForwardingRunner))
        .with_env_file(env_file)
        .with_timeout(Duration::from_millis(timeout_ms));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    server::serve(addr, Arc::new(emulator)).await?;
    Ok(())
}
