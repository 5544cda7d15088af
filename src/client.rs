use clap::{crate_version, App, Arg};
use log::{info, warn};

use workflow_webhook::config;
use workflow_webhook::WebhookForwarder;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Sends one log record through the configured forwarder, to check the
/// Datadog settings without going through a webhook.
#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let matches = App::new("client")
        .version(crate_version!())
        .about("Submits a test log record using DATADOG_API_KEY / DATADOG_SITE / https_proxy")
        .arg(
            Arg::with_name("message")
                .long("message")
                .takes_value(true)
                .default_value(r#"{"test":"yoyo"}"#),
        )
        .arg(
            Arg::with_name("tags")
                .long("tags")
                .takes_value(true)
                .help("Comma separated key:value tags, defaults to DATADOG_TAGS"),
        )
        .get_matches();

    let mut forwarder_config = config::forwarder_config(&config::process_environment());
    if let Some(tags) = matches.value_of("tags") {
        forwarder_config.tags = config::split_tags(tags);
    }
    let message = matches.value_of("message").unwrap_or_default();

    let forwarder = WebhookForwarder::create(&forwarder_config)?;
    if forwarder.is_null() {
        warn!("DATADOG_API_KEY is not set, nothing will be sent");
    }
    forwarder.send(message).await?;
    info!("Log sent to Datadog: {}", message);
    Ok(())
}
