use async_trait::async_trait;
use log::{debug, error, info};

use crate::config::{Environment, Inputs};
use crate::context::GitHubContext;
use crate::decode;
use crate::error::Result;
use crate::event::{InboundEvent, OutboundResponse};
use crate::forwarder::WebhookForwarder;

/// Consumer of a built context, e.g. metrics extraction.
#[async_trait]
pub trait Runner: Send + Sync {
    async fn run(&self, context: &GitHubContext, inputs: &Inputs) -> Result<()>;
}

/// Forwards the raw webhook to the log intake when
/// `FORWARD_WEBHOOK_TO_DATADOG` is enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForwardingRunner;

#[async_trait]
impl Runner for ForwardingRunner {
    async fn run(&self, context: &GitHubContext, inputs: &Inputs) -> Result<()> {
        if !inputs.forward_webhook_to_datadog {
            debug!("Webhook forwarding disabled");
            return Ok(());
        }
        let forwarder = WebhookForwarder::create(&inputs.forwarder_config())?;
        forwarder.send(&context.payload().to_json_string()).await
    }
}

/// Any failure turns into a 500 carrying `{"error": <message>}`.
pub async fn handle(event: &InboundEvent, env: &Environment, runner: &dyn Runner) -> OutboundResponse {
    match process(event, env, runner).await {
        Ok(()) => OutboundResponse::ok(),
        Err(err) => {
            let response = OutboundResponse::error(&err.to_string());
            error!(
                "event.body={}, error={}",
                event.body.as_deref().unwrap_or("undefined"),
                response.body
            );
            response
        }
    }
}

async fn process(event: &InboundEvent, env: &Environment, runner: &dyn Runner) -> Result<()> {
    let payload = decode::decode_event(event)?;
    let context = GitHubContext::from_payload(payload)?;
    let inputs = Inputs::from_env(env)?;
    info!(
        "Received {} ({}) for {}/{}",
        context.event_name().as_str(),
        context.payload().action().unwrap_or("no action"),
        context.repo().owner,
        context.repo().repo
    );
    runner.run(&context, &inputs).await
}
