use std::collections::HashMap;

use crate::error::{Result, WebhookError};
use crate::forwarder::ForwarderConfig;

pub type Environment = HashMap<String, String>;

pub fn process_environment() -> Environment {
    std::env::vars().collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inputs {
    pub github_token: String,
    pub github_token_for_rate_limit_metrics: String,
    pub datadog_api_key: Option<String>,
    pub datadog_site: Option<String>,
    pub datadog_tags: Vec<String>,
    pub collect_job_metrics: bool,
    pub collect_step_metrics: bool,
    pub prefer_distribution_workflow_run_metrics: bool,
    pub prefer_distribution_job_metrics: bool,
    pub prefer_distribution_step_metrics: bool,
    pub send_pull_request_labels: bool,
    pub forward_webhook_to_datadog: bool,
    pub https_proxy: Option<String>,
}

impl Inputs {
    pub fn from_env(env: &Environment) -> Result<Self> {
        let github_token = env
            .get("GITHUB_TOKEN")
            .cloned()
            .ok_or_else(|| WebhookError::Configuration("GITHUB_TOKEN is not set".to_owned()))?;
        let forwarder = forwarder_config(env);
        Ok(Inputs {
            github_token_for_rate_limit_metrics: env
                .get("GITHUB_TOKEN_RATE_LIMIT_METRICS")
                .cloned()
                .unwrap_or_else(|| github_token.clone()),
            github_token,
            datadog_api_key: forwarder.api_key,
            datadog_site: forwarder.site,
            datadog_tags: forwarder.tags,
            collect_job_metrics: flag(env, "COLLECT_JOB_METRICS"),
            collect_step_metrics: flag(env, "COLLECT_STEP_METRICS"),
            prefer_distribution_workflow_run_metrics: flag(env, "PREFER_DISTRIBUTION_WORKFLOW_RUN_METRICS"),
            prefer_distribution_job_metrics: flag(env, "PREFER_DISTRIBUTION_JOB_METRICS"),
            prefer_distribution_step_metrics: flag(env, "PREFER_DISTRIBUTION_STEP_METRICS"),
            send_pull_request_labels: flag(env, "SEND_PULL_REQUEST_LABELS"),
            forward_webhook_to_datadog: flag(env, "FORWARD_WEBHOOK_TO_DATADOG"),
            https_proxy: forwarder.https_proxy,
        })
    }

    pub fn forwarder_config(&self) -> ForwarderConfig {
        ForwarderConfig {
            api_key: self.datadog_api_key.clone(),
            site: self.datadog_site.clone(),
            tags: self.datadog_tags.clone(),
            https_proxy: self.https_proxy.clone(),
        }
    }
}

/// Only the Datadog settings, for callers that have no GitHub token.
pub fn forwarder_config(env: &Environment) -> ForwarderConfig {
    ForwarderConfig {
        api_key: env.get("DATADOG_API_KEY").cloned(),
        site: non_empty(env, "DATADOG_SITE"),
        tags: env.get("DATADOG_TAGS").map(|tags| split_tags(tags)).unwrap_or_default(),
        https_proxy: non_empty(env, "https_proxy").or_else(|| non_empty(env, "HTTPS_PROXY")),
    }
}

/// `key:value` pairs separated by commas, kept exactly as written.
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',').map(str::to_owned).collect()
}

fn flag(env: &Environment, key: &str) -> bool {
    env.get(key).map(|value| value == "true").unwrap_or(false)
}

fn non_empty(env: &Environment, key: &str) -> Option<String> {
    env.get(key).filter(|value| !value.is_empty()).cloned()
}
