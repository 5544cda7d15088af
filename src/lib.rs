pub mod codec;
pub mod config;
pub mod context;
pub mod decode;
pub mod emulator;
pub mod error;
pub mod event;
pub mod forwarder;
pub mod handler;
pub mod server;

pub use config::{Environment, Inputs};
pub use context::{EventName, GitHubContext, Repo, WebhookEvent, WorkflowRunPayload};
pub use emulator::{Emulator, EmulatorError};
pub use error::{Result, WebhookError};
pub use event::{Headers, InboundEvent, OutboundResponse};
pub use forwarder::{ClientConfiguration, ForwarderConfig, WebhookForwarder};
pub use handler::{ForwardingRunner, Runner};
