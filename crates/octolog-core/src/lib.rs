//! Octolog Core - shared domain model for the deployment-event relay
//!
//! This crate holds the pieces shared across the Octolog workspace:
//!
//! - **Event model**: the inbound subscription payload from Octopus Deploy
//!   ([`Payload`], [`DeploymentEvent`], [`Subscription`])
//! - **Metrics**: Prometheus recorder setup and the relay's metric
//!   definitions

pub mod event;
pub mod metrics;

pub use self::event::{DeploymentEvent, Payload, Subscription, PROJECT_ID_PREFIX};
