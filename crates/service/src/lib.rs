//! Service layer for pixelpost
//!
//! Centralizes the delivery pipeline between the HTTP/CLI surfaces and storage:
//! enqueueing, recipient validation, relay submission, the background worker,
//! admin alerts, open tracking and the event trail.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod enqueue_service;
mod error;
mod event_log;
mod notifier;
mod relay;
pub mod templates;
#[cfg(test)]
mod test_support;
mod tracking_service;
mod validation;
mod worker;

pub use enqueue_service::{check_compose_input, EnqueueService};
pub use error::{DeliveryError, ServiceError};
pub use event_log::EventLog;
pub use notifier::AdminNotifier;
pub use relay::{OutboundEmail, Relay, RelayError, SmtpRelay};
pub use tracking_service::TrackingService;
pub use validation::{HickoryMxLookup, MxLookup, MxLookupError, ValidationError, ValidationPipeline};
pub use worker::{DeliveryOutcome, DeliveryReport, DeliveryWorker};
