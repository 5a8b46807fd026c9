//! In-crate doubles for the relay and the resolver.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::relay::{OutboundEmail, Relay, RelayError};
use crate::validation::{MxLookup, MxLookupError};

#[derive(Clone)]
pub struct StaticMxLookup {
    hosts: Option<Vec<String>>,
    calls: Arc<AtomicUsize>,
}

impl StaticMxLookup {
    pub fn with_hosts(hosts: &[&str]) -> Self {
        Self {
            hosts: Some(hosts.iter().map(|h| (*h).to_owned()).collect()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self { hosts: None, calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MxLookup for StaticMxLookup {
    async fn mx_hosts(&self, _domain: &str) -> Result<Vec<String>, MxLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hosts.clone().ok_or_else(|| MxLookupError("SERVFAIL".to_owned()))
    }
}

/// Records every submission; rejects recipients listed in `reject`.
#[derive(Clone, Default)]
pub struct RecordingRelay {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
    reject: Arc<Mutex<HashSet<String>>>,
}

impl RecordingRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&self, recipient: &str) {
        self.reject.lock().unwrap_or_else(PoisonError::into_inner).insert(recipient.to_owned());
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<OutboundEmail> {
        self.sent().into_iter().filter(|m| m.to == recipient).collect()
    }
}

#[async_trait]
impl Relay for RecordingRelay {
    async fn submit(&self, email: &OutboundEmail) -> Result<(), RelayError> {
        let rejected =
            self.reject.lock().unwrap_or_else(PoisonError::into_inner).contains(&email.to);
        if rejected {
            return Err(RelayError::Transport(format!(
                "550 5.1.1 <{}>: Recipient address rejected",
                email.to
            )));
        }
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).push(email.clone());
        Ok(())
    }
}
