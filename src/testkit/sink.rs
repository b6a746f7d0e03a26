//! Capturing doubles for sinks and the SRA submit endpoint.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::SignedOrder;
use crate::error::{Error, Result};
use crate::port::OrderSubmitter;
use crate::relay::OrderSink;

/// Cloneable in-memory writer; clones share the same buffer.
#[derive(Clone, Default)]
pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CaptureWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete lines written so far.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buffer.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that keeps every batch it is given.
#[derive(Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<Vec<SignedOrder>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `accept` calls.
    pub fn batches(&self) -> usize {
        self.batches.lock().len()
    }

    /// All accepted orders, flattened in arrival order.
    pub fn orders(&self) -> Vec<SignedOrder> {
        self.batches.lock().iter().flatten().cloned().collect()
    }
}

impl OrderSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn accept(&self, orders: Vec<SignedOrder>) {
        self.batches.lock().push(orders);
    }
}

/// [`OrderSubmitter`] that always fails for chosen salts.
#[derive(Default)]
pub struct ScriptedSubmitter {
    failing: HashSet<String>,
    attempts: Mutex<HashMap<String, u32>>,
    submitted: Mutex<Vec<String>>,
}

impl ScriptedSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_salts(salts: impl IntoIterator<Item = u64>) -> Self {
        Self {
            failing: salts.into_iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Salts of successfully submitted orders.
    pub fn submitted_salts(&self) -> Vec<String> {
        self.submitted.lock().clone()
    }

    pub fn attempts_for(&self, salt: &str) -> u32 {
        self.attempts.lock().get(salt).copied().unwrap_or(0)
    }
}

#[async_trait]
impl OrderSubmitter for ScriptedSubmitter {
    async fn submit_order(&self, order: &SignedOrder) -> Result<()> {
        let salt = order.salt.to_string();
        *self.attempts.lock().entry(salt.clone()).or_insert(0) += 1;

        if self.failing.contains(&salt) {
            return Err(Error::Status {
                status: 400,
                body: "validation failed".into(),
            });
        }
        self.submitted.lock().push(salt);
        Ok(())
    }
}
