//! Routing stage between order producers and the active sink.

use std::sync::Arc;

use tracing::trace;

use super::sink::OrderSink;
use crate::domain::SignedOrder;

/// Applies the optional maker filter, then hands orders to the sink.
///
/// Shared by bootstrap and every channel driver.
pub struct OrderRouter {
    maker: Option<String>,
    sink: Arc<dyn OrderSink>,
}

impl OrderRouter {
    pub fn new(sink: Arc<dyn OrderSink>, maker: Option<&str>) -> Self {
        Self {
            maker: maker.map(str::to_lowercase),
            sink,
        }
    }

    #[must_use]
    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    /// Keep only orders whose maker matches, ignoring case. No filter keeps everything.
    #[must_use]
    pub fn filter(&self, orders: Vec<SignedOrder>) -> Vec<SignedOrder> {
        match &self.maker {
            Some(maker) => orders.into_iter().filter(|o| o.is_made_by(maker)).collect(),
            None => orders,
        }
    }

    pub fn route(&self, orders: Vec<SignedOrder>) {
        let received = orders.len();
        let orders = self.filter(orders);
        if orders.is_empty() {
            trace!(received, "No orders left after maker filter");
            return;
        }
        self.sink.accept(orders);
    }
}
