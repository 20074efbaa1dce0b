//! Injectable sinks for pool state transitions.
//!
//! Pool operations never log on their own. Callers that want an audit trail
//! pass an [`EventSink`]; the plain entry points use [`NoopSink`].

use serde::Serialize;

use crate::pool::{PoolSnapshot, Token};

/// One observed pool mutation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoolEvent {
    Swap {
        input_token: Token,
        amount_in: f64,
        /// Portion of `amount_in` retained by the pool.
        fee_retained: f64,
        amount_out: f64,
        before: PoolSnapshot,
        after: PoolSnapshot,
    },
    AddLiquidity {
        base: f64,
        quote: f64,
        before: PoolSnapshot,
        after: PoolSnapshot,
    },
    RemoveLiquidity {
        base: f64,
        quote: f64,
        before: PoolSnapshot,
        after: PoolSnapshot,
    },
}

impl PoolEvent {
    /// Pool state after the mutation.
    pub fn after(&self) -> &PoolSnapshot {
        match self {
            PoolEvent::Swap { after, .. }
            | PoolEvent::AddLiquidity { after, .. }
            | PoolEvent::RemoveLiquidity { after, .. } => after,
        }
    }
}

/// Receiver for [`PoolEvent`]s.
pub trait EventSink {
    fn record(&mut self, event: PoolEvent);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    #[inline]
    fn record(&mut self, _event: PoolEvent) {}
}

/// Collects events in order.
impl EventSink for Vec<PoolEvent> {
    fn record(&mut self, event: PoolEvent) {
        self.push(event);
    }
}

/// Forwards events to `tracing` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, event: PoolEvent) {
        match &event {
            PoolEvent::Swap {
                input_token,
                amount_in,
                fee_retained,
                amount_out,
                before,
                after,
            } => tracing::debug!(
                token = %input_token,
                amount_in,
                fee_retained,
                amount_out,
                old_base = before.base,
                old_quote = before.quote,
                old_k = before.invariant,
                new_base = after.base,
                new_quote = after.quote,
                new_k = after.invariant,
                "swap"
            ),
            PoolEvent::AddLiquidity { base, quote, after, .. } => tracing::debug!(
                base,
                quote,
                new_k = after.invariant,
                "liquidity added"
            ),
            PoolEvent::RemoveLiquidity { base, quote, after, .. } => tracing::debug!(
                base,
                quote,
                new_k = after.invariant,
                "liquidity removed"
            ),
        }
    }
}
