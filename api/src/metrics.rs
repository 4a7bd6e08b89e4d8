//! Prometheus counters for the API surface.

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

/// Counter set registered against an injected registry — no global state,
/// so tests can instantiate freely.
pub struct ApiCounters {
    registry: Registry,
    pub events_ingested: IntCounter,
    pub duplicate_deliveries: IntCounter,
    pub payouts_created: IntCounter,
    pub tips_sent: IntCounter,
}

impl ApiCounters {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let events_ingested = IntCounter::new(
            "gratia_events_ingested_total",
            "Events accepted by the ingestion webhook",
        )?;
        let duplicate_deliveries = IntCounter::new(
            "gratia_duplicate_deliveries_total",
            "Webhook deliveries that matched an existing event",
        )?;
        let payouts_created = IntCounter::new(
            "gratia_payouts_created_total",
            "Payout records created through the settlement engine",
        )?;
        let tips_sent = IntCounter::new(
            "gratia_tips_sent_total",
            "Direct tip transfers executed through the rail",
        )?;

        registry.register(Box::new(events_ingested.clone()))?;
        registry.register(Box::new(duplicate_deliveries.clone()))?;
        registry.register(Box::new(payouts_created.clone()))?;
        registry.register(Box::new(tips_sent.clone()))?;

        Ok(Self {
            registry,
            events_ingested,
            duplicate_deliveries,
            payouts_created,
            tips_sent,
        })
    }

    /// Render the registry in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder
            .encode(&self.registry.gather(), &mut buffer)
            .is_err()
        {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_render_in_exposition_format() {
        let counters = ApiCounters::new().unwrap();
        counters.events_ingested.inc();
        let rendered = counters.render();
        assert!(rendered.contains("gratia_events_ingested_total 1"));
    }
}
