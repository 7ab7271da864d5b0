use prometheus::{Counter, Encoder, Opts, Registry, TextEncoder};
use std::sync::Arc;

pub struct Metrics {
    pub secrets_issued: Counter,
    pub verifications_accepted: Counter,
    pub verifications_rejected: Counter,
    pub invalid_secrets: Counter,
    pub rate_limited: Counter,
    pub registry: Registry,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<Counter, prometheus::Error> {
    let counter = Counter::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

impl Metrics {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        let secrets_issued = counter(
            &registry,
            "totp_secrets_issued_total",
            "Total number of TOTP secrets issued",
        )?;
        let verifications_accepted = counter(
            &registry,
            "totp_verifications_accepted_total",
            "Total number of accepted TOTP codes",
        )?;
        let verifications_rejected = counter(
            &registry,
            "totp_verifications_rejected_total",
            "Total number of rejected TOTP codes",
        )?;
        let invalid_secrets = counter(
            &registry,
            "totp_invalid_secrets_total",
            "Total number of stored secrets that failed to decode",
        )?;
        let rate_limited = counter(
            &registry,
            "totp_rate_limited_total",
            "Total number of attempts refused by the rate limiter",
        )?;

        Ok(Arc::new(Self {
            secrets_issued,
            verifications_accepted,
            verifications_rejected,
            invalid_secrets,
            rate_limited,
            registry,
        }))
    }

    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
