use prometheus::core::Collector;
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, IntGauge, TextEncoder};

use crate::Observer;

#[cfg(test)]
#[path = "./render.tests.rs"]
mod render_tests;

/// Renders families of all `observers` followed by the global `<prefix>_resources_count_total` gauge.
pub fn render<'a>(observers: impl IntoIterator<Item = &'a Observer>, prefix: &str) -> prometheus::Result<String> {
    let mut families = Vec::new();
    let mut total = 0;
    for observer in observers {
        total += observer.render_into(&mut families);
    }

    let total_gauge = IntGauge::new(format!("{prefix}_resources_count_total"), "A metric to count all resources")?;
    total_gauge.set(i64::try_from(total).unwrap_or(i64::MAX));
    families.extend(total_gauge.collect());

    encode(&families)
}

/// Encodes metric families in the text exposition format.
pub fn encode(families: &[MetricFamily]) -> prometheus::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(families, &mut buffer)?;

    String::from_utf8(buffer).map_err(|error| prometheus::Error::Msg(error.to_string()))
}
