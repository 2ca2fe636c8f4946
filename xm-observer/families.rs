use prometheus::core::Desc;
use prometheus::proto::{Gauge, LabelPair, Metric, MetricFamily, MetricType};
use std::collections::{BTreeMap, HashMap};

use crate::InstanceRecord;

#[cfg(test)]
#[path = "./families.tests.rs"]
mod families_tests;

/// Metric family rendered for every live instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    Presence,
    Created,
    Labels,
    Info,
    Ready,
    ReadyTime,
    Synced,
    SyncedTime,
}

impl Family {
    /// All per-instance families in their exposition order.
    pub const ALL: [Family; 8] = [
        Family::Presence,
        Family::Created,
        Family::Labels,
        Family::Info,
        Family::Ready,
        Family::ReadyTime,
        Family::Synced,
        Family::SyncedTime,
    ];

    /// Returns suffix appended to the metric name stem.
    pub fn suffix(self) -> &'static str {
        match self {
            Family::Presence => "",
            Family::Created => "_created",
            Family::Labels => "_labels",
            Family::Info => "_info",
            Family::Ready => "_ready",
            Family::ReadyTime => "_ready_time",
            Family::Synced => "_synced",
            Family::SyncedTime => "_synced_time",
        }
    }

    /// Returns `HELP` text of the family.
    pub fn help(self) -> &'static str {
        match self {
            Family::Presence => "A metrics series for each object",
            Family::Created => "Unix creation timestamp",
            Family::Labels => "Labels from the kubernetes object",
            Family::Info => "A metrics series exposing parameters as labels",
            Family::Ready => "A metrics series mapping the Ready status condition to a value (True=1,False=0,other=-1)",
            Family::ReadyTime => "Unix timestamp of last ready change",
            Family::Synced => "A metrics series mapping the Synced status condition to a value (True=1,False=0,other=-1)",
            Family::SyncedTime => "Unix timestamp of last synced change",
        }
    }

    /// Returns sample of this family for the `record`, or [`None`] if the record has no value for it.
    fn sample(self, record: &InstanceRecord, with_namespace: bool) -> Option<Metric> {
        let value = match self {
            Family::Presence | Family::Labels | Family::Info => 1,
            Family::Created => record.created,
            Family::Ready => record.ready.value.into(),
            Family::Synced => record.synced.value.into(),
            Family::ReadyTime => record.ready.last_transition?,
            Family::SyncedTime => record.synced.last_transition?,
        };

        let mut labels = instance_labels(record, with_namespace);
        match self {
            Family::Labels => labels.extend(record.labels.iter().map(|(k, v)| label_pair(k, v))),
            Family::Info => labels.extend(record.info.iter().map(|(k, v)| label_pair(k, v))),
            _ => (),
        }

        Some(gauge_metric(labels, value as f64))
    }
}

/// Builds all per-instance families followed by the `<metric_name>_resource_count` gauge.\
/// Families without any sample are left out.\
/// **Note** that the `namespace` label is added only if `with_namespace` is set.
pub fn build_families(
    metric_name: &str,
    with_namespace: bool,
    records: &BTreeMap<String, InstanceRecord>,
) -> Vec<MetricFamily> {
    let mut families = Family::ALL
        .iter()
        .filter_map(|family| {
            let metrics = records
                .values()
                .filter_map(|r| family.sample(r, with_namespace))
                .collect::<Vec<_>>();
            if metrics.is_empty() {
                None
            } else {
                Some(gauge_family(
                    format!("{}{}", metric_name, family.suffix()),
                    family.help(),
                    metrics,
                ))
            }
        })
        .collect::<Vec<_>>();

    families.push(gauge_family(
        resource_count_name(metric_name),
        &resource_count_help(metric_name),
        vec![gauge_metric(Vec::new(), records.len() as f64)],
    ));

    families
}

/// Builds descriptors of all families that can be produced for the `metric_name`.\
/// Names that are not valid metric names are skipped.
pub fn build_descs(metric_name: &str, with_namespace: bool) -> Vec<Desc> {
    let mut base_labels = vec!["name".to_owned()];
    if with_namespace {
        base_labels.push("namespace".to_owned());
    }

    let mut descs = Family::ALL
        .iter()
        .filter_map(|f| {
            let name = format!("{}{}", metric_name, f.suffix());
            Desc::new(name, f.help().to_owned(), base_labels.clone(), HashMap::new()).ok()
        })
        .collect::<Vec<_>>();
    descs.extend(
        Desc::new(
            resource_count_name(metric_name),
            resource_count_help(metric_name),
            Vec::new(),
            HashMap::new(),
        )
        .ok(),
    );

    descs
}

fn resource_count_name(metric_name: &str) -> String {
    format!("{metric_name}_resource_count")
}

fn resource_count_help(metric_name: &str) -> String {
    format!("A metrics series objects to count objects of {metric_name}")
}

fn instance_labels(record: &InstanceRecord, with_namespace: bool) -> Vec<LabelPair> {
    let mut labels = vec![label_pair("name", &record.name)];
    if with_namespace {
        labels.push(label_pair("namespace", record.namespace.as_deref().unwrap_or_default()));
    }

    labels
}

fn label_pair(name: &str, value: &str) -> LabelPair {
    let mut pair = LabelPair::default();
    pair.set_name(name.to_owned());
    pair.set_value(value.to_owned());
    pair
}

fn gauge_metric(labels: Vec<LabelPair>, value: f64) -> Metric {
    let mut gauge = Gauge::default();
    gauge.set_value(value);

    let mut metric = Metric::default();
    metric.set_label(labels.into());
    metric.set_gauge(gauge);
    metric
}

fn gauge_family(name: String, help: &str, metrics: Vec<Metric>) -> MetricFamily {
    let mut family = MetricFamily::default();
    family.set_name(name);
    family.set_help(help.to_owned());
    family.set_field_type(MetricType::GAUGE);
    family.set_metric(metrics.into());
    family
}
