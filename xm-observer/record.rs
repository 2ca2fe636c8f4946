use jsonpath_rust::JsonPath;
use kube::ResourceExt;
use kube::api::DynamicObject;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use xm_common::sanitize;
use xm_config::InfoMapping;
use xm_kube::{ConditionValue, get_condition, get_creation_timestamp};

#[cfg(test)]
#[path = "./record.tests.rs"]
mod record_tests;

/// Metric values pre-computed for one live instance.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceRecord {
    pub name: String,
    pub namespace: Option<String>,
    pub created: i64,
    pub labels: BTreeMap<String, String>,
    pub info: Vec<(String, String)>,
    pub ready: ConditionValue,
    pub synced: ConditionValue,
}

impl InstanceRecord {
    /// Creates new [`InstanceRecord`] from the observed object.
    pub fn new(object: &DynamicObject, info_mappings: &[InfoMapping]) -> Self {
        let mut labels = BTreeMap::new();
        for (key, value) in object.labels() {
            let label = unique_label(format!("label_{}", sanitize(key)), |l| labels.contains_key(l));
            labels.insert(label, value.clone());
        }

        Self {
            name: object.name_any(),
            namespace: object.namespace(),
            created: get_creation_timestamp(object).unwrap_or_default(),
            labels,
            info: get_info_values(object, info_mappings),
            ready: get_condition(object, "Ready"),
            synced: get_condition(object, "Synced"),
        }
    }
}

fn get_info_values(object: &DynamicObject, info_mappings: &[InfoMapping]) -> Vec<(String, String)> {
    if info_mappings.is_empty() {
        return Vec::new();
    }

    // metadata is not a part of the dynamic data, so the whole object is serialized
    let value = serde_json::to_value(object).unwrap_or_default();
    let mut used = BTreeSet::new();
    let mut info = Vec::with_capacity(info_mappings.len());
    for mapping in info_mappings {
        let Some(label) = info_label(&mapping.label) else {
            tracing::debug!("Info mapping for {} has no usable label, skipping it", mapping.field_path);
            continue;
        };

        let label = unique_label(label, |l| used.contains(l));
        used.insert(label.clone());
        info.push((label, get_string(&value, &mapping.field_path)));
    }

    info
}

/// Returns sanitized info label, renaming the ones that clash with instance labels or start with a digit.
fn info_label(label: &str) -> Option<String> {
    let label = sanitize(label);
    if label.is_empty() {
        return None;
    }

    if label == "name" || label == "namespace" || label.starts_with(|c: char| c.is_ascii_digit()) {
        Some(format!("info_{label}"))
    } else {
        Some(label)
    }
}

/// Appends `_1`, `_2`, ... to the `label` until it is not taken.
fn unique_label(label: String, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(&label) {
        return label;
    }

    let mut suffix = 1;
    loop {
        let candidate = format!("{label}_{suffix}");
        if !is_taken(&candidate) {
            return candidate;
        }

        suffix += 1;
    }
}

fn get_string(value: &Value, path: &str) -> String {
    match value.query(path) {
        Ok(found) if !found.is_empty() => match found[0] {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        },
        _ => String::new(),
    }
}
