use regex::Regex;
use std::collections::BTreeMap;
use xm_kube::{MetricCategory, MetricJoin, MetricSpec, ResourceTypeDescriptor, WatchTarget};

#[cfg(test)]
#[path = "./matcher.tests.rs"]
mod matcher_tests;

/// Selects resource types to observe for the given selection rules.\
/// Returns watch targets for the storage version of each selected type, keyed by their metric names.\
/// **Note** that for a `namespace` bound spec only namespaced resource types are selected,
/// and that `exclude_names` always wins over `include_names`.
pub fn select_targets(
    rules: &MetricSpec,
    descriptors: &[ResourceTypeDescriptor],
    namespace: Option<&str>,
) -> BTreeMap<String, WatchTarget> {
    let pattern = rules.match_name.as_deref().and_then(|pattern| match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(error) => {
            tracing::warn!("Invalid matchName '{}', nothing will match it: {}", pattern, error);
            None
        },
    });

    let mut targets = BTreeMap::new();
    for descriptor in descriptors {
        let base_match = if rules.match_name.is_some() {
            pattern.as_ref().is_some_and(|p| p.is_match(&descriptor.name))
        } else if let Some(categories) = &rules.categories {
            matches_categories(&descriptor.categories, categories)
        } else {
            false
        };

        let included = base_match || in_list(rules.include_names.as_deref(), &descriptor.name);
        let excluded = in_list(rules.exclude_names.as_deref(), &descriptor.name);
        let in_scope = namespace.is_none() || descriptor.is_namespaced();

        if included && !excluded && in_scope {
            let target = WatchTarget::from_descriptor(descriptor).in_namespace(namespace);
            targets.insert(target.metric_name().to_owned(), target);
        }
    }

    targets
}

/// Checks resource type categories against the category filter.\
/// `AND` needs every wanted value to be present, `OR` needs at least one.
/// Empty filter never matches.
pub fn matches_categories(current: &[String], filter: &MetricCategory) -> bool {
    if filter.values.is_empty() {
        return false;
    }

    let has = |wanted: &String| current.contains(wanted);
    match filter.join {
        MetricJoin::And => filter.values.iter().all(has),
        MetricJoin::Or => filter.values.iter().any(has),
    }
}

fn in_list(list: Option<&[String]>, value: &str) -> bool {
    list.is_some_and(|l| l.iter().any(|v| v == value))
}
