use k8s_openapi::chrono::{DateTime, Utc};
use kube::ResourceExt;
use kube::api::DynamicObject;

#[cfg(test)]
#[path = "./utils.tests.rs"]
mod utils_tests;

/// Gets [`DynamicObject`]'s key in the form `namespace/name`, or just `name` for cluster scoped objects.
pub fn get_object_key(object: &DynamicObject) -> String {
    match object.metadata.namespace.as_deref() {
        Some(namespace) => format!("{}/{}", namespace, object.name_any()),
        None => object.name_any(),
    }
}

/// Gets [`DynamicObject`]'s creation time as unix seconds.
pub fn get_creation_timestamp(object: &DynamicObject) -> Option<i64> {
    object.metadata.creation_timestamp.as_ref().map(|t| t.0.timestamp())
}

/// State of one status condition mapped to a gauge value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConditionValue {
    /// `1` for `True`, `0` for `False`, `-1` for anything else or a missing condition.
    pub value: i8,

    /// Last transition time as unix seconds, if present and parseable.
    pub last_transition: Option<i64>,
}

/// Gets status condition of the given `condition_type` from the [`DynamicObject`].
pub fn get_condition(object: &DynamicObject, condition_type: &str) -> ConditionValue {
    let condition = object.data["status"]["conditions"]
        .as_array()
        .and_then(|c| c.iter().find(|c| c["type"].as_str() == Some(condition_type)));

    let Some(condition) = condition else {
        return ConditionValue {
            value: -1,
            last_transition: None,
        };
    };

    let value = match condition["status"].as_str() {
        Some("True") => 1,
        Some("False") => 0,
        _ => -1,
    };

    let last_transition = condition["lastTransitionTime"]
        .as_str()
        .and_then(|t| t.parse::<DateTime<Utc>>().ok())
        .map(|t| t.timestamp());

    ConditionValue { value, last_transition }
}
