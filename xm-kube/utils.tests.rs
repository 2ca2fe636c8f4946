use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::api::{ApiResource, DynamicObject};
use rstest::rstest;
use serde_json::json;

use super::*;

fn object(namespace: Option<&str>, status: serde_json::Value) -> DynamicObject {
    let ar = ApiResource {
        group: "testa.cloud".to_owned(),
        version: "v1".to_owned(),
        api_version: "testa.cloud/v1".to_owned(),
        kind: "NameA".to_owned(),
        plural: "nameas".to_owned(),
    };

    let mut object = DynamicObject::new("obj-1", &ar).data(json!({ "status": status }));
    object.metadata.namespace = namespace.map(String::from);
    object
}

#[test]
fn get_object_key_test() {
    assert_eq!("ns/obj-1", get_object_key(&object(Some("ns"), json!({}))));
    assert_eq!("obj-1", get_object_key(&object(None, json!({}))));
}

#[rstest]
#[case("True", 1)]
#[case("False", 0)]
#[case("Unknown", -1)]
fn get_condition_value_test(#[case] status: &str, #[case] expected: i8) {
    let obj = object(
        None,
        json!({ "conditions": [
            { "type": "Synced", "status": "True", "lastTransitionTime": "2024-01-01T00:00:00Z" },
            { "type": "Ready", "status": status, "lastTransitionTime": "2024-01-01T00:01:00Z" },
        ]}),
    );

    let ready = get_condition(&obj, "Ready");
    assert_eq!(expected, ready.value);
    assert_eq!(Some(1_704_067_260), ready.last_transition);
}

#[test]
fn get_condition_missing_test() {
    let obj = object(None, json!({ "conditions": [{ "type": "Synced", "status": "True" }] }));

    assert_eq!(
        ConditionValue {
            value: -1,
            last_transition: None
        },
        get_condition(&obj, "Ready")
    );

    let synced = get_condition(&obj, "Synced");
    assert_eq!(1, synced.value);
    assert_eq!(None, synced.last_transition);
}

#[test]
fn get_condition_unparseable_time_test() {
    let obj = object(
        None,
        json!({ "conditions": [{ "type": "Ready", "status": "False", "lastTransitionTime": "yesterday" }] }),
    );

    let ready = get_condition(&obj, "Ready");
    assert_eq!(0, ready.value);
    assert_eq!(None, ready.last_transition);
}

#[test]
fn get_creation_timestamp_test() {
    let mut obj = object(None, json!({}));
    assert_eq!(None, get_creation_timestamp(&obj));

    obj.metadata.creation_timestamp = "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().ok().map(Time);
    assert_eq!(Some(1_704_067_200), get_creation_timestamp(&obj));
}

#[test]
fn get_condition_time_with_offset_test() {
    let obj = object(
        None,
        json!({ "conditions": [{ "type": "Ready", "status": "True", "lastTransitionTime": "2024-01-01T02:01:00+02:00" }] }),
    );

    assert_eq!(Some(1_704_067_260), get_condition(&obj, "Ready").last_transition);
}
