use rstest::rstest;
use serde_json::{Value, json};
use xm_config::InfoMapping;
use xm_kube::ConditionValue;

use crate::test_utils::{object, ready_object, with_data, with_labels};

use super::*;

#[test]
fn new_record_test() {
    let obj = with_labels(ready_object("obj-1", Some("team-a")), &[("app.kubernetes.io/name", "db")]);
    let record = InstanceRecord::new(&obj, &[]);

    assert_eq!("obj-1", record.name);
    assert_eq!(Some("team-a"), record.namespace.as_deref());
    assert_eq!(1_704_067_200, record.created);
    assert_eq!(
        Some("db"),
        record.labels.get("label_app_kubernetes_io_name").map(String::as_str)
    );
    assert_eq!(
        ConditionValue {
            value: 1,
            last_transition: Some(1_704_067_260)
        },
        record.ready
    );
    assert_eq!(
        ConditionValue {
            value: 0,
            last_transition: None
        },
        record.synced
    );
    assert!(record.info.is_empty());
}

#[test]
fn missing_conditions_test() {
    let record = InstanceRecord::new(&object("obj-1", None), &[]);

    assert_eq!(-1, record.ready.value);
    assert_eq!(-1, record.synced.value);
    assert!(record.labels.is_empty());
}

#[test]
fn info_values_test() {
    let obj = with_data(
        object("obj-1", None),
        json!({ "spec": { "forProvider": { "region": "eu-west-1", "size": 3 } } }),
    );
    let mappings = vec![
        InfoMapping {
            field_path: "$.spec.forProvider.region".to_owned(),
            label: "region".to_owned(),
        },
        InfoMapping {
            field_path: "$.spec.forProvider.size".to_owned(),
            label: "disk.size".to_owned(),
        },
        InfoMapping {
            field_path: "$.metadata.name".to_owned(),
            label: "object".to_owned(),
        },
        InfoMapping {
            field_path: "$.spec.missing".to_owned(),
            label: "missing".to_owned(),
        },
    ];

    let record = InstanceRecord::new(&obj, &mappings);

    assert_eq!(
        vec![
            ("region".to_owned(), "eu-west-1".to_owned()),
            ("disk_size".to_owned(), "3".to_owned()),
            ("object".to_owned(), "obj-1".to_owned()),
            ("missing".to_owned(), String::new()),
        ],
        record.info
    );
}

#[rstest]
#[case("$.text", "abc")]
#[case("$.flag", "true")]
#[case("$.ratio", "2.5")]
#[case("$.empty", "")]
#[case("$.list", r#"["a","b"]"#)]
#[case("$.nested.key", "value")]
#[case("$.unknown", "")]
#[case("not a path", "")]
fn get_string_test(#[case] path: &str, #[case] expected: &str) {
    let value: Value = json!({
        "text": "abc",
        "flag": true,
        "ratio": 2.5,
        "empty": null,
        "list": ["a", "b"],
        "nested": { "key": "value" },
    });

    assert_eq!(expected, get_string(&value, path));
}

#[test]
fn colliding_labels_are_kept_test() {
    let obj = with_labels(
        object("obj-1", None),
        &[("app.kubernetes.io/name", "x"), ("app_kubernetes_io_name", "y"), ("app/kubernetes.io-name", "z")],
    );

    let record = InstanceRecord::new(&obj, &[]);

    assert_eq!(
        vec![
            ("label_app_kubernetes_io_name", "x"),
            ("label_app_kubernetes_io_name_1", "z"),
            ("label_app_kubernetes_io_name_2", "y"),
        ],
        record
            .labels
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect::<Vec<_>>()
    );
}

#[test]
fn info_labels_do_not_clash_test() {
    let mapping = |label: &str| InfoMapping {
        field_path: "$.metadata.name".to_owned(),
        label: label.to_owned(),
    };
    let mappings = vec![
        mapping("name"),
        mapping("namespace"),
        mapping(""),
        mapping("!!"),
        mapping("2nd"),
        mapping("owner"),
        mapping("owner"),
    ];

    let record = InstanceRecord::new(&object("obj-1", Some("ns")), &mappings);

    assert_eq!(
        vec!["info_name", "info_namespace", "info_2nd", "owner", "owner_1"],
        record.info.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>()
    );
    assert!(record.info.iter().all(|(_, v)| v == "obj-1"));
}
