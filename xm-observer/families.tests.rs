use std::collections::BTreeMap;

use crate::test_utils::{object, ready_object, with_labels};
use crate::{InstanceRecord, encode};

use super::*;

fn records(objects: &[kube::api::DynamicObject]) -> BTreeMap<String, InstanceRecord> {
    objects
        .iter()
        .map(|o| (xm_kube::get_object_key(o), InstanceRecord::new(o, &[])))
        .collect()
}

fn encoded(metric_name: &str, with_namespace: bool, records: &BTreeMap<String, InstanceRecord>) -> String {
    encode(&build_families(metric_name, with_namespace, records)).unwrap()
}

#[test]
fn build_families_namespaced_test() {
    let records = records(&[with_labels(ready_object("obj-1", Some("ns")), &[("app", "db\"1")])]);

    let text = encoded("ns_testa_cloud_NameA_v1", true, &records);

    let expected = "\
# HELP ns_testa_cloud_NameA_v1 A metrics series for each object
# TYPE ns_testa_cloud_NameA_v1 gauge
ns_testa_cloud_NameA_v1{name=\"obj-1\",namespace=\"ns\"} 1
# HELP ns_testa_cloud_NameA_v1_created Unix creation timestamp
# TYPE ns_testa_cloud_NameA_v1_created gauge
ns_testa_cloud_NameA_v1_created{name=\"obj-1\",namespace=\"ns\"} 1704067200
# HELP ns_testa_cloud_NameA_v1_labels Labels from the kubernetes object
# TYPE ns_testa_cloud_NameA_v1_labels gauge
ns_testa_cloud_NameA_v1_labels{name=\"obj-1\",namespace=\"ns\",label_app=\"db\\\"1\"} 1
# HELP ns_testa_cloud_NameA_v1_info A metrics series exposing parameters as labels
# TYPE ns_testa_cloud_NameA_v1_info gauge
ns_testa_cloud_NameA_v1_info{name=\"obj-1\",namespace=\"ns\"} 1
# HELP ns_testa_cloud_NameA_v1_ready A metrics series mapping the Ready status condition to a value (True=1,False=0,other=-1)
# TYPE ns_testa_cloud_NameA_v1_ready gauge
ns_testa_cloud_NameA_v1_ready{name=\"obj-1\",namespace=\"ns\"} 1
# HELP ns_testa_cloud_NameA_v1_ready_time Unix timestamp of last ready change
# TYPE ns_testa_cloud_NameA_v1_ready_time gauge
ns_testa_cloud_NameA_v1_ready_time{name=\"obj-1\",namespace=\"ns\"} 1704067260
# HELP ns_testa_cloud_NameA_v1_synced A metrics series mapping the Synced status condition to a value (True=1,False=0,other=-1)
# TYPE ns_testa_cloud_NameA_v1_synced gauge
ns_testa_cloud_NameA_v1_synced{name=\"obj-1\",namespace=\"ns\"} 0
# HELP ns_testa_cloud_NameA_v1_resource_count A metrics series objects to count objects of ns_testa_cloud_NameA_v1
# TYPE ns_testa_cloud_NameA_v1_resource_count gauge
ns_testa_cloud_NameA_v1_resource_count 1
";

    assert_eq!(expected, text);
}

#[test]
fn build_families_cluster_test() {
    let records = records(&[object("b", Some("ns")), object("a", None)]);

    let text = encoded("testa_cloud_NameA_v1", false, &records);

    assert!(text.contains("testa_cloud_NameA_v1{name=\"a\"} 1\ntesta_cloud_NameA_v1{name=\"b\"} 1\n"));
    assert!(text.contains("testa_cloud_NameA_v1_ready{name=\"a\"} -1\n"));
    assert!(!text.contains("namespace="));
    assert!(!text.contains("testa_cloud_NameA_v1_ready_time"));
    assert!(text.ends_with("testa_cloud_NameA_v1_resource_count 2\n"));
}

#[test]
fn build_families_empty_test() {
    let families = build_families("x", false, &BTreeMap::new());

    assert_eq!(1, families.len());
    assert_eq!(
        "# HELP x_resource_count A metrics series objects to count objects of x\n\
         # TYPE x_resource_count gauge\n\
         x_resource_count 0\n",
        encode(&families).unwrap()
    );
}

#[test]
fn build_descs_test() {
    let descs = build_descs("testa_cloud_NameA_v1", false);

    assert_eq!(Family::ALL.len() + 1, descs.len());
    assert!(descs[..Family::ALL.len()].iter().all(|d| d.variable_labels == ["name"]));
    assert!(descs[Family::ALL.len()].variable_labels.is_empty());
    assert!(build_descs("1_invalid", false).is_empty());
}
