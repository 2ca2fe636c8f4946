use crate::ResourceScope;

use super::*;

fn descriptor() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor {
        name: "nameas.testa.cloud".to_owned(),
        group: "testa.cloud".to_owned(),
        stored_version: "v1".to_owned(),
        plural: "nameas".to_owned(),
        kind: "NameA".to_owned(),
        scope: ResourceScope::Namespaced,
        categories: vec!["managed".to_owned()],
    }
}

#[test]
fn metric_name_test() {
    let target = WatchTarget::from_descriptor(&descriptor());

    assert_eq!("testa_cloud_NameA_v1", target.metric_name());
    assert_eq!("testa.cloud/v1", target.api_version());
    assert_eq!("nameas", target.resource);
    assert_eq!(None, target.namespace);
}

#[test]
fn namespace_qualified_metric_name_test() {
    let target = WatchTarget::from_descriptor(&descriptor()).in_namespace(Some("team-a"));

    assert_eq!("team_a_testa_cloud_NameA_v1", target.metric_name());
    assert_eq!("testa_cloud_NameA_v1", target.base_metric_name());
    assert_eq!(Some("team-a"), target.namespace.as_deref());

    let target = target.in_namespace(None);
    assert_eq!("testa_cloud_NameA_v1", target.metric_name());
}

#[test]
fn api_resource_test() {
    let ar = WatchTarget::from_descriptor(&descriptor()).api_resource();

    assert_eq!("testa.cloud", ar.group);
    assert_eq!("v1", ar.version);
    assert_eq!("testa.cloud/v1", ar.api_version);
    assert_eq!("NameA", ar.kind);
    assert_eq!("nameas", ar.plural);
}

#[test]
fn to_watched_resource_test() {
    let watched = WatchTarget::from_descriptor(&descriptor())
        .in_namespace(Some("ns"))
        .to_watched_resource();

    assert_eq!("testa.cloud", watched.group);
    assert_eq!("v1", watched.version);
    assert_eq!("NameA", watched.kind);
    assert_eq!(Some("ns"), watched.namespace.as_deref());
    assert_eq!(Some("ns_testa_cloud_NameA_v1"), watched.metric_name.as_deref());
}
