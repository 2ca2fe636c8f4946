use xm_kube::WatchTarget;

use super::*;

fn watch() -> SharedWatch<()> {
    SharedWatch::new(WatchTarget::new("testa.cloud", "v1", "nameas", "NameA"), (), "spec-a")
}

#[test]
fn new_watch_has_single_consumer_test() {
    let watch = watch();

    assert!(watch.has_consumer("spec-a"));
    assert_eq!(1, watch.consumers().len());
    assert!(!watch.is_closed());
    assert_eq!("testa_cloud_NameA_v1", watch.target().metric_name());
}

#[test]
fn add_is_idempotent_test() {
    let mut watch = watch();

    assert!(!watch.add("spec-a"));
    assert!(watch.add("spec-b"));
    assert!(!watch.add("spec-b"));

    assert_eq!(2, watch.consumers().len());
    assert_eq!(Some(&2), watch.consumers().get("spec-a"));
    assert_eq!(Some(&2), watch.consumers().get("spec-b"));
}

#[test]
fn remove_transitions_test() {
    let mut watch = watch();
    watch.add("spec-a");
    watch.add("spec-b");

    assert_eq!(Removal::NotFound, watch.remove("spec-c"));
    assert_eq!(Removal::Retained, watch.remove("spec-a"));
    assert!(!watch.has_consumer("spec-a"));
    assert_eq!(Removal::NotFound, watch.remove("spec-a"));

    assert_eq!(Removal::Emptied, watch.remove("spec-b"));
    assert!(watch.is_closed());
    assert!(watch.consumers().is_empty());
}

#[test]
fn closed_watch_ignores_removal_test() {
    let mut watch = watch();

    assert_eq!(Removal::Emptied, watch.remove("spec-a"));
    assert_eq!(Removal::NotFound, watch.remove("spec-a"));
    assert!(watch.is_closed());
}
