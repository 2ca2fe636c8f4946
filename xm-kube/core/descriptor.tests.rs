use super::*;

const CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: namecs.testb.cloud
spec:
  group: testb.cloud
  scope: Namespaced
  names:
    kind: NameC
    plural: namecs
    categories:
      - managed
      - crdc
      - crdx
  versions:
    - name: v1beta1
      served: true
      storage: false
    - name: v1
      served: true
      storage: true
"#;

const CRD_NO_STORAGE: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: namefs.testc.cloud
spec:
  group: testc.cloud
  scope: Cluster
  names:
    kind: NameF
    plural: namefs
  versions:
    - name: v1
      served: true
      storage: false
"#;

#[test]
fn from_crd_picks_storage_version_test() {
    let crd: CustomResourceDefinition = serde_yaml::from_str(CRD).unwrap();
    let descriptor = ResourceTypeDescriptor::from_crd(&crd).unwrap();

    assert_eq!("namecs.testb.cloud", descriptor.name);
    assert_eq!("testb.cloud", descriptor.group);
    assert_eq!("v1", descriptor.stored_version);
    assert_eq!("namecs", descriptor.plural);
    assert_eq!("NameC", descriptor.kind);
    assert!(descriptor.is_namespaced());
    assert!(descriptor.categories.iter().any(|c| c == "crdx"));
    assert!(!descriptor.categories.iter().any(|c| c == "crda"));
}

#[test]
fn from_crd_without_storage_version_test() {
    let crd: CustomResourceDefinition = serde_yaml::from_str(CRD_NO_STORAGE).unwrap();
    assert_eq!(None, ResourceTypeDescriptor::from_crd(&crd));
}

#[test]
fn scope_from_str_test() {
    assert_eq!(ResourceScope::Namespaced, ResourceScope::from("Namespaced"));
    assert_eq!(ResourceScope::Cluster, ResourceScope::from("Cluster"));
}
