use rstest::rstest;

use super::*;

#[rstest]
#[case("testa_cloud_NameA_v1", "testa.cloud_NameA_v1")]
#[case("metrics_crossplane_io", "metrics.crossplane.io")]
#[case("a_b_c_d", "a-b/c.d")]
#[case("abc", "a b!c")]
#[case("", "")]
#[case("", "äöü ")]
#[case("label_app_kubernetes_io_name", "label_app.kubernetes.io/name")]
fn sanitize_test(#[case] expected: &str, #[case] input: &str) {
    assert_eq!(expected, sanitize(input));
}

#[test]
fn sanitize_is_total_and_deterministic_test() {
    let input = "Grp.example.com/Kind~v1 \t\"x\"-ß";
    let first = sanitize(input);

    assert_eq!(first, sanitize(input));
    assert!(first.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    assert_eq!("Grp_example_com_Kindv1x_", first);
}

#[test]
fn sanitize_join_test() {
    assert_eq!("testa_cloud_NameA_v1", sanitize_join(&["testa.cloud", "NameA", "v1"]));
    assert_eq!("ns_1_testa_cloud_NameA_v1", sanitize_join(&["ns-1", "testa_cloud_NameA_v1"]));
}
