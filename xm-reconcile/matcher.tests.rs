use rstest::rstest;
use xm_kube::{MetricJoin, MetricSpec};

use crate::test_utils::{categories, descriptors, match_name};

use super::*;

fn selected(rules: &MetricSpec, namespace: Option<&str>) -> Vec<String> {
    select_targets(rules, &descriptors(), namespace).into_keys().collect()
}

#[test]
fn match_name_test() {
    assert_eq!(
        vec!["testa_cloud_NameA_v1", "testa_cloud_NameB_v1beta1"],
        selected(&match_name("testa.cloud"), None)
    );
}

#[test]
fn match_name_is_unanchored_test() {
    assert_eq!(
        vec!["testb_cloud_NameC_v1", "testb_cloud_NameD_v2"],
        selected(&match_name("b\\.cloud$"), None)
    );
}

#[test]
fn exclude_names_test() {
    let mut rules = match_name("testa.cloud");
    rules.exclude_names = Some(vec!["namebs.testa.cloud".to_owned()]);

    assert_eq!(vec!["testa_cloud_NameA_v1"], selected(&rules, None));
}

#[test]
fn include_names_test() {
    let mut rules = match_name("testa.cloud");
    rules.include_names = Some(vec!["namecs.testb.cloud".to_owned()]);

    assert_eq!(
        vec![
            "testa_cloud_NameA_v1",
            "testa_cloud_NameB_v1beta1",
            "testb_cloud_NameC_v1"
        ],
        selected(&rules, None)
    );
}

#[test]
fn include_names_without_base_rule_test() {
    let rules = MetricSpec {
        include_names: Some(vec!["nameds.testb.cloud".to_owned()]),
        ..Default::default()
    };

    assert_eq!(vec!["testb_cloud_NameD_v2"], selected(&rules, None));
}

#[test]
fn exclude_wins_over_include_test() {
    let mut rules = categories(&["crdx"], MetricJoin::And);
    rules.include_names = Some(vec!["namecs.testb.cloud".to_owned()]);
    rules.exclude_names = Some(vec!["namecs.testb.cloud".to_owned()]);

    assert_eq!(vec!["testa_cloud_NameA_v1"], selected(&rules, None));
}

#[rstest]
#[case(&["crda"], MetricJoin::And, vec!["testa_cloud_NameA_v1"])]
#[case(&["crda", "crdx"], MetricJoin::And, vec!["testa_cloud_NameA_v1"])]
#[case(&["crdc", "crda"], MetricJoin::And, vec![])]
#[case(&["crda", "crdx"], MetricJoin::Or, vec!["testa_cloud_NameA_v1", "testb_cloud_NameC_v1"])]
#[case(&["crdb", "crdf"], MetricJoin::Or, vec!["testa_cloud_NameB_v1beta1", "testc_cloud_NameF_v1"])]
#[case(&[], MetricJoin::And, vec![])]
#[case(&[], MetricJoin::Or, vec![])]
fn categories_test(#[case] values: &[&str], #[case] join: MetricJoin, #[case] expected: Vec<&str>) {
    assert_eq!(expected, selected(&categories(values, join), None));
}

#[test]
fn match_name_takes_precedence_test() {
    let mut rules = categories(&["crdc"], MetricJoin::And);
    rules.match_name = Some("testa.cloud".to_owned());

    assert_eq!(
        vec!["testa_cloud_NameA_v1", "testa_cloud_NameB_v1beta1"],
        selected(&rules, None)
    );
}

#[test]
fn invalid_match_name_selects_nothing_test() {
    let mut rules = match_name("testa.(cloud");
    rules.categories = categories(&["crda"], MetricJoin::And).categories;

    assert!(selected(&rules, None).is_empty());
}

#[test]
fn namespaced_spec_skips_cluster_types_test() {
    let targets = select_targets(&match_name("testc.cloud"), &descriptors(), Some("team-a"));

    assert_eq!(
        vec!["team_a_testc_cloud_NameE_v1", "team_a_testc_cloud_NameG_v1"],
        targets.keys().cloned().collect::<Vec<_>>()
    );
    assert!(targets.values().all(|t| t.namespace.as_deref() == Some("team-a")));
}

#[test]
fn cluster_spec_selects_both_scopes_test() {
    assert_eq!(
        vec![
            "testc_cloud_NameE_v1",
            "testc_cloud_NameF_v1",
            "testc_cloud_NameG_v1"
        ],
        selected(&match_name("testc.cloud"), None)
    );
}

#[test]
fn no_rules_select_nothing_test() {
    assert!(selected(&MetricSpec::default(), None).is_empty());
}

#[test]
fn target_uses_storage_version_test() {
    let targets = select_targets(&match_name("namebs"), &descriptors(), None);
    let target = &targets["testa_cloud_NameB_v1beta1"];

    assert_eq!("testa.cloud", target.group);
    assert_eq!("v1beta1", target.version);
    assert_eq!("namebs", target.resource);
    assert_eq!("NameB", target.kind);
}
