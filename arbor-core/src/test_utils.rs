//! Shared test utilities for `arbor-core`.

use arbor_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::{prelude::*, test_runner::Config as ProptestConfig};

use crate::SimpleTree;

/// Node budget for generated trees when the environment does not set one.
const DEFAULT_MAX_TREE_NODES: usize = 12;

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROGTEST_CASES` and
/// `ARBOR_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false, DEFAULT_MAX_TREE_NODES);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Generates trees with small positive integral attributes whose size stays
/// within the profile's node budget.
pub(crate) fn tree_strategy() -> impl Strategy<Value = SimpleTree<f64>> {
    let max_nodes = ProptestRunProfile::load(1, false, DEFAULT_MAX_TREE_NODES).max_tree_nodes();
    let leaf = (1_u8..=40).prop_map(|value| SimpleTree::new(f64::from(value)));
    leaf.prop_recursive(4, max_nodes as u32, 3, |inner| {
        (1_u8..=40, prop::collection::vec(inner, 0..=3))
            .prop_map(|(value, children)| SimpleTree::with_children(f64::from(value), children))
    })
}

/// Generates an optional tree where `None` stands for the empty tree.
pub(crate) fn optional_tree_strategy() -> impl Strategy<Value = Option<SimpleTree<f64>>> {
    prop_oneof![1 => Just(None), 6 => tree_strategy().prop_map(Some)]
}
