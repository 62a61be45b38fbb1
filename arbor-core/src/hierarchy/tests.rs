//! Unit tests for agglomerative clustering and dendrogram cuts.

use proptest::prelude::*;
use rstest::{fixture, rstest};

use super::*;
use crate::test_utils::suite_proptest_config;

/// Objects at positions 0, 1, 3, 7 and 15 on a line.
#[fixture]
fn line() -> DistanceMatrix {
    let positions = [0.0_f64, 1.0, 3.0, 7.0, 15.0];
    DistanceMatrix::from_rows(
        positions
            .iter()
            .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
            .collect(),
    )
    .expect("line distances form a valid matrix")
}

fn merge_distances(dendrogram: &Dendrogram) -> Vec<f64> {
    (0..dendrogram.len())
        .filter_map(|id| dendrogram.merge_distance(id))
        .collect()
}

fn assert_partition(classes: &[Vec<usize>], objects: usize) {
    let mut seen = vec![false; objects];
    for class in classes {
        assert!(!class.is_empty(), "classes must not be empty");
        for &member in class {
            assert!(!seen[member], "object {member} appears twice");
            seen[member] = true;
        }
    }
    assert!(seen.iter().all(|&hit| hit), "every object must be classified");
}

#[rstest]
#[case::single(Linkage::Single, vec![1.0, 2.0, 4.0, 8.0])]
#[case::complete(Linkage::Complete, vec![1.0, 3.0, 7.0, 15.0])]
#[case::average(Linkage::Average, vec![1.0, 2.5, 17.0 / 3.0, 12.25])]
fn linkages_follow_lance_williams(
    line: DistanceMatrix,
    #[case] linkage: Linkage,
    #[case] expected: Vec<f64>,
) {
    let dendrogram = agglomerate(&line, linkage).expect("non-empty matrix");
    let actual = merge_distances(&dendrogram);
    assert_eq!(actual.len(), expected.len());
    for (got, want) in actual.iter().zip(&expected) {
        assert!((got - want).abs() < 1e-12, "{linkage}: {actual:?} != {expected:?}");
    }
    assert_eq!(dendrogram.leaves(dendrogram.root()), vec![0, 1, 2, 3, 4]);
}

#[test]
fn ties_merge_the_lowest_pair_first() {
    let matrix = DistanceMatrix::from_rows(vec![
        vec![0.0, 1.0, 1.0],
        vec![1.0, 0.0, 1.0],
        vec![1.0, 1.0, 0.0],
    ])
    .expect("valid matrix");
    let dendrogram = agglomerate(&matrix, Linkage::Complete).expect("non-empty matrix");

    assert_eq!(dendrogram.children(3), Some((0, 1)));
    assert_eq!(dendrogram.children(4), Some((3, 2)));
    assert_eq!(dendrogram.node(4).map(ClusterNode::size), Some(3));
}

#[test]
fn sorted_nodes_put_highest_merges_first() {
    let matrix = DistanceMatrix::from_rows(vec![
        vec![0.0, 2.0, 6.0],
        vec![2.0, 0.0, 6.0],
        vec![6.0, 6.0, 0.0],
    ])
    .expect("valid matrix");
    let dendrogram = agglomerate(&matrix, Linkage::Single).expect("non-empty matrix");
    assert_eq!(dendrogram.sorted_by_distance(), vec![4, 3, 2, 1, 0]);
}

#[test]
fn single_object_forms_a_leaf_root() {
    let matrix = DistanceMatrix::zeros(1);
    let dendrogram = agglomerate(&matrix, Linkage::Average).expect("non-empty matrix");
    assert_eq!(dendrogram.len(), 1);
    assert_eq!(dendrogram.root(), 0);
    assert_eq!(
        dendrogram.node(0),
        Some(&ClusterNode::Leaf {
            object: 0,
            label: "0".to_owned()
        })
    );
}

#[rstest]
fn threshold_cuts_merges_at_or_above_it(line: DistanceMatrix) {
    let classification =
        classify_by_threshold(vec!['a', 'b', 'c', 'd', 'e'], &line, Linkage::Single, 4.0)
            .expect("valid threshold");
    assert_eq!(
        classification.class_indices(),
        &[vec![0, 1, 2], vec![3], vec![4]]
    );
    assert_eq!(classification.cutoff(), 4.0);
    assert_eq!(classification.class_of(3), Some(1));
    assert_eq!(classification.classes()[0], vec![&'a', &'b', &'c']);
}

#[rstest]
fn zero_threshold_yields_singletons(line: DistanceMatrix) {
    let classification =
        classify_by_threshold((0..5).collect(), &line, Linkage::Average, 0.0).expect("valid threshold");
    assert_eq!(classification.class_count(), 5);
    assert!(classification.dendrogram().is_some());
}

#[rstest]
fn threshold_above_root_keeps_everything_together(line: DistanceMatrix) {
    let classification =
        classify_by_threshold((0..5).collect::<Vec<u8>>(), &line, Linkage::Complete, 100.0)
            .expect("valid threshold");
    assert_eq!(classification.class_indices(), &[vec![0, 1, 2, 3, 4]]);
}

#[test]
fn zero_distance_merges_are_cut_at_zero() {
    let matrix = DistanceMatrix::zeros(3);
    let classification =
        classify_by_threshold(vec![1, 2, 3], &matrix, Linkage::Average, 0.0).expect("valid threshold");
    assert_eq!(classification.class_count(), 3);
}

#[rstest]
#[case(2, 12.25 / 2.0 + 17.0 / 6.0, vec![vec![0, 1, 2, 3], vec![4]])]
#[case(3, 17.0 / 6.0 + 1.25, vec![vec![0, 1, 2], vec![3], vec![4]])]
#[case(4, 1.75, vec![vec![0, 1], vec![2], vec![3], vec![4]])]
fn class_count_cuts_between_merge_heights(
    line: DistanceMatrix,
    #[case] class_count: usize,
    #[case] cutoff: f64,
    #[case] expected: Vec<Vec<usize>>,
) {
    let classification = classify_by_class_count((0..5).collect::<Vec<u8>>(), &line, Linkage::Average, class_count)
        .expect("valid class count");
    assert_eq!(classification.class_indices(), expected.as_slice());
    assert!((classification.cutoff() - cutoff).abs() < 1e-12);
}

#[rstest]
#[case(1, 1)]
#[case(5, 5)]
fn extreme_class_counts_skip_clustering(
    line: DistanceMatrix,
    #[case] class_count: usize,
    #[case] expected_classes: usize,
) {
    let classification = classify_by_class_count(vec!["a", "b", "c", "d", "e"], &line, Linkage::Single, class_count)
        .expect("valid class count");
    assert_eq!(classification.class_count(), expected_classes);
    assert!(classification.dendrogram().is_none());
    assert_eq!(classification.cutoff(), 0.0);
    assert_partition(classification.class_indices(), 5);
}

#[test]
fn labels_map_back_to_objects() {
    let classification =
        classify_by_class_count(vec!["x", "y"], &DistanceMatrix::zeros(2), Linkage::Average, 1)
            .expect("valid class count");
    let labels: Vec<(&str, &&str)> = classification.labels().collect();
    assert_eq!(labels, vec![("0", &"x"), ("1", &"y")]);
    assert_eq!(classification.object("1"), Some(&"y"));
    assert_eq!(classification.object("7"), None);
}

#[rstest]
#[case::zero(0)]
#[case::too_many(6)]
fn rejects_out_of_range_class_counts(line: DistanceMatrix, #[case] class_count: usize) {
    let err = classify_by_class_count(vec![0; 5], &line, Linkage::Average, class_count)
        .expect_err("class count must be rejected");
    assert_eq!(err.code(), ClassificationErrorCode::InvalidClassCount);
}

#[rstest]
#[case::negative(-0.5)]
#[case::nan(f64::NAN)]
#[case::infinite(f64::INFINITY)]
fn rejects_bad_thresholds(line: DistanceMatrix, #[case] threshold: f64) {
    let err = classify_by_threshold(vec![0; 5], &line, Linkage::Average, threshold)
        .expect_err("threshold must be rejected");
    assert_eq!(err.code().as_str(), "CLASSIFICATION_INVALID_THRESHOLD");
}

#[rstest]
fn rejects_mismatched_objects(line: DistanceMatrix) {
    let err = classify_by_class_count(vec![0; 3], &line, Linkage::Average, 2)
        .expect_err("sizes must agree");
    assert_eq!(
        err,
        ClassificationError::SizeMismatch {
            objects: 3,
            matrix: 5
        }
    );
}

#[test]
fn rejects_empty_input() {
    let err = classify_by_threshold(Vec::<u8>::new(), &DistanceMatrix::zeros(0), Linkage::Single, 1.0)
        .expect_err("empty input must be rejected");
    assert_eq!(err, ClassificationError::NoObjects);
    assert_eq!(
        agglomerate(&DistanceMatrix::zeros(0), Linkage::Single),
        Err(ClassificationError::NoObjects)
    );
}

#[rstest]
#[case("Average linkage", Linkage::Average)]
#[case("single", Linkage::Single)]
#[case("COMPLETE LINKAGE", Linkage::Complete)]
fn parses_linkage_names(#[case] input: &str, #[case] expected: Linkage) {
    assert_eq!(input.parse::<Linkage>(), Ok(expected));
}

#[test]
fn unknown_linkage_lists_alternatives() {
    let err = "ward".parse::<Linkage>().expect_err("ward is not supported");
    assert_eq!(
        err.to_string(),
        "unknown linkage `ward`; expected one of: single, complete, average"
    );
}

fn symmetric_matrix() -> impl Strategy<Value = DistanceMatrix> {
    (1_usize..=8).prop_flat_map(|size| {
        prop::collection::vec(0_u8..=20, size * size).prop_map(move |raw| {
            let mut rows = vec![vec![0.0; size]; size];
            for i in 0..size {
                for j in (i + 1)..size {
                    let value = f64::from(raw[i * size + j]);
                    rows[i][j] = value;
                    rows[j][i] = value;
                }
            }
            DistanceMatrix::from_rows(rows).expect("generated matrix is valid")
        })
    })
}

fn linkage_strategy() -> impl Strategy<Value = Linkage> {
    prop::sample::select(Linkage::ALL.to_vec())
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn class_count_cuts_partition_the_objects(
        matrix in symmetric_matrix(),
        linkage in linkage_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let objects = matrix.len();
        let class_count = pick.index(objects) + 1;
        let classification = classify_by_class_count((0..objects).collect(), &matrix, linkage, class_count)
            .expect("valid class count");
        assert_partition(classification.class_indices(), objects);
        if class_count == 1 || class_count == objects {
            prop_assert_eq!(classification.class_count(), class_count);
        } else {
            prop_assert!(classification.class_count() >= class_count);
        }
    }

    #[test]
    fn threshold_cuts_partition_the_objects(
        matrix in symmetric_matrix(),
        linkage in linkage_strategy(),
        threshold in 0.0_f64..25.0,
    ) {
        let objects = matrix.len();
        let classification = classify_by_threshold((0..objects).collect(), &matrix, linkage, threshold)
            .expect("valid threshold");
        assert_partition(classification.class_indices(), objects);
        let firsts: Vec<usize> = classification.class_indices().iter().map(|class| class[0]).collect();
        let mut sorted = firsts.clone();
        sorted.sort_unstable();
        prop_assert_eq!(firsts, sorted);
    }
}
