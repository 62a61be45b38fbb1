//! Arbor core library.
//!
//! Compares rooted unordered trees with Zhang's constrained edit distance and
//! groups tree collections by agglomerative hierarchical clustering.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod classifier;
mod cost;
mod error;
pub mod flow;
mod hierarchy;
mod matrix;
mod similarity;
mod tree;
mod zhang;

#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::{ClassifierBuilder, Criterion, ExecutionStrategy},
    classifier::Classifier,
    cost::{CostFunction, LocalCost},
    error::{ArborError, ArborErrorCode, Result, UnknownVariant},
    hierarchy::{
        Classification, ClassificationError, ClassificationErrorCode, ClusterNode, Dendrogram,
        Linkage, NodeId, agglomerate, classify_by_class_count, classify_by_threshold,
    },
    matrix::{DistanceMatrix, MatrixError, MatrixErrorCode, build_distance_matrix},
    similarity::SimilarityMeasure,
    tree::{SimpleTree, Tree},
    zhang::{
        EditOperation, NodeMapping, TreeDistanceError, TreeDistanceErrorCode, TreeEditDistance,
        distance, node_mapping,
    },
};
