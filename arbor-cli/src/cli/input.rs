//! JSON tree documents accepted by the CLI.
//!
//! A tree is an object `{"name": "...", "attribute": 12.5, "children": [...]}`
//! where `name` and `children` are optional. Collection files hold a JSON
//! array of such objects.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use arbor_core::Tree;
use serde::{Deserialize, Serialize};
use tracing::{Span, debug, field, instrument};

use super::CliError;

/// A weighted tree node read from JSON.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TreeDocument {
    /// Optional display name used in reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Numeric node weight compared by the local cost.
    pub attribute: f64,
    /// Child subtrees, in no particular order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeDocument>,
}

impl TreeDocument {
    /// Name of the node, falling back to its attribute.
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.attribute.to_string())
    }
}

impl Tree for TreeDocument {
    type Attribute = f64;

    fn attribute(&self) -> f64 {
        self.attribute
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

/// Reads a single tree from `path`.
///
/// # Errors
/// Returns [`CliError::Io`] when the file cannot be opened and
/// [`CliError::Json`] when it does not hold a tree document.
#[instrument(name = "cli.load_tree", err, fields(path = field::Empty))]
pub fn load_tree(path: &Path) -> Result<TreeDocument, CliError> {
    Span::current().record("path", field::display(path.display()));
    read_json(path)
}

/// Reads a JSON array of trees from `path`.
///
/// # Errors
/// Returns [`CliError::Io`] when the file cannot be opened and
/// [`CliError::Json`] when it does not hold an array of tree documents.
#[instrument(name = "cli.load_forest", err, fields(path = field::Empty))]
pub fn load_forest(path: &Path) -> Result<Vec<TreeDocument>, CliError> {
    Span::current().record("path", field::display(path.display()));
    let trees: Vec<TreeDocument> = read_json(path)?;
    debug!(trees = trees.len(), "loaded tree collection");
    Ok(trees)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Label for the tree at `index` of a collection: its root name or the
/// position in the file.
pub(super) fn collection_label(tree: &TreeDocument, index: usize) -> String {
    tree.name.clone().unwrap_or_else(|| format!("#{index}"))
}
