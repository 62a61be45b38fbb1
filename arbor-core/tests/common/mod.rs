//! Weighted fixture trees shared by the integration suites.
//!
//! Attributes are node weights; the comment above each builder sketches the
//! tree with children listed left to right.

use arbor_core::SimpleTree;

fn grow(parent: &mut SimpleTree<f64>, weight: f64) -> &mut SimpleTree<f64> {
    parent.add_child(SimpleTree::new(weight))
}

/// `20(10, 30)`
#[must_use]
pub fn tree1() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(20.0);
    grow(&mut root, 10.0);
    grow(&mut root, 30.0);
    root
}

/// `30(10, 20)`
#[must_use]
pub fn tree2() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(30.0);
    grow(&mut root, 10.0);
    grow(&mut root, 20.0);
    root
}

/// `1(1(1, 100), 1)`
#[must_use]
pub fn tree3() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(1.0);
    let inner = grow(&mut root, 1.0);
    grow(inner, 1.0);
    grow(inner, 100.0);
    grow(&mut root, 1.0);
    root
}

/// `1(100(1, 1), 1)`
#[must_use]
pub fn tree4() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(1.0);
    let inner = grow(&mut root, 100.0);
    grow(inner, 1.0);
    grow(inner, 1.0);
    grow(&mut root, 1.0);
    root
}

/// `13(203, 203)`
#[must_use]
pub fn tree5() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(13.0);
    grow(&mut root, 203.0);
    grow(&mut root, 203.0);
    root
}

/// `12(227, 227)`
#[must_use]
pub fn tree6() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(12.0);
    grow(&mut root, 227.0);
    grow(&mut root, 227.0);
    root
}

/// `12(227, 227(10, 10))`
#[must_use]
pub fn tree7() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(12.0);
    grow(&mut root, 227.0);
    let inner = grow(&mut root, 227.0);
    grow(inner, 10.0);
    grow(inner, 10.0);
    root
}

/// `3(8(5, 4), 8(1, 2))`
#[must_use]
pub fn tree8() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(3.0);
    let first = grow(&mut root, 8.0);
    grow(first, 5.0);
    grow(first, 4.0);
    let second = grow(&mut root, 8.0);
    grow(second, 1.0);
    grow(second, 2.0);
    root
}

/// `3(8(4, 4), 8(1, 2))`
#[must_use]
pub fn tree9() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(3.0);
    let first = grow(&mut root, 8.0);
    grow(first, 4.0);
    grow(first, 4.0);
    let second = grow(&mut root, 8.0);
    grow(second, 1.0);
    grow(second, 2.0);
    root
}

/// `1(1, 10)`
#[must_use]
pub fn tree10() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(1.0);
    grow(&mut root, 1.0);
    grow(&mut root, 10.0);
    root
}

/// `10`
#[must_use]
pub fn tree11() -> SimpleTree<f64> {
    SimpleTree::new(10.0)
}

/// `1000(1(100, 200), 1)`
#[must_use]
pub fn tree12() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(1_000.0);
    let inner = grow(&mut root, 1.0);
    grow(inner, 100.0);
    grow(inner, 200.0);
    grow(&mut root, 1.0);
    root
}

/// `1000(100, 200)`
#[must_use]
pub fn tree13() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(1_000.0);
    grow(&mut root, 100.0);
    grow(&mut root, 200.0);
    root
}

/// `10000(2, 4)`
#[must_use]
pub fn tree14() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(10_000.0);
    grow(&mut root, 2.0);
    grow(&mut root, 4.0);
    root
}

/// `10001(3, 5, 1000000)`
#[must_use]
pub fn non_binary_tree() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(10_001.0);
    grow(&mut root, 3.0);
    grow(&mut root, 5.0);
    grow(&mut root, 1_000_000.0);
    root
}

/// `1000(100, 1(200, 300))`
#[must_use]
pub fn tree15() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(1_000.0);
    grow(&mut root, 100.0);
    let inner = grow(&mut root, 1.0);
    grow(inner, 200.0);
    grow(inner, 300.0);
    root
}

/// `1000(2(100, 200), 300)`
#[must_use]
pub fn tree16() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(1_000.0);
    let inner = grow(&mut root, 2.0);
    grow(inner, 100.0);
    grow(inner, 200.0);
    grow(&mut root, 300.0);
    root
}

/// `1000(200, 300)`
#[must_use]
pub fn tree17() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(1_000.0);
    grow(&mut root, 200.0);
    grow(&mut root, 300.0);
    root
}

/// `100(200, 300)`
#[must_use]
pub fn tree18() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(100.0);
    grow(&mut root, 200.0);
    grow(&mut root, 300.0);
    root
}

/// `100(1(3(5(200, 300), 6), 4), 2)`
#[must_use]
pub fn tree19() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(100.0);
    let one = grow(&mut root, 1.0);
    let three = grow(one, 3.0);
    let five = grow(three, 5.0);
    grow(five, 200.0);
    grow(five, 300.0);
    grow(three, 6.0);
    grow(one, 4.0);
    grow(&mut root, 2.0);
    root
}

/// `60(50, 40(80, 100))`
#[must_use]
pub fn tree22() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(60.0);
    grow(&mut root, 50.0);
    let inner = grow(&mut root, 40.0);
    grow(inner, 80.0);
    grow(inner, 100.0);
    root
}

/// `60(50(80, 100), 40)`
#[must_use]
pub fn tree23() -> SimpleTree<f64> {
    let mut root = SimpleTree::new(60.0);
    let inner = grow(&mut root, 50.0);
    grow(inner, 80.0);
    grow(inner, 100.0);
    grow(&mut root, 40.0);
    root
}
