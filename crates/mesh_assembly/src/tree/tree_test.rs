use proptest::prelude::*;

use super::*;
use crate::error::AssemblyError;
use crate::key::DescendingKeys;

fn build(keys: &[SliceKey]) -> AssemblyTree<()> {
  AssemblyTree::build(keys, &DescendingKeys::default()).expect("valid key set")
}

fn ceil_log2(n: usize) -> u32 {
  usize::BITS - (n - 1).leading_zeros()
}

#[test]
fn test_empty_key_set_rejected() {
  let result: AssemblyResult<AssemblyTree<()>> = AssemblyTree::build(&[], &DescendingKeys::default());
  assert_eq!(result.unwrap_err(), AssemblyError::EmptySliceSet);
}

#[test]
fn test_duplicate_key_rejected() {
  let result: AssemblyResult<AssemblyTree<()>> =
    AssemblyTree::build(&[1, 2, 1], &DescendingKeys::default());
  assert_eq!(result.unwrap_err(), AssemblyError::DuplicateSliceKey(1));
}

/// A branch key equal to a slice key must be caught at construction.
#[test]
fn test_branch_key_collision_rejected() {
  let result: AssemblyResult<AssemblyTree<()>> =
    AssemblyTree::build(&[1, 2, 10], &DescendingKeys::new(10));
  assert_eq!(result.unwrap_err(), AssemblyError::KeyCollision(NodeKey(10)));
}

#[test]
fn test_single_slice_root_is_leaf() {
  let tree = build(&[42]);
  assert_eq!(tree.len(), 1);
  assert_eq!(tree.branch_count(), 0);
  assert_eq!(tree.layer_count(), 0);
  assert!(tree.root().is_leaf());
  assert_eq!(tree.root().key(), NodeKey(42));
  assert_eq!(tree.depth(), 0);
}

#[test]
fn test_four_leaves_pair_adjacent_keys() {
  let tree = build(&[1, 2, 3, 4]);
  assert_eq!(tree.branch_count(), 3);
  assert_eq!(tree.depth(), 2);

  let parent_of = |k: u64| tree.node(tree.leaf(k).unwrap()).parent().unwrap();
  assert_eq!(parent_of(1), parent_of(2));
  assert_eq!(parent_of(3), parent_of(4));
  assert_ne!(parent_of(1), parent_of(3));

  let root = tree.root_id();
  assert_eq!(tree.node(parent_of(1)).parent(), Some(root));
  assert_eq!(tree.node(parent_of(3)).parent(), Some(root));
  assert_eq!(tree.leaves_under(root), vec![1, 2, 3, 4]);
}

/// Branch keys count down from u64::MAX, layer by layer.
#[test]
fn test_branch_keys_descend() {
  let tree = build(&[1, 2, 3, 4]);
  let left_branch = tree.node(tree.leaf(1).unwrap()).parent().unwrap();
  let right_branch = tree.node(tree.leaf(3).unwrap()).parent().unwrap();

  assert_eq!(tree.node(left_branch).key(), NodeKey(u64::MAX));
  assert_eq!(tree.node(right_branch).key(), NodeKey(u64::MAX - 1));
  assert_eq!(tree.root().key(), NodeKey(u64::MAX - 2));
}

/// Odd trailing leaf is carried forward instead of being wrapped.
#[test]
fn test_five_leaves_carry_forward() {
  let tree = build(&[1, 2, 3, 4, 5]);
  assert_eq!(tree.branch_count(), 4);
  assert_eq!(tree.layer_count(), 3);
  assert_eq!(tree.depth(), 3);

  let leaf5 = tree.leaf(5).unwrap();
  let parent = tree.node(leaf5).parent().unwrap();
  assert_eq!(parent, tree.root_id(), "Carried leaf pairs with the rest at the top");

  for (_, node) in tree.iter() {
    if !node.is_leaf() {
      assert_eq!(node.children().len(), 2, "No single-child branches");
    }
  }
}

#[test]
fn test_three_leaves_shape() {
  let tree = build(&[7, 8, 9]);
  assert_eq!(tree.depth(), 2);
  let root = tree.root();
  let children = root.children();
  assert_eq!(tree.node(children[0]).depth(), 1);
  assert_eq!(tree.node(children[1]).key(), NodeKey(9));
}

#[test]
fn test_find_by_key() {
  let tree = build(&[10, 20]);
  assert_eq!(tree.find(NodeKey(10)), tree.leaf(10));
  assert_eq!(tree.find(NodeKey(u64::MAX)), Some(tree.root_id()));
  assert!(tree.find(NodeKey(30)).is_none());
  assert!(tree.leaf(u64::MAX).is_none(), "Branches are not slices");
}

#[test]
fn test_is_ancestor() {
  let tree = build(&[1, 2, 3, 4]);
  let leaf1 = tree.leaf(1).unwrap();
  let leaf3 = tree.leaf(3).unwrap();
  let branch12 = tree.node(leaf1).parent().unwrap();

  assert!(tree.is_ancestor(branch12, leaf1));
  assert!(tree.is_ancestor(tree.root_id(), leaf1));
  assert!(!tree.is_ancestor(branch12, leaf3));
  assert!(!tree.is_ancestor(leaf1, leaf1));
}

proptest! {
  /// Shape invariants hold for any slice count.
  #[test]
  fn prop_tree_shape(n in 1usize..300) {
    let keys: Vec<SliceKey> = (0..n as u64).map(|k| k * 3 + 1).collect();
    let tree = build(&keys);

    prop_assert_eq!(tree.leaf_count(), n);
    prop_assert_eq!(tree.branch_count(), n - 1);
    prop_assert_eq!(tree.depth(), ceil_log2(n));
    prop_assert!(tree.root().parent().is_none());

    let mut child_refs = vec![0usize; tree.len()];
    for (id, node) in tree.iter() {
      if id != tree.root_id() {
        prop_assert!(node.parent().is_some());
      }
      if let NodeKind::Branch { .. } = node.kind() {
        let children = node.children();
        prop_assert!((1..=2).contains(&children.len()));
        for child in children {
          prop_assert_eq!(tree.node(child).parent(), Some(id));
          child_refs[child.index()] += 1;
        }
        let expected = 1 + node.children().iter().map(|c| tree.node(*c).depth()).max().unwrap_or(0);
        prop_assert_eq!(node.depth(), expected);
      }
    }

    for (id, _) in tree.iter() {
      let expected = if id == tree.root_id() { 0 } else { 1 };
      prop_assert_eq!(child_refs[id.index()], expected);
    }

    prop_assert_eq!(tree.leaves_under(tree.root_id()), keys);
  }
}
