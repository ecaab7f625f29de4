use std::sync::Arc;

use super::*;

#[test]
fn test_leaf_defaults() {
  let leaf: AssemblyNode<u32> = AssemblyNode::leaf(NodeKey(5));

  assert_eq!(leaf.key(), NodeKey(5));
  assert_eq!(leaf.depth(), 0);
  assert!(leaf.is_leaf());
  assert!(leaf.parent().is_none());
  assert!(leaf.children().is_empty());
  assert!(!leaf.can_merge());
  assert!(!leaf.mesh_complete());
}

#[test]
fn test_branch_children_order() {
  let branch: AssemblyNode<u32> =
    AssemblyNode::branch(NodeKey(u64::MAX), Some(NodeId(0)), Some(NodeId(1)), 1);
  assert!(!branch.is_leaf());
  assert_eq!(branch.children().as_slice(), &[NodeId(0), NodeId(1)]);

  let single: AssemblyNode<u32> = AssemblyNode::branch(NodeKey(u64::MAX), None, Some(NodeId(3)), 1);
  assert_eq!(single.children().as_slice(), &[NodeId(3)]);
}

#[test]
fn test_slot_flags_follow_model() {
  let leaf: AssemblyNode<u32> = AssemblyNode::leaf(NodeKey(1));
  leaf.write_slot().populate(Arc::new(7));

  assert!(leaf.can_merge());
  assert!(leaf.mesh_complete());
  assert_eq!(leaf.model().as_deref(), Some(&7));

  leaf.write_slot().reclaim();
  assert!(!leaf.can_merge());
  assert!(leaf.mesh_complete());
  assert!(leaf.model().is_none());
}

/// Only one claimant wins, and a finished claim cannot be re-taken.
#[test]
fn test_merge_claim_is_exclusive() {
  let claim = MergeClaim::default();
  assert!(claim.try_claim());
  assert!(!claim.try_claim());

  claim.finish();
  assert!(claim.is_merged());
  assert!(!claim.try_claim());
}

#[test]
fn test_released_claim_can_be_retaken() {
  let claim = MergeClaim::default();
  assert!(claim.try_claim());
  claim.release();
  assert!(!claim.is_merged());
  assert!(claim.try_claim());
}

#[test]
fn test_concurrent_claims_single_winner() {
  let claim = Arc::new(MergeClaim::default());

  let winners: usize = (0..8)
    .map(|_| {
      let claim = Arc::clone(&claim);
      std::thread::spawn(move || claim.try_claim())
    })
    .collect::<Vec<_>>()
    .into_iter()
    .map(|h| h.join().unwrap() as usize)
    .sum();

  assert_eq!(winners, 1);
}
