use super::*;

#[derive(Clone, Debug, PartialEq)]
struct Tally(Vec<u32>);

impl MeshModel for Tally {
  fn empty() -> Self {
    Tally(Vec::new())
  }

  fn merge(&mut self, other: &Self) {
    self.0.extend_from_slice(&other.0);
  }
}

#[test]
fn test_slot_lifecycle() {
  let mut slot: ModelSlot<Tally> = ModelSlot::default();
  assert!(!slot.is_complete());
  assert!(!slot.can_merge());
  assert!(slot.model().is_none());

  assert!(slot.populate(Arc::new(Tally(vec![1]))));
  assert!(slot.is_complete());
  assert!(slot.can_merge());

  let taken = slot.reclaim().expect("Populated slot yields its model");
  assert_eq!(*taken, Tally(vec![1]));
  assert!(slot.is_complete(), "Reclaimed slot stays complete");
  assert!(!slot.can_merge());
}

/// The empty sentinel still completes the slot.
#[test]
fn test_empty_model_completes_slot() {
  let mut slot = ModelSlot::Empty;
  slot.populate(Arc::new(Tally::empty()));
  assert!(slot.is_complete());
  assert!(slot.can_merge());
}

#[test]
fn test_populate_is_write_once() {
  let mut slot = ModelSlot::Empty;
  assert!(slot.populate(Arc::new(Tally(vec![1]))));
  assert!(!slot.populate(Arc::new(Tally(vec![2]))));
  assert_eq!(**slot.model().unwrap(), Tally(vec![1]));

  slot.reclaim();
  assert!(
    !slot.populate(Arc::new(Tally(vec![3]))),
    "Reclaimed slot cannot be repopulated"
  );
  assert!(matches!(slot, ModelSlot::Reclaimed));
}

#[test]
fn test_reclaim_empty_slot() {
  let mut slot: ModelSlot<Tally> = ModelSlot::Empty;
  assert!(slot.reclaim().is_none());
  assert!(!slot.is_complete());
}

#[test]
fn test_merge_unique_model_in_place() {
  let left = Arc::new(Tally(vec![1, 2]));
  let merged = merge_models(left, &Tally(vec![3]));
  assert_eq!(*merged, Tally(vec![1, 2, 3]));
}

/// A reader holding the left model keeps its original content.
#[test]
fn test_merge_shared_model_copies() {
  let left = Arc::new(Tally(vec![1]));
  let reader = Arc::clone(&left);

  let merged = merge_models(left, &Tally(vec![2]));
  assert_eq!(*merged, Tally(vec![1, 2]));
  assert_eq!(*reader, Tally(vec![1]));
}
