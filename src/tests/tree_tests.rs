use super::store;
use crate::prelude::*;

#[test]
pub fn children_attach_and_detach() {
	let mut store = store();
	let parent = store.create_entity();
	let a = store.create_entity();
	let b = store.create_entity();

	store.add_child(parent, a).unwrap();
	store.add_child(parent, b).unwrap();

	assert_eq!(2, store.child_count(parent).unwrap());
	assert_eq!(vec![a.id(), b.id()], store.child_ids(parent).unwrap());
	assert_eq!(Some(parent), store.parent(a).unwrap());
	assert_eq!(None, store.parent(parent).unwrap());

	assert!(store.remove_child(parent, a).unwrap());
	assert!(!store.remove_child(parent, a).unwrap());
	assert_eq!(vec![b.id()], store.child_ids(parent).unwrap());
	assert_eq!(None, store.parent(a).unwrap());
}

#[test]
pub fn attaching_twice_is_a_no_op() {
	let mut store = store();
	let parent = store.create_entity();
	let child = store.create_entity();

	store.add_child(parent, child).unwrap();
	store.add_child(parent, child).unwrap();
	assert_eq!(1, store.child_count(parent).unwrap());
}

#[test]
pub fn attaching_to_a_new_parent_reparents() {
	let mut store = store();
	let first = store.create_entity();
	let second = store.create_entity();
	let child = store.create_entity();

	store.add_child(first, child).unwrap();
	store.add_child(second, child).unwrap();

	assert_eq!(0, store.child_count(first).unwrap());
	assert_eq!(vec![child.id()], store.child_ids(second).unwrap());
	assert_eq!(Some(second), store.parent(child).unwrap());
}

#[test]
pub fn cycles_are_rejected_without_side_effects() {
	let mut store = store();
	let e1 = store.create_entity();
	let e2 = store.create_entity();
	store.add_child(e1, e2).unwrap();

	// Attaching the ancestor under its descendant closes the loop; the path
	// starts at the would-be parent and ends on it.
	assert_eq!(
		Err(EcsError::TreeCycle { path: "2 -> 1 -> 2".into() }),
		store.add_child(e2, e1)
	);
	assert_eq!(1, store.child_count(e1).unwrap());
	assert_eq!(0, store.child_count(e2).unwrap());
	assert_eq!(Some(e1), store.parent(e2).unwrap());
}

#[test]
pub fn self_attachment_is_a_cycle() {
	let mut store = store();
	let entity = store.create_entity();

	assert_eq!(
		Err(EcsError::TreeCycle { path: "1 -> 1".into() }),
		store.add_child(entity, entity)
	);
}

#[test]
pub fn deep_cycles_report_the_whole_chain() {
	let mut store = store();
	let a = store.create_entity();
	let b = store.create_entity();
	let c = store.create_entity();
	store.add_child(a, b).unwrap();
	store.add_child(b, c).unwrap();

	assert_eq!(
		Err(EcsError::TreeCycle { path: "3 -> 2 -> 1 -> 3".into() }),
		store.add_child(c, a)
	);
}

#[test]
pub fn the_root_is_set_once() {
	let mut store = store();
	let root = store.create_entity();
	let other = store.create_entity();

	assert_eq!(None, store.root());
	store.set_root(root).unwrap();
	assert_eq!(Some(root), store.root());
	assert_eq!(Err(EcsError::RootAlreadySet(root.id())), store.set_root(other));

	store.delete_entity(root).unwrap();
	assert_eq!(None, store.root());
}

#[test]
pub fn deleting_a_parent_orphans_its_children() {
	let mut store = store();
	let grandparent = store.create_entity();
	let parent = store.create_entity();
	let child = store.create_entity();
	store.add_child(grandparent, parent).unwrap();
	store.add_child(parent, child).unwrap();

	store.delete_entity(parent).unwrap();

	assert_eq!(0, store.child_count(grandparent).unwrap());
	assert!(store.is_alive(child));
	assert_eq!(None, store.parent(child).unwrap());
}
