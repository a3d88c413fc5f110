use super::{store, InventorySlot, Likes};
use crate::prelude::*;

#[test]
pub fn relations_are_keyed_and_replace_on_collision() {
	let mut store = store();
	let entity = store.create_entity();

	assert!(store.add_relation(entity, InventorySlot { slot: 0, item: "sword" }).unwrap());
	assert!(store.add_relation(entity, InventorySlot { slot: 1, item: "shield" }).unwrap());
	assert!(!store.add_relation(entity, InventorySlot { slot: 0, item: "axe" }).unwrap());

	assert_eq!(2, store.relations::<InventorySlot>(entity).unwrap().len());
	assert_eq!(
		Some(&InventorySlot { slot: 0, item: "axe" }),
		store.relation::<InventorySlot>(entity, &0).unwrap()
	);
	assert_eq!(None, store.relation::<InventorySlot>(entity, &7).unwrap());
}

#[test]
pub fn removal_reports_presence() {
	let mut store = store();
	let entity = store.create_entity();
	store.add_relation(entity, InventorySlot { slot: 2, item: "rope" }).unwrap();

	assert!(store.remove_relation::<InventorySlot>(entity, &2).unwrap());
	assert!(!store.remove_relation::<InventorySlot>(entity, &2).unwrap());
	assert!(store.relations::<InventorySlot>(entity).unwrap().is_empty());
}

#[test]
pub fn link_relations_validate_their_target() {
	let mut store = store();
	let source = store.create_entity();
	let target = store.create_entity();
	store.delete_entity(target).unwrap();

	assert_eq!(
		Err(EcsError::StaleEntity(target.id())),
		store.add_relation(source, Likes { target: target.id(), amount: 1 })
	);
}

#[test]
pub fn sources_are_found_from_the_target() {
	let mut store = store();
	let liked = store.create_entity();
	let a = store.create_entity();
	let b = store.create_entity();

	store.add_relation(a, Likes { target: liked.id(), amount: 3 }).unwrap();
	store.add_relation(b, Likes { target: liked.id(), amount: 5 }).unwrap();

	assert_eq!(vec![a.id(), b.id()], store.relation_sources::<Likes>(liked).unwrap());
}

#[test]
pub fn deleting_the_target_drops_incoming_relations() {
	let mut store = store();
	let liked = store.create_entity();
	let fan = store.create_entity();
	let other = store.create_entity();

	store.add_relation(fan, Likes { target: liked.id(), amount: 2 }).unwrap();
	store.add_relation(fan, Likes { target: other.id(), amount: 9 }).unwrap();

	store.delete_entity(liked).unwrap();

	let remaining = store.relations::<Likes>(fan).unwrap();
	assert_eq!(1, remaining.len());
	assert_eq!(other.id(), remaining[0].target);
}

#[test]
pub fn deleting_the_source_drops_outgoing_relations() {
	let mut store = store();
	let liked = store.create_entity();
	let fan = store.create_entity();
	store.add_relation(fan, Likes { target: liked.id(), amount: 4 }).unwrap();

	store.delete_entity(fan).unwrap();

	assert!(store.relation_sources::<Likes>(liked).unwrap().is_empty());
}

#[test]
pub fn replacing_a_relation_keeps_the_shared_target_linked() {
	let mut store = store();
	let liked = store.create_entity();
	let fan = store.create_entity();

	store.add_relation(fan, Likes { target: liked.id(), amount: 1 }).unwrap();
	store.add_relation(fan, Likes { target: liked.id(), amount: 2 }).unwrap();

	// Deleting the target must still clean up the surviving relation.
	store.delete_entity(liked).unwrap();
	assert!(store.relations::<Likes>(fan).unwrap().is_empty());
}
