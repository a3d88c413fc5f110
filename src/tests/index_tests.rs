use super::{store, FollowTarget, Name, Score};
use crate::prelude::*;

#[test]
pub fn value_lookups_find_exact_keys() {
	let mut store = store();

	let alice = store.create_entity();
	store.add_component(alice, Name("alice".into())).unwrap();
	let bob = store.create_entity();
	store.add_component(bob, Name("bob".into())).unwrap();
	let second_bob = store.create_entity();
	store.add_component(second_bob, Name("bob".into())).unwrap();

	assert_eq!(vec![alice.id()], store.entities_with_value::<Name>(&"alice".into()).unwrap());
	let mut bobs = store.entities_with_value::<Name>(&"bob".into()).unwrap();
	bobs.sort_by_key(|id| id.value());
	assert_eq!(vec![bob.id(), second_bob.id()], bobs);
	assert!(store.entities_with_value::<Name>(&"carol".into()).unwrap().is_empty());
}

#[test]
pub fn overwriting_moves_the_entity_to_the_new_key() {
	let mut store = store();

	let entity = store.create_entity();
	store.add_component(entity, Name("before".into())).unwrap();
	store.add_component(entity, Name("after".into())).unwrap();

	assert!(store.entities_with_value::<Name>(&"before".into()).unwrap().is_empty());
	assert_eq!(vec![entity.id()], store.entities_with_value::<Name>(&"after".into()).unwrap());
}

#[test]
pub fn removal_and_deletion_drop_index_entries() {
	let mut store = store();

	let removed = store.create_entity();
	store.add_component(removed, Name("removed".into())).unwrap();
	store.remove_component::<Name>(removed).unwrap();
	assert!(store.entities_with_value::<Name>(&"removed".into()).unwrap().is_empty());

	let deleted = store.create_entity();
	store.add_component(deleted, Name("deleted".into())).unwrap();
	store.delete_entity(deleted).unwrap();
	assert!(store.entities_with_value::<Name>(&"deleted".into()).unwrap().is_empty());
}

#[test]
pub fn range_lookups_come_back_in_key_order() {
	let mut store = store();

	let mut entities = Vec::new();
	for score in [40, 10, 30, 50, 20] {
		let entity = store.create_entity();
		store.add_component(entity, Score(score)).unwrap();
		entities.push((score, entity));
	}

	// Mutate after the first ordered lookup to exercise the rebuild.
	let _ = store.entities_in_range::<Score>(..).unwrap();
	store.add_component(entities[1].1, Score(45)).unwrap();
	store.delete_entity(entities[2].1).unwrap();

	let in_range = store.entities_in_range::<Score>(20..=45).unwrap();
	assert_eq!(
		vec![entities[4].1.id(), entities[0].1.id(), entities[1].1.id()],
		in_range,
		"expected ids ordered by key 20, 40, 45"
	);
}

#[test]
pub fn unique_lookups_report_misses_and_collisions() {
	let mut store = store();

	let only = store.create_entity();
	store.add_component(only, Name("only".into())).unwrap();
	assert_eq!(only, store.find_unique::<Name>(&"only".into()).unwrap());

	assert_eq!(Err(EcsError::NotFound), store.find_unique::<Name>(&"missing".into()));

	let twin = store.create_entity();
	store.add_component(twin, Name("only".into())).unwrap();
	assert_eq!(Err(EcsError::NotUnique(2)), store.find_unique::<Name>(&"only".into()));
}

#[test]
pub fn links_resolve_backwards_from_the_target() {
	let mut store = store();

	let target = store.create_entity();
	let a = store.create_entity();
	let b = store.create_entity();
	store.add_component(a, FollowTarget(target.id())).unwrap();
	store.add_component(b, FollowTarget(target.id())).unwrap();

	let mut sources = store.entities_with_value::<FollowTarget>(&target.id()).unwrap();
	sources.sort_by_key(|id| id.value());
	assert_eq!(vec![a.id(), b.id()], sources);
}

#[test]
pub fn deleting_a_link_target_strips_the_component_from_sources() {
	let mut store = store();

	let target = store.create_entity();
	let follower = store.create_entity();
	store.add_component(follower, FollowTarget(target.id())).unwrap();
	store.add_component(follower, Score(3)).unwrap();

	store.delete_entity(target).unwrap();

	assert!(store.is_alive(follower));
	assert!(!store.has_component::<FollowTarget>(follower).unwrap());
	assert_eq!(Some(&Score(3)), store.get_component::<Score>(follower).unwrap());
	assert!(store.entities_with_value::<FollowTarget>(&target.id()).unwrap().is_empty());
}
