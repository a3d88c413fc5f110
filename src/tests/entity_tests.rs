use super::{store, Frozen, Health, Player, Position, Velocity};
use crate::EcsError;

#[test]
pub fn created_entities_are_alive_and_distinct() {
	let mut store = store();

	let a = store.create_entity();
	let b = store.create_entity();

	assert_ne!(a.id(), b.id());
	assert!(store.is_alive(a));
	assert!(store.is_alive(b));
	assert_eq!(2, store.entity_count());
}

#[test]
pub fn deleted_handles_go_stale_even_after_id_reuse() {
	let mut store = store();

	let a = store.create_entity();
	let id = a.id();
	store.delete_entity(a).unwrap();
	assert!(!store.is_alive(a));

	// The free list hands the same id back with a bumped revision.
	let b = store.create_entity();
	assert_eq!(id, b.id());
	assert!(store.is_alive(b));
	assert!(!store.is_alive(a));
	assert_eq!(
		Err(EcsError::StaleEntity(id)),
		store.get_component::<Position>(a).map(|_| ())
	);
}

#[test]
pub fn explicit_ids_are_honored_and_guarded() {
	let mut store = store();

	assert_eq!(
		Err(EcsError::InvalidEntityId(0)),
		store.create_entity_with_id(0).map(|_| ())
	);

	let a = store.create_entity_with_id(5).unwrap();
	assert_eq!(5, a.id().value());
	assert_eq!(
		Err(EcsError::IdInUse(a.id())),
		store.create_entity_with_id(5).map(|_| ())
	);

	// The skipped ids become allocatable.
	let mut ids: Vec<u32> = (0..4).map(|_| store.create_entity().id().value()).collect();
	ids.sort_unstable();
	assert_eq!(vec![1, 2, 3, 4], ids);
}

#[test]
pub fn entity_by_id_resolves_live_entities_only() {
	let mut store = store();

	let a = store.create_entity();
	assert_eq!(Some(a), store.entity_by_id(a.id()));

	store.delete_entity(a).unwrap();
	assert_eq!(None, store.entity_by_id(a.id()));
}

#[test]
pub fn handles_are_rejected_by_foreign_stores() {
	let mut a = store();
	let b = store();

	let entity = a.create_entity();
	assert_eq!(
		Err(EcsError::ForeignEntity(entity.id())),
		b.get_component::<Position>(entity).map(|_| ())
	);
}

#[test]
pub fn adding_a_component_moves_the_entity_once() {
	let mut store = store();
	let entity = store.create_entity();
	let before = store.archetype_count();

	let added = store.add_component(entity, Position { x: 1.0, y: 2.0 }).unwrap();
	assert!(added);
	assert_eq!(before + 1, store.archetype_count());
	assert_eq!(
		Some(&Position { x: 1.0, y: 2.0 }),
		store.get_component::<Position>(entity).unwrap()
	);
}

#[test]
pub fn redundant_add_overwrites_in_place() {
	let mut store = store();
	let entity = store.create_entity();
	store.add_component(entity, Position { x: 1.0, y: 2.0 }).unwrap();
	let archetypes = store.archetype_count();

	let added = store.add_component(entity, Position { x: 3.0, y: 4.0 }).unwrap();
	assert!(!added);
	assert_eq!(archetypes, store.archetype_count());
	assert_eq!(
		Some(&Position { x: 3.0, y: 4.0 }),
		store.get_component::<Position>(entity).unwrap()
	);
}

#[test]
pub fn removing_a_component_returns_to_the_original_archetype() {
	let mut store = store();
	let entity = store.create_entity();

	store.add_component(entity, Position::default()).unwrap();
	let with_position = store.archetype_count();
	assert!(store.remove_component::<Position>(entity).unwrap());
	assert!(!store.remove_component::<Position>(entity).unwrap());
	assert!(!store.has_component::<Position>(entity).unwrap());

	// The round trip reuses both archetypes.
	store.add_component(entity, Position::default()).unwrap();
	assert_eq!(with_position, store.archetype_count());
}

#[test]
pub fn swap_remove_keeps_survivor_rows_resolvable() {
	let mut store = store();

	let entities: Vec<_> = (0..3)
		.map(|i| {
			let entity = store.create_entity();
			store.add_component(entity, Health(i)).unwrap();
			store.add_component(entity, Velocity::default()).unwrap();
			entity
		})
		.collect();

	// Deleting the first row swaps the last row into its place.
	store.delete_entity(entities[0]).unwrap();

	assert_eq!(Some(&Health(1)), store.get_component::<Health>(entities[1]).unwrap());
	assert_eq!(Some(&Health(2)), store.get_component::<Health>(entities[2]).unwrap());
}

#[test]
pub fn tags_affect_identity_but_carry_no_data() {
	let mut store = store();
	let entity = store.create_entity();
	let before = store.archetype_count();

	assert!(store.add_tag::<Frozen>(entity).unwrap());
	assert!(!store.add_tag::<Frozen>(entity).unwrap());
	assert!(store.has_tag::<Frozen>(entity).unwrap());
	assert_eq!(before + 1, store.archetype_count());

	assert!(store.remove_tag::<Frozen>(entity).unwrap());
	assert!(!store.remove_tag::<Frozen>(entity).unwrap());
	assert!(!store.has_tag::<Frozen>(entity).unwrap());
}

#[test]
pub fn tag_only_difference_means_distinct_archetypes() {
	let mut store = store();

	let plain = store.create_entity();
	let tagged = store.create_entity();
	store.add_component(plain, Position::default()).unwrap();
	let before = store.archetype_count();
	store.add_component(tagged, Position::default()).unwrap();
	assert_eq!(before, store.archetype_count());

	store.add_tag::<Player>(tagged).unwrap();
	assert_eq!(before + 1, store.archetype_count());
}

#[test]
pub fn disable_hides_and_enable_restores() {
	let mut store = store();
	let entity = store.create_entity();
	store.add_component(entity, Position::default()).unwrap();

	assert!(store.disable(entity).unwrap());
	assert!(store.is_disabled(entity).unwrap());
	assert_eq!(0, store.query::<(Position,)>().unwrap().count());

	assert!(store.enable(entity).unwrap());
	assert!(!store.is_disabled(entity).unwrap());
	assert_eq!(1, store.query::<(Position,)>().unwrap().count());
}

#[test]
pub fn get_component_mut_updates_in_place() {
	let mut store = store();
	let entity = store.create_entity();
	store.add_component(entity, Health(1)).unwrap();

	store.get_component_mut::<Health>(entity).unwrap().unwrap().0 = 7;
	assert_eq!(Some(&Health(7)), store.get_component::<Health>(entity).unwrap());
}
