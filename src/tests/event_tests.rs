use super::{store, Frozen, Position};
use crate::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;

fn recording_store() -> (EntityStore, Arc<Mutex<Vec<ChangeEvent>>>) {
	let mut store = store();
	let events = Arc::new(Mutex::new(Vec::new()));
	let sink = events.clone();
	store.on_change(move |_, event| sink.lock().push(*event));
	(store, events)
}

#[test]
pub fn lifecycle_changes_fire_in_order() {
	let (mut store, events) = recording_store();

	let entity = store.create_entity();
	store.add_component(entity, Position::default()).unwrap();
	store.add_tag::<Frozen>(entity).unwrap();
	store.delete_entity(entity).unwrap();

	let position = store.registry().component_id::<Position>().unwrap();
	let frozen = store.registry().tag_id::<Frozen>().unwrap();
	assert_eq!(
		vec![
			ChangeEvent::EntityCreated { entity: entity.id() },
			ChangeEvent::ComponentAdded { entity: entity.id(), component: position },
			ChangeEvent::TagAdded { entity: entity.id(), tag: frozen },
			ChangeEvent::EntityDeleted { entity: entity.id() },
		],
		*events.lock()
	);
}

#[test]
pub fn removals_fire_only_when_something_was_present() {
	let (mut store, events) = recording_store();

	let entity = store.create_entity();
	store.add_component(entity, Position::default()).unwrap();
	events.lock().clear();

	store.remove_component::<Position>(entity).unwrap();
	store.remove_component::<Position>(entity).unwrap();
	store.remove_tag::<Frozen>(entity).unwrap();

	let position = store.registry().component_id::<Position>().unwrap();
	assert_eq!(
		vec![ChangeEvent::ComponentRemoved { entity: entity.id(), component: position }],
		*events.lock()
	);
}

#[test]
pub fn overwriting_a_component_still_reports_the_add() {
	let (mut store, events) = recording_store();

	let entity = store.create_entity();
	store.add_component(entity, Position { x: 1.0, y: 1.0 }).unwrap();
	store.add_component(entity, Position { x: 2.0, y: 2.0 }).unwrap();

	let position = store.registry().component_id::<Position>().unwrap();
	let adds = events
		.lock()
		.iter()
		.filter(|e| matches!(e, ChangeEvent::ComponentAdded { component, .. } if *component == position))
		.count();
	assert_eq!(2, adds);
}

#[test]
pub fn tree_changes_report_both_endpoints() {
	let (mut store, events) = recording_store();

	let parent = store.create_entity();
	let child = store.create_entity();
	store.add_child(parent, child).unwrap();
	store.remove_child(parent, child).unwrap();

	let tree_events: Vec<ChangeEvent> = events
		.lock()
		.iter()
		.filter(|e| matches!(e, ChangeEvent::ChildAdded { .. } | ChangeEvent::ChildRemoved { .. }))
		.copied()
		.collect();
	assert_eq!(
		vec![
			ChangeEvent::ChildAdded { parent: parent.id(), child: child.id() },
			ChangeEvent::ChildRemoved { parent: parent.id(), child: child.id() },
		],
		tree_events
	);
}

#[test]
pub fn hooks_observe_the_post_change_state() {
	let mut store = store();
	let observed = Arc::new(Mutex::new(Vec::new()));
	let sink = observed.clone();
	store.on_change(move |store, event| {
		if let ChangeEvent::ComponentAdded { entity, .. } = event {
			let entity = store.entity_by_id(*entity).unwrap();
			sink.lock().push(store.get_component::<Position>(entity).unwrap().cloned());
		}
	});

	let entity = store.create_entity();
	store.add_component(entity, Position { x: 3.0, y: 4.0 }).unwrap();

	assert_eq!(vec![Some(Position { x: 3.0, y: 4.0 })], *observed.lock());
}
