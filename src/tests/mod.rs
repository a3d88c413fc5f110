mod entity_tests;
mod event_tests;
mod id_set_tests;
mod index_tests;
mod relation_tests;
mod schema_tests;
mod tree_tests;

use crate::prelude::*;
use std::sync::Arc;

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Position {
	pub x: f32,
	pub y: f32,
}

impl Component for Position {}

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Velocity {
	pub x: f32,
	pub y: f32,
}

impl Component for Velocity {}

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Health(pub i32);

impl Component for Health {}

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Name(pub String);

impl Component for Name {}

impl IndexedComponent for Name {
	type Key = String;

	fn key(&self) -> String {
		self.0.clone()
	}
}

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Score(pub i32);

impl Component for Score {}

impl IndexedComponent for Score {
	type Key = i32;

	fn key(&self) -> i32 {
		self.0
	}
}

#[derive(Clone, Default, Debug, PartialEq)]
pub struct FollowTarget(pub EntityId);

impl Component for FollowTarget {}

impl IndexedComponent for FollowTarget {
	type Key = EntityId;

	fn key(&self) -> EntityId {
		self.0
	}
}

impl LinkComponent for FollowTarget {
	fn target(&self) -> EntityId {
		self.0
	}
}

#[derive(Default)]
pub struct Frozen;

impl Tag for Frozen {}

#[derive(Default)]
pub struct Player;

impl Tag for Player {}

#[derive(Clone, Debug, PartialEq)]
pub struct Likes {
	pub target: EntityId,
	pub amount: i32,
}

impl Relation for Likes {
	type Key = EntityId;

	fn key(&self) -> EntityId {
		self.target
	}

	fn link_target(&self) -> Option<EntityId> {
		Some(self.target)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct InventorySlot {
	pub slot: u8,
	pub item: &'static str,
}

impl Relation for InventorySlot {
	type Key = u8;

	fn key(&self) -> u8 {
		self.slot
	}
}

pub fn registry() -> Arc<TypeRegistry> {
	let mut builder = SchemaBuilder::new();
	builder
		.register_component::<Position>()
		.register_component::<Velocity>()
		.register_component::<Health>()
		.register_indexed::<Name>()
		.register_indexed::<Score>()
		.register_link::<FollowTarget>()
		.register_tag::<Frozen>()
		.register_tag::<Player>()
		.register_relation::<InventorySlot>()
		.register_link_relation::<Likes>();
	builder.build()
}

pub fn store() -> EntityStore {
	EntityStore::new(registry())
}
