use crate::entities::{Entity, EntityId, EntityStore};
use crate::errors::EcsError;
use crate::schema::{ComponentId, TagId};
use std::any::Any;

/// An entity converted to a name-keyed form at the serialization boundary.
///
/// Component values are boxed clones keyed by the registered type name; the
/// actual wire encoding lives outside the store. Children are raw ids so a
/// hierarchy can be rebuilt after all of its entities were imported.
pub struct DataEntity {
	pub id: EntityId,
	pub components: Vec<(String, Box<dyn Any + Send + Sync>)>,
	pub tags: Vec<String>,
	pub children: Vec<EntityId>,
}

impl EntityStore {
	/// Clone the entity into its name-keyed form.
	pub fn export_entity(&self, entity: Entity) -> Result<DataEntity, EcsError> {
		let id = self.validate(entity)?;
		let (archetype, row) = self.location(id);
		let archetype = self.archetypes.archetype(archetype);

		let mut components = Vec::new();
		for component in archetype.components().iter() {
			let component = ComponentId::new(component as u16);
			if component == self.registry.tree_node {
				continue;
			}
			let meta = self.registry.component(component);
			let value = archetype.heap(component).unwrap().read_boxed(row);
			components.push((meta.name().to_owned(), value));
		}

		let tags = archetype
			.tags()
			.iter()
			.map(|tag| self.registry.tag_name(TagId::new(tag as u16)).to_owned())
			.collect();

		Ok(DataEntity {
			id: entity.id,
			components,
			tags,
			children: self.child_ids(entity)?,
		})
	}

	/// Create an entity from its name-keyed form.
	///
	/// The id is honored when non-zero. Component names must be registered and
	/// the boxed values must match the registered types. Children are attached
	/// for ids that are alive at import time; import hierarchies bottom-up or
	/// pre-create the ids to keep every edge.
	pub fn import_entity(&mut self, data: DataEntity) -> Result<Entity, EcsError> {
		let entity = match data.id.value() {
			0 => self.create_entity(),
			id => self.create_entity_with_id(id)?,
		};
		let id = entity.id.value();

		for (name, value) in data.components {
			let (component, type_id) = match self.registry.component_by_name(&name) {
				None => return Err(EcsError::UnknownComponent(name)),
				Some(meta) => (meta.id(), meta.type_id),
			};
			if (*value).type_id() != type_id {
				return Err(EcsError::UnknownComponent(name));
			}
			self.add_component_boxed(id, component, value);
		}

		for name in data.tags {
			let tag = match self.registry.tag_by_name(&name) {
				None => return Err(EcsError::UnknownTag(name)),
				Some(meta) => meta.id,
			};
			self.add_tag_id(id, tag);
		}

		for child in data.children {
			if let Some(child) = self.entity_by_id(child) {
				self.add_child(entity, child)?;
			}
		}
		Ok(entity)
	}
}
