use crate::archetypes::{heap_of, ComponentHeap};
use crate::data_structures::BitSet;
use crate::entities::tree::TreeNode;
use crate::errors::EcsError;
use crate::index::{index_ops, link_index_ops, make_relation_store, make_value_index, relation_ops};
use crate::schema::{Component, Disabled, IndexedComponent, LinkComponent, Relation, Tag};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Target width in bytes for vectorized section processing; sections handed to
/// parallel jobs are sized in multiples of this width per component.
const VECTOR_WIDTH: usize = 64;
const MAX_COMPONENT_MULTIPLE: usize = 64;

/// The number of ownership/linkage bits available per entity node. Each
/// indexed component and relation type occupies one slot.
pub(crate) const MAX_INDEX_SLOTS: usize = 32;

/// A stable small integer id for a registered [Component] type.
/// Id 0 is reserved as "none"; ids are assigned by [SchemaBuilder::build].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ComponentId {
	value: u16,
}

/// A stable small integer id for a registered [Tag] type. Separate id space
/// from components; id 0 is reserved as "none".
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TagId {
	value: u16,
}

/// A stable small integer id for a registered [Relation] type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RelationId {
	value: u16,
}

impl ComponentId {
	pub(crate) const fn new(value: u16) -> Self {
		Self { value }
	}

	#[inline(always)]
	pub const fn value(self) -> usize {
		self.value as usize
	}
}

impl TagId {
	pub(crate) const fn new(value: u16) -> Self {
		Self { value }
	}

	#[inline(always)]
	pub const fn value(self) -> usize {
		self.value as usize
	}
}

impl RelationId {
	#[inline(always)]
	pub const fn value(self) -> usize {
		self.value as usize
	}
}

/// Index maintenance entry points for one indexed component type, bound to
/// the concrete type at registration time.
pub(crate) struct IndexOps {
	pub insert: fn(&mut (dyn Any + Send + Sync), u32, &ComponentHeap, usize),
	pub remove: fn(&mut (dyn Any + Send + Sync), u32, &ComponentHeap, usize),
	/// Link components only: read the target entity id out of a heap row.
	pub link_target: Option<fn(&ComponentHeap, usize) -> u32>,
	/// Link components only: whether any source still references the target.
	pub contains_target: Option<fn(&(dyn Any + Send + Sync), u32) -> bool>,
	/// Link components only: the sources currently referencing the target.
	pub sources_of: Option<fn(&(dyn Any + Send + Sync), u32) -> Vec<u32>>,
}

/// Cleanup entry points for one relation type, bound at registration time.
pub(crate) struct RelationOps {
	/// Drop all relations owned by the entity; returns the targets that lost
	/// their last incoming reference of this type.
	pub remove_entity: fn(&mut (dyn Any + Send + Sync), u32) -> Vec<u32>,
	/// Drop all relations referencing the target; returns the sources left
	/// without any relation of this type.
	pub remove_incoming: fn(&mut (dyn Any + Send + Sync), u32) -> Vec<u32>,
}

/// A runtime record of a registered [Component] type.
pub struct ComponentType {
	pub(crate) id: ComponentId,
	pub(crate) name: &'static str,
	pub(crate) type_id: TypeId,
	pub(crate) byte_size: usize,
	pub(crate) multiple: usize,
	/// Ownership-bit slot; present for indexed and link components.
	pub(crate) index_slot: Option<u8>,
	pub(crate) is_link: bool,
	pub(crate) make_heap: fn(ComponentId) -> ComponentHeap,
	pub(crate) make_index: Option<fn() -> Box<dyn Any + Send + Sync>>,
	pub(crate) index_ops: Option<IndexOps>,
}

/// A runtime record of a registered [Tag] type.
pub struct TagType {
	pub(crate) id: TagId,
	pub(crate) name: &'static str,
	pub(crate) type_id: TypeId,
}

/// A runtime record of a registered [Relation] type.
pub struct RelationType {
	pub(crate) id: RelationId,
	pub(crate) name: &'static str,
	pub(crate) type_id: TypeId,
	pub(crate) index_slot: u8,
	pub(crate) is_link: bool,
	pub(crate) make_store: fn() -> Box<dyn Any + Send + Sync>,
	pub(crate) ops: RelationOps,
}

impl ComponentType {
	pub const fn id(&self) -> ComponentId {
		self.id
	}

	pub const fn name(&self) -> &'static str {
		self.name
	}

	pub const fn byte_size(&self) -> usize {
		self.byte_size
	}

	/// The section alignment multiple for parallel jobs, in elements.
	pub const fn multiple(&self) -> usize {
		self.multiple
	}
}

/// Collects component, tag and relation registrations and assigns their ids
/// in one shot. Indexed and link components are ordered before plain ones so
/// their ownership-bit slots stay in range; within a group, registration
/// order is preserved.
///
/// Registration is a single-threaded bootstrap step; registering the same
/// type twice panics.
pub struct SchemaBuilder {
	indexed: Vec<PendingComponent>,
	plain: Vec<PendingComponent>,
	tags: Vec<PendingTag>,
	relations: Vec<PendingRelation>,
	seen: HashMap<TypeId, &'static str>,
}

struct PendingComponent {
	name: &'static str,
	type_id: TypeId,
	byte_size: usize,
	is_link: bool,
	make_heap: fn(ComponentId) -> ComponentHeap,
	make_index: Option<fn() -> Box<dyn Any + Send + Sync>>,
	index_ops: Option<IndexOps>,
}

struct PendingTag {
	name: &'static str,
	type_id: TypeId,
}

struct PendingRelation {
	name: &'static str,
	type_id: TypeId,
	is_link: bool,
	make_store: fn() -> Box<dyn Any + Send + Sync>,
	ops: RelationOps,
}

impl SchemaBuilder {
	pub fn new() -> Self {
		let mut builder = Self {
			indexed: Vec::new(),
			plain: Vec::new(),
			tags: Vec::new(),
			relations: Vec::new(),
			seen: HashMap::new(),
		};

		// Built-ins: the Disabled tag always gets tag id 1, and the tree is
		// an ordinary component mutated through the regular structural path.
		builder.register_tag::<Disabled>();
		builder.register_component::<TreeNode>();
		builder
	}

	/// Register a plain component type.
	pub fn register_component<T: Component>(&mut self) -> &mut Self {
		self.claim::<T>();
		self.plain.push(PendingComponent {
			name: short_name::<T>(),
			type_id: TypeId::of::<T>(),
			byte_size: std::mem::size_of::<T>(),
			is_link: false,
			make_heap: heap_of::<T>,
			make_index: None,
			index_ops: None,
		});
		self
	}

	/// Register a component whose value is mirrored into a [ValueIndex](crate::index::ValueIndex).
	pub fn register_indexed<T: IndexedComponent>(&mut self) -> &mut Self {
		self.claim::<T>();
		self.indexed.push(PendingComponent {
			name: short_name::<T>(),
			type_id: TypeId::of::<T>(),
			byte_size: std::mem::size_of::<T>(),
			is_link: false,
			make_heap: heap_of::<T>,
			make_index: Some(make_value_index::<T>),
			index_ops: Some(index_ops::<T>()),
		});
		self
	}

	/// Register a component holding a non-owning reference to another entity.
	pub fn register_link<T: LinkComponent>(&mut self) -> &mut Self {
		self.claim::<T>();
		self.indexed.push(PendingComponent {
			name: short_name::<T>(),
			type_id: TypeId::of::<T>(),
			byte_size: std::mem::size_of::<T>(),
			is_link: true,
			make_heap: heap_of::<T>,
			make_index: Some(make_value_index::<T>),
			index_ops: Some(link_index_ops::<T>()),
		});
		self
	}

	/// Register a tag type.
	pub fn register_tag<T: Tag>(&mut self) -> &mut Self {
		self.claim::<T>();
		self.tags.push(PendingTag {
			name: short_name::<T>(),
			type_id: TypeId::of::<T>(),
		});
		self
	}

	/// Register a relation type.
	pub fn register_relation<R: Relation>(&mut self) -> &mut Self {
		self.claim::<R>();
		self.relations.push(PendingRelation {
			name: short_name::<R>(),
			type_id: TypeId::of::<R>(),
			is_link: false,
			make_store: make_relation_store::<R>,
			ops: relation_ops::<R>(),
		});
		self
	}

	/// Register a relation type whose values reference target entities.
	pub fn register_link_relation<R: Relation>(&mut self) -> &mut Self {
		self.claim::<R>();
		self.relations.push(PendingRelation {
			name: short_name::<R>(),
			type_id: TypeId::of::<R>(),
			is_link: true,
			make_store: make_relation_store::<R>,
			ops: relation_ops::<R>(),
		});
		self
	}

	/// Assign ids and freeze the registry.
	pub fn build(self) -> Arc<TypeRegistry> {
		let slot_count = self.indexed.len() + self.relations.len();
		assert!(
			slot_count <= MAX_INDEX_SLOTS,
			"at most {MAX_INDEX_SLOTS} indexed component and relation types are supported"
		);

		// Ids are 1-based bit indices into fixed-width identity sets.
		let component_count = self.indexed.len() + self.plain.len();
		assert!(
			component_count < BitSet::CAPACITY,
			"at most {} component types are supported",
			BitSet::CAPACITY - 1
		);
		assert!(
			self.tags.len() < BitSet::CAPACITY,
			"at most {} tag types are supported",
			BitSet::CAPACITY - 1
		);

		let mut components = Vec::with_capacity(self.indexed.len() + self.plain.len());
		let mut by_type = HashMap::new();
		let mut by_name = HashMap::new();
		let mut slot = 0u8;

		for pending in self.indexed.into_iter().chain(self.plain) {
			let id = ComponentId { value: components.len() as u16 + 1 };
			let index_slot = pending.make_index.is_some().then(|| {
				let s = slot;
				slot += 1;
				s
			});

			by_type.insert(pending.type_id, id);
			by_name.insert(pending.name, id);
			components.push(ComponentType {
				id,
				name: pending.name,
				type_id: pending.type_id,
				byte_size: pending.byte_size,
				multiple: component_multiple(pending.byte_size),
				index_slot,
				is_link: pending.is_link,
				make_heap: pending.make_heap,
				make_index: pending.make_index,
				index_ops: pending.index_ops,
			});
		}

		let mut tags = Vec::with_capacity(self.tags.len());
		let mut tag_by_type = HashMap::new();
		let mut tag_by_name = HashMap::new();
		for pending in self.tags {
			let id = TagId { value: tags.len() as u16 + 1 };
			tag_by_type.insert(pending.type_id, id);
			tag_by_name.insert(pending.name, id);
			tags.push(TagType {
				id,
				name: pending.name,
				type_id: pending.type_id,
			});
		}

		let mut relations = Vec::with_capacity(self.relations.len());
		let mut relation_by_type = HashMap::new();
		for pending in self.relations {
			let id = RelationId { value: relations.len() as u16 + 1 };
			relation_by_type.insert(pending.type_id, id);
			relations.push(RelationType {
				id,
				name: pending.name,
				type_id: pending.type_id,
				index_slot: {
					let s = slot;
					slot += 1;
					s
				},
				is_link: pending.is_link,
				make_store: pending.make_store,
				ops: pending.ops,
			});
		}

		let tree_node = by_type[&TypeId::of::<TreeNode>()];
		Arc::new(TypeRegistry {
			components,
			tags,
			relations,
			by_type,
			by_name,
			tag_by_type,
			tag_by_name,
			relation_by_type,
			tree_node,
		})
	}

	fn claim<T: 'static>(&mut self) {
		let previous = self.seen.insert(TypeId::of::<T>(), short_name::<T>());
		assert!(
			previous.is_none(),
			"type {} was already registered",
			short_name::<T>()
		);
	}
}

impl Default for SchemaBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// The immutable set of registered types. Built once by [SchemaBuilder];
/// shared between the store, batches and command buffers via [Arc].
pub struct TypeRegistry {
	components: Vec<ComponentType>,
	tags: Vec<TagType>,
	relations: Vec<RelationType>,
	by_type: HashMap<TypeId, ComponentId>,
	by_name: HashMap<&'static str, ComponentId>,
	tag_by_type: HashMap<TypeId, TagId>,
	tag_by_name: HashMap<&'static str, TagId>,
	relation_by_type: HashMap<TypeId, RelationId>,
	pub(crate) tree_node: ComponentId,
}

impl TypeRegistry {
	/// The id assigned to the component type `T`.
	pub fn component_id<T: Component>(&self) -> Result<ComponentId, EcsError> {
		self.by_type
			.get(&TypeId::of::<T>())
			.copied()
			.ok_or_else(|| EcsError::UnknownComponent(short_name::<T>().to_owned()))
	}

	/// The id assigned to the tag type `T`.
	pub fn tag_id<T: Tag>(&self) -> Result<TagId, EcsError> {
		self.tag_by_type
			.get(&TypeId::of::<T>())
			.copied()
			.ok_or_else(|| EcsError::UnknownTag(short_name::<T>().to_owned()))
	}

	/// The id assigned to the relation type `R`.
	pub fn relation_id<R: Relation>(&self) -> Result<RelationId, EcsError> {
		self.relation_by_type
			.get(&TypeId::of::<R>())
			.copied()
			.ok_or_else(|| EcsError::UnknownRelation(short_name::<R>().to_owned()))
	}

	pub fn component_by_name(&self, name: &str) -> Option<&ComponentType> {
		self.by_name.get(name).map(|id| self.component(*id))
	}

	pub fn tag_by_name(&self, name: &str) -> Option<&TagType> {
		self.tag_by_name.get(name).map(|id| self.tag(*id))
	}

	pub fn component(&self, id: ComponentId) -> &ComponentType {
		&self.components[id.value() - 1]
	}

	pub fn tag(&self, id: TagId) -> &TagType {
		&self.tags[id.value() - 1]
	}

	pub(crate) fn relation(&self, id: RelationId) -> &RelationType {
		&self.relations[id.value() - 1]
	}

	pub fn component_count(&self) -> usize {
		self.components.len()
	}

	pub fn tag_count(&self) -> usize {
		self.tags.len()
	}

	pub(crate) fn components(&self) -> &[ComponentType] {
		&self.components
	}

	pub(crate) fn relations(&self) -> &[RelationType] {
		&self.relations
	}

	pub(crate) fn tag_name(&self, id: TagId) -> &'static str {
		self.tag(id).name
	}

	/// Tag id of the built-in [Disabled] tag.
	pub(crate) fn disabled_tag(&self) -> TagId {
		TagId { value: 1 }
	}
}

/// The section alignment multiple for a component: the smallest element count
/// whose byte span is a whole number of vector widths. Falls back to 1 for
/// sizes that would demand an excessive multiple.
pub(crate) fn component_multiple(byte_size: usize) -> usize {
	if byte_size == 0 {
		return 1;
	}
	let multiple = lcm(byte_size, VECTOR_WIDTH) / byte_size;
	if multiple > MAX_COMPONENT_MULTIPLE {
		1
	} else {
		multiple
	}
}

fn lcm(a: usize, b: usize) -> usize {
	a / gcd(a, b) * b
}

fn gcd(mut a: usize, mut b: usize) -> usize {
	while b != 0 {
		(a, b) = (b, a % b);
	}
	a
}

pub(crate) fn short_name<T>() -> &'static str {
	let name = type_name::<T>();
	match name.rsplit("::").next() {
		Some(short) => short,
		None => name,
	}
}
