use std::fmt;

pub(crate) const NO_ARCHETYPE: u32 = u32::MAX;
pub(crate) const NO_PARENT: u32 = 0;

/// The raw numeric id of an entity within its store. Id 0 is reserved.
///
/// An id alone cannot detect staleness; use [Entity] handles wherever a
/// deleted-and-recycled id must be told apart from its predecessor.
#[derive(Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct EntityId {
	value: u32,
}

impl EntityId {
	pub(crate) const fn new(value: u32) -> Self {
		Self { value }
	}

	#[inline(always)]
	pub const fn value(self) -> u32 {
		self.value
	}
}

impl fmt::Display for EntityId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.value)
	}
}

/// A lightweight handle to an entity: id plus the revision observed when the
/// handle was created, plus the owning store's id.
///
/// The handle stays valid across structural changes and goes stale when the
/// entity is deleted, even if the id is later recycled. Staleness and
/// foreign-store use are detected on every store operation taking a handle.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Entity {
	pub(crate) id: EntityId,
	pub(crate) revision: u32,
	pub(crate) store: u32,
}

impl Entity {
	#[inline(always)]
	pub const fn id(self) -> EntityId {
		self.id
	}
}

impl fmt::Display for Entity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.id)
	}
}

/// Per-id record resolving an entity to its archetype and row.
///
/// `archetype == NO_ARCHETYPE` marks a dead slot; `revision` increments on
/// every deletion so recycled ids invalidate old handles. The bit masks track
/// which secondary indexes and relation stores hold entries for this entity,
/// routing deletion cleanup without scanning every index.
#[derive(Copy, Clone)]
pub(crate) struct EntityNode {
	pub archetype: u32,
	pub row: u32,
	pub revision: u32,
	/// One bit per index slot: this entity owns an entry (indexed component
	/// value or outgoing relation).
	pub owner_bits: u32,
	/// One bit per index slot: some other entity's link or relation targets
	/// this entity.
	pub linked_bits: u32,
}

impl EntityNode {
	pub const fn dead() -> Self {
		Self {
			archetype: NO_ARCHETYPE,
			row: 0,
			revision: 0,
			owner_bits: 0,
			linked_bits: 0,
		}
	}

	#[inline(always)]
	pub fn is_alive(&self) -> bool {
		self.archetype != NO_ARCHETYPE
	}
}
