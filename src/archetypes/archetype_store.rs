use crate::archetypes::{ArchetypeId, ArchetypeInstance};
use crate::data_structures::BitSet;
use crate::queries::{QueryFilter, QueryState};
use crate::schema::{ComponentId, TagId, TypeRegistry};
use log::debug;
use nohash_hasher::NoHashHasher;
use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::sync::Arc;

type EdgeHasher = BuildHasherDefault<NoHashHasher<u64>>;

/// Owns the archetype table, the bitset-identity map, the structural-change
/// edge cache and the live query states.
///
/// Identity is a bijection: the store never creates two archetypes with the
/// same (components, tags) pair. The identity map's key compares full bitsets
/// on every bucket hit, so hash collisions cannot alias distinct sets.
pub(crate) struct ArchetypeStore {
	registry: Arc<TypeRegistry>,
	archetypes: Vec<ArchetypeInstance>,
	by_identity: HashMap<(BitSet, BitSet), ArchetypeId>,
	/// Hash-consed graph edges: (archetype, single-type change) -> target.
	edges: HashMap<TransitionKey, ArchetypeId, EdgeHasher>,
	queries: Vec<QueryState>,
	/// Two component tuples with the same member set share one query state,
	/// so the cache is keyed by filter alone.
	query_cache: HashMap<QueryFilter, usize>,
}

/// One structural-change edge out of an archetype.
#[derive(Copy, Clone, Eq, PartialEq)]
pub(crate) struct TransitionKey {
	pub archetype: ArchetypeId,
	pub type_value: u16,
	pub kind: TransitionKind,
}

#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq)]
pub(crate) enum TransitionKind {
	AddComponent = 0,
	RemoveComponent = 1,
	AddTag = 2,
	RemoveTag = 3,
}

impl Hash for TransitionKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		let archetype = (self.archetype.index as u64) << 32;
		let type_value = (self.type_value as u64) << 2;
		state.write_u64(archetype | type_value | self.kind as u64);
	}
}

impl ArchetypeStore {
	pub fn new(registry: Arc<TypeRegistry>) -> Self {
		let empty = ArchetypeInstance::new(
			ArchetypeId { index: 0 },
			BitSet::new(),
			BitSet::new(),
			&registry,
		);

		Self {
			registry,
			by_identity: HashMap::from([((BitSet::new(), BitSet::new()), ArchetypeId { index: 0 })]),
			archetypes: vec![empty],
			edges: HashMap::default(),
			queries: Vec::new(),
			query_cache: HashMap::new(),
		}
	}

	#[inline(always)]
	pub fn archetype(&self, id: ArchetypeId) -> &ArchetypeInstance {
		&self.archetypes[id.index as usize]
	}

	#[inline(always)]
	pub fn archetype_mut(&mut self, id: ArchetypeId) -> &mut ArchetypeInstance {
		&mut self.archetypes[id.index as usize]
	}

	pub fn archetype_count(&self) -> usize {
		self.archetypes.len()
	}

	/// Mutable access to two distinct archetypes at once, for row moves.
	pub fn pair_mut(
		&mut self, a: ArchetypeId, b: ArchetypeId,
	) -> (&mut ArchetypeInstance, &mut ArchetypeInstance) {
		let (a, b) = (a.index as usize, b.index as usize);
		debug_assert_ne!(a, b);

		if a < b {
			let (head, tail) = self.archetypes.split_at_mut(b);
			(&mut head[a], &mut tail[0])
		} else {
			let (head, tail) = self.archetypes.split_at_mut(a);
			(&mut tail[0], &mut head[b])
		}
	}

	/// Find the archetype with the exact identity, creating it on a miss.
	///
	/// Every newly created archetype is tested once against all live queries
	/// (an O(1) bitset compare each); queries never re-scan the table.
	pub fn lookup_or_create(&mut self, components: BitSet, tags: BitSet) -> ArchetypeId {
		if let Some(id) = self.by_identity.get(&(components, tags)) {
			return *id;
		}

		let id = ArchetypeId {
			index: self.archetypes.len() as u32,
		};
		let instance = ArchetypeInstance::new(id, components, tags, &self.registry);

		for query in &mut self.queries {
			if query.filter.matches(&components, &tags) {
				query.matched.push(id.index);
			}
		}

		debug!(
			"created archetype {}: {} component types, {} tags",
			id.index,
			components.count(),
			tags.count()
		);

		self.by_identity.insert((components, tags), id);
		self.archetypes.push(instance);
		id
	}

	/// The archetype reached from `from` by a single-type change, via the
	/// edge cache.
	pub fn transition(&mut self, from: ArchetypeId, kind: TransitionKind, type_value: u16) -> ArchetypeId {
		let key = TransitionKey {
			archetype: from,
			type_value,
			kind,
		};
		if let Some(target) = self.edges.get(&key) {
			return *target;
		}

		let source = &self.archetypes[from.index as usize];
		let mut components = *source.components();
		let mut tags = *source.tags();

		match kind {
			TransitionKind::AddComponent => components.set(type_value as usize),
			TransitionKind::RemoveComponent => components.clear(type_value as usize),
			TransitionKind::AddTag => tags.set(type_value as usize),
			TransitionKind::RemoveTag => tags.clear(type_value as usize),
		}

		let target = self.lookup_or_create(components, tags);
		self.edges.insert(key, target);
		target
	}

	pub fn with_component(&mut self, from: ArchetypeId, component: ComponentId) -> ArchetypeId {
		self.transition(from, TransitionKind::AddComponent, component.value() as u16)
	}

	pub fn without_component(&mut self, from: ArchetypeId, component: ComponentId) -> ArchetypeId {
		self.transition(from, TransitionKind::RemoveComponent, component.value() as u16)
	}

	pub fn with_tag(&mut self, from: ArchetypeId, tag: TagId) -> ArchetypeId {
		self.transition(from, TransitionKind::AddTag, tag.value() as u16)
	}

	pub fn without_tag(&mut self, from: ArchetypeId, tag: TagId) -> ArchetypeId {
		self.transition(from, TransitionKind::RemoveTag, tag.value() as u16)
	}

	/// Get or create the cached query state for a filter. A new state matches
	/// against the existing table once; afterwards it is maintained
	/// incrementally by [Self::lookup_or_create].
	pub fn get_or_create_query(&mut self, filter: QueryFilter) -> usize {
		if let Some(index) = self.query_cache.get(&filter) {
			return *index;
		}

		let matched = self
			.archetypes
			.iter()
			.filter(|a| filter.matches(a.components(), a.tags()))
			.map(|a| a.id().index)
			.collect();

		let index = self.queries.len();
		self.queries.push(QueryState { filter, matched });
		self.query_cache.insert(filter, index);
		index
	}

	pub fn query_state(&self, index: usize) -> &QueryState {
		&self.queries[index]
	}
}
