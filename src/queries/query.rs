use crate::archetypes::ArchetypeId;
use crate::data_structures::BitSet;
use crate::entities::{EntityId, EntityStore};
use crate::errors::EcsError;
use crate::jobs::{section_length, JobRunner};
use crate::queries::{ComponentTuple, Signature};
use crate::schema::{Component, IndexedComponent, Tag};
use std::marker::PhantomData;
use std::ops::RangeBounds;

/// The archetype-matching predicate of a query: required and excluded
/// component sets, required and excluded tag sets.
///
/// Archetypes carrying the built-in [Disabled](crate::schema::Disabled) tag
/// are excluded unless the query opts in.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct QueryFilter {
	pub(crate) required: BitSet,
	pub(crate) excluded: BitSet,
	pub(crate) required_tags: BitSet,
	pub(crate) excluded_tags: BitSet,
}

impl QueryFilter {
	pub(crate) fn matches(&self, components: &BitSet, tags: &BitSet) -> bool {
		components.is_superset_of(&self.required)
			&& components.is_disjoint_from(&self.excluded)
			&& tags.is_superset_of(&self.required_tags)
			&& tags.is_disjoint_from(&self.excluded_tags)
	}
}

/// A filter plus the archetypes it matched, maintained incrementally as
/// archetypes are created.
pub(crate) struct QueryState {
	pub filter: QueryFilter,
	pub matched: Vec<u32>,
}

/// A cached, incrementally-maintained view over every entity carrying the
/// component tuple `T`.
///
/// Distinct queries with the same filter share one matched-archetype list;
/// resolving a query a second time costs a single cache lookup. Structural
/// changes are impossible while a query is alive since it holds the store
/// mutably; use a [CommandBuffer](crate::batch::CommandBuffer) to defer them.
pub struct Query<'s, T: ComponentTuple> {
	store: &'s mut EntityStore,
	signature: Signature,
	filter: QueryFilter,
	state: Option<usize>,
	_marker: PhantomData<fn() -> T>,
}

impl EntityStore {
	/// Query the entities carrying all components of the tuple `T`.
	pub fn query<T: ComponentTuple>(&mut self) -> Result<Query<'_, T>, EcsError> {
		let signature = T::signature(&self.registry)?;

		let mut excluded_tags = BitSet::new();
		excluded_tags.set(self.registry.disabled_tag().value());

		Ok(Query {
			signature,
			filter: QueryFilter {
				required: signature.required_bits(),
				excluded: BitSet::new(),
				required_tags: BitSet::new(),
				excluded_tags,
			},
			state: None,
			store: self,
			_marker: PhantomData,
		})
	}
}

impl<'s, T: ComponentTuple> Query<'s, T> {
	/// Require a component type beyond the tuple members.
	pub fn with_component<C: Component>(mut self) -> Result<Self, EcsError> {
		let component = self.store.registry.component_id::<C>()?;
		self.filter.required.set(component.value());
		self.state = None;
		Ok(self)
	}

	/// Exclude archetypes carrying the component type.
	pub fn without_component<C: Component>(mut self) -> Result<Self, EcsError> {
		let component = self.store.registry.component_id::<C>()?;
		self.filter.excluded.set(component.value());
		self.state = None;
		Ok(self)
	}

	/// Require a tag.
	pub fn with_tag<G: Tag>(mut self) -> Result<Self, EcsError> {
		let tag = self.store.registry.tag_id::<G>()?;
		self.filter.required_tags.set(tag.value());
		self.state = None;
		Ok(self)
	}

	/// Exclude archetypes carrying the tag.
	pub fn without_tag<G: Tag>(mut self) -> Result<Self, EcsError> {
		let tag = self.store.registry.tag_id::<G>()?;
		self.filter.excluded_tags.set(tag.value());
		self.state = None;
		Ok(self)
	}

	/// Include entities carrying the built-in
	/// [Disabled](crate::schema::Disabled) tag.
	pub fn with_disabled(mut self) -> Self {
		self.filter.excluded_tags.clear(self.store.registry.disabled_tag().value());
		self.state = None;
		self
	}

	/// Visit every non-empty matched archetype as zero-copy column slices
	/// plus the parallel entity-id row. Restartable; call again to rewind.
	pub fn chunks(&mut self, mut f: impl for<'a> FnMut(T::Slices<'a>, &'a [EntityId])) {
		let signature = self.signature;
		for index in self.matched() {
			let archetype = self.store.archetypes.archetype_mut(ArchetypeId { index });
			let len = archetype.len();
			if len == 0 {
				continue;
			}
			let ids = archetype.entity_ids().as_ptr();
			let slices = T::slices(archetype, &signature);
			// Entity ids live beside the columns and are not aliased by them.
			let ids = unsafe { std::slice::from_raw_parts(ids, len) };
			f(slices, ids);
		}
	}

	/// Run `f` over every matched row.
	pub fn for_each(&mut self, mut f: impl for<'a> FnMut(T::Refs<'a>)) {
		let signature = self.signature;
		for index in self.matched() {
			let archetype = self.store.archetypes.archetype_mut(ArchetypeId { index });
			let len = archetype.len();
			if len == 0 {
				continue;
			}
			let slices = T::slices(archetype, &signature);
			T::for_each_in(slices, len, &mut f);
		}
	}

	/// Run `f` over every matched row together with the row's entity id.
	pub fn for_each_entity(&mut self, mut f: impl for<'a> FnMut(EntityId, T::Refs<'a>)) {
		let signature = self.signature;
		for index in self.matched() {
			let archetype = self.store.archetypes.archetype_mut(ArchetypeId { index });
			let len = archetype.len();
			if len == 0 {
				continue;
			}
			let ids = archetype.entity_ids().as_ptr();
			let slices = T::slices(archetype, &signature);
			let ids = unsafe { std::slice::from_raw_parts(ids, len) };
			T::for_each_with_ids(slices, ids, &mut f);
		}
	}

	/// Sequential row execution; the single-threaded counterpart of
	/// [Self::run_parallel].
	pub fn run(&mut self, f: impl for<'a> FnMut(T::Refs<'a>)) {
		self.for_each(f);
	}

	/// Run `f` over every matched row, fanning large archetypes out across
	/// the runner's workers.
	///
	/// An archetype shorter than `min_section_length * (workers + 1)` runs
	/// inline on the caller. Longer ones split into `workers + 1` sections
	/// whose lengths are rounded to the tuple's component multiple; the
	/// caller runs the last section and blocks until all sections finished.
	pub fn run_parallel(&mut self, runner: &JobRunner, f: impl for<'a> Fn(T::Refs<'a>) + Send + Sync) {
		let signature = self.signature;
		let task_count = runner.worker_count() + 1;

		for index in self.matched() {
			let archetype = self.store.archetypes.archetype_mut(ArchetypeId { index });
			let len = archetype.len();
			if len == 0 {
				continue;
			}

			if runner.worker_count() == 0 || len < runner.min_section_length() * task_count {
				let slices = T::slices(archetype, &signature);
				T::for_each_in(slices, len, &mut |refs| f(refs));
				continue;
			}

			let ptrs = T::ptrs(archetype, &signature);
			let section = section_length(len, task_count, signature.multiple());
			let sections = (len + section - 1) / section;

			runner.scatter(sections, &|section_index| {
				let start = section_index * section;
				let count = section.min(len - start);
				// Sections are disjoint row ranges of columns that stay in
				// place until scatter returns.
				unsafe { T::for_each_raw(ptrs, start, count, &f) };
			});
		}
	}

	/// The matched entity ids, flattened in archetype registration order.
	pub fn entities(&mut self) -> Vec<EntityId> {
		let mut ids = Vec::new();
		for index in self.matched() {
			ids.extend_from_slice(
				self.store.archetypes.archetype(ArchetypeId { index }).entity_ids(),
			);
		}
		ids
	}

	/// The number of matched entities.
	pub fn count(&mut self) -> usize {
		self.matched()
			.into_iter()
			.map(|index| self.store.archetypes.archetype(ArchetypeId { index }).len())
			.sum()
	}

	/// The matched entities whose indexed component `V` carries exactly this
	/// key: the candidate set comes from the value index and is narrowed to
	/// this query's archetypes, with no scan.
	pub fn entities_with_value<V: IndexedComponent>(
		&mut self, key: &V::Key,
	) -> Result<Vec<EntityId>, EcsError> {
		let state = self.state();
		let index = self.store.value_index::<V>()?;
		let candidates = index.entities_with(key);
		let matched = &self.store.archetypes.query_state(state).matched;
		Ok(candidates
			.iter()
			.filter(|id| matched.contains(&self.store.nodes[**id as usize].archetype))
			.map(|id| EntityId::new(*id))
			.collect())
	}

	/// The matched entities whose indexed key falls within the range,
	/// ascending by key.
	pub fn entities_in_range<V: IndexedComponent>(
		&mut self, range: impl RangeBounds<V::Key>,
	) -> Result<Vec<EntityId>, EcsError> {
		let state = self.state();
		let candidates = self.store.value_index_mut::<V>()?.entities_in_range(range);
		let matched = &self.store.archetypes.query_state(state).matched;
		Ok(candidates
			.into_iter()
			.filter(|id| matched.contains(&self.store.nodes[*id as usize].archetype))
			.map(EntityId::new)
			.collect())
	}

	fn state(&mut self) -> usize {
		match self.state {
			Some(index) => index,
			None => {
				let index = self.store.archetypes.get_or_create_query(self.filter);
				self.state = Some(index);
				index
			},
		}
	}

	fn matched(&mut self) -> Vec<u32> {
		let state = self.state();
		self.store.archetypes.query_state(state).matched.clone()
	}
}
