use crate::schema::{Relation, RelationOps};
use nohash_hasher::NoHashHasher;
use std::any::Any;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;

type Erased = dyn Any + Send + Sync;
type IdMap<V> = HashMap<u32, V, BuildHasherDefault<NoHashHasher<u32>>>;

/// Per-entity multi-valued relations of one type.
///
/// An entity holds at most one value per distinct key; a second add with the
/// same key replaces the first. For link relations the store also keeps the
/// reverse target -> sources map, one entry per relation instance, feeding
/// deletion cleanup.
pub(crate) struct RelationStore<R: Relation> {
	outgoing: IdMap<Vec<R>>,
	incoming: IdMap<Vec<u32>>,
}

pub(crate) struct RelationAdd {
	/// A value with the same key was replaced.
	pub replaced: bool,
	/// The replaced value's target, when it lost its last incoming reference.
	pub freed_target: Option<u32>,
}

pub(crate) struct RelationRemove {
	/// The removed value was the entity's last relation of this type.
	pub last_for_source: bool,
	pub freed_target: Option<u32>,
}

impl<R: Relation> RelationStore<R> {
	pub fn new() -> Self {
		Self {
			outgoing: IdMap::default(),
			incoming: IdMap::default(),
		}
	}

	pub fn values(&self, source: u32) -> &[R] {
		match self.outgoing.get(&source) {
			None => &[],
			Some(values) => values,
		}
	}

	pub fn get(&self, source: u32, key: &R::Key) -> Option<&R> {
		self.values(source).iter().find(|value| value.key() == *key)
	}

	/// The distinct entities holding a relation targeting `target`.
	pub fn sources_of(&self, target: u32) -> Vec<u32> {
		let mut sources = match self.incoming.get(&target) {
			None => return Vec::new(),
			Some(entries) => entries.clone(),
		};
		sources.sort_unstable();
		sources.dedup();
		sources
	}

	pub fn add(&mut self, source: u32, value: R) -> RelationAdd {
		let key = value.key();
		let new_target = value.link_target().map(|t| t.value());

		let values = self.outgoing.entry(source).or_default();
		let old = match values.iter_mut().find(|v| v.key() == key) {
			Some(slot) => Some(std::mem::replace(slot, value)),
			None => {
				values.push(value);
				None
			},
		};

		if let Some(target) = new_target {
			self.incoming.entry(target).or_default().push(source);
		}

		// The new reference is recorded first, so replacing a value that kept
		// the same target never reports it freed.
		let mut freed_target = None;
		if let Some(old_target) = old.as_ref().and_then(|v| v.link_target()) {
			freed_target = self.drop_incoming_entry(old_target.value(), source);
		}

		RelationAdd {
			replaced: old.is_some(),
			freed_target,
		}
	}

	pub fn remove(&mut self, source: u32, key: &R::Key) -> Option<RelationRemove> {
		let values = self.outgoing.get_mut(&source)?;
		let position = values.iter().position(|v| v.key() == *key)?;
		let removed = values.swap_remove(position);

		let last_for_source = values.is_empty();
		if last_for_source {
			self.outgoing.remove(&source);
		}

		let freed_target = match removed.link_target() {
			None => None,
			Some(target) => self.drop_incoming_entry(target.value(), source),
		};

		Some(RelationRemove {
			last_for_source,
			freed_target,
		})
	}

	/// Drop every relation held by `source`. Returns the targets that lost
	/// their last incoming reference of this type.
	pub fn remove_entity(&mut self, source: u32) -> Vec<u32> {
		let Some(values) = self.outgoing.remove(&source) else {
			return Vec::new();
		};

		let mut freed = Vec::new();
		for value in values {
			if let Some(target) = value.link_target() {
				if let Some(target) = self.drop_incoming_entry(target.value(), source) {
					freed.push(target);
				}
			}
		}
		freed
	}

	/// Drop every relation targeting `target`. Returns the sources left
	/// without any relation of this type.
	pub fn remove_incoming(&mut self, target: u32) -> Vec<u32> {
		let Some(mut sources) = self.incoming.remove(&target) else {
			return Vec::new();
		};
		sources.sort_unstable();
		sources.dedup();

		let mut emptied = Vec::new();
		for source in sources {
			let Some(values) = self.outgoing.get_mut(&source) else {
				continue;
			};
			values.retain(|v| v.link_target().map(|t| t.value()) != Some(target));
			if values.is_empty() {
				self.outgoing.remove(&source);
				emptied.push(source);
			}
		}
		emptied
	}

	/// Remove one incoming entry for the (target, source) pair; returns the
	/// target when its entry list became empty.
	fn drop_incoming_entry(&mut self, target: u32, source: u32) -> Option<u32> {
		let entries = self.incoming.get_mut(&target)?;
		if let Some(position) = entries.iter().position(|s| *s == source) {
			entries.swap_remove(position);
		}
		if entries.is_empty() {
			self.incoming.remove(&target);
			Some(target)
		} else {
			None
		}
	}
}

/// Store factory registered with a relation's
/// [RelationType](crate::schema::RelationType).
pub(crate) fn make_relation_store<R: Relation>() -> Box<Erased> {
	Box::new(RelationStore::<R>::new())
}

/// Deletion-cleanup vtable bound at registration time.
pub(crate) fn relation_ops<R: Relation>() -> RelationOps {
	RelationOps {
		remove_entity: |store, id| {
			store.downcast_mut::<RelationStore<R>>().unwrap().remove_entity(id)
		},
		remove_incoming: |store, id| {
			store.downcast_mut::<RelationStore<R>>().unwrap().remove_incoming(id)
		},
	}
}
