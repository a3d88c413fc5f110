use crate::data_structures::IdSet;
use crate::entities::{ChangeEvent, Entity, EntityId, EntityStore, NO_PARENT};
use crate::errors::EcsError;
use crate::schema::Component;

/// The built-in component holding an entity's place in the tree: parent id
/// plus the pooled set of child ids. Attached lazily on first tree use and
/// moved through the regular structural path like any other component.
#[derive(Clone, Default)]
pub(crate) struct TreeNode {
	pub parent: u32,
	pub children: IdSet,
}

impl Component for TreeNode {}

impl EntityStore {
	/// Attach `child` under `parent`, re-parenting if the child already has a
	/// parent. Fails without mutating anything when the change would create a
	/// cycle; the error's path lists the offending chain, e.g. `"2 -> 1 -> 2"`.
	pub fn add_child(&mut self, parent: Entity, child: Entity) -> Result<(), EcsError> {
		let parent_id = self.validate(parent)?;
		let child_id = self.validate(child)?;

		// Walk the new parent's ancestor chain before touching anything. On a
		// cycle the path starts at the new parent and closes on it.
		let mut path = vec![parent_id];
		let mut current = parent_id;
		loop {
			if current == child_id {
				path.push(parent_id);
				let path = path
					.iter()
					.map(|id| id.to_string())
					.collect::<Vec<_>>()
					.join(" -> ");
				return Err(EcsError::TreeCycle { path });
			}
			current = self.parent_of(current);
			if current == NO_PARENT {
				break;
			}
			path.push(current);
		}

		self.ensure_tree(parent_id);
		self.ensure_tree(child_id);

		let old_parent = self.parent_of(child_id);
		if old_parent == parent_id {
			return Ok(());
		}
		if old_parent != NO_PARENT {
			self.detach_child(old_parent, child_id);
		}

		let tree = self.registry.tree_node;
		let (archetype, row) = self.location(parent_id);
		let node = self
			.archetypes
			.archetype_mut(archetype)
			.get_mut::<TreeNode>(tree, row)
			.unwrap();
		node.children.add(&mut self.tree_pool, child_id);

		let (child_archetype, child_row) = self.location(child_id);
		self.archetypes
			.archetype_mut(child_archetype)
			.get_mut::<TreeNode>(tree, child_row)
			.unwrap()
			.parent = parent_id;

		self.emit(ChangeEvent::ChildAdded {
			parent: EntityId::new(parent_id),
			child: EntityId::new(child_id),
		});
		Ok(())
	}

	/// Detach `child` from `parent`. Returns false when it was not a child.
	pub fn remove_child(&mut self, parent: Entity, child: Entity) -> Result<bool, EcsError> {
		let parent_id = self.validate(parent)?;
		let child_id = self.validate(child)?;

		if self.parent_of(child_id) != parent_id {
			return Ok(false);
		}
		self.detach_child(parent_id, child_id);
		Ok(true)
	}

	/// The entity's child ids, in attachment order (removal swaps).
	pub fn child_ids(&self, entity: Entity) -> Result<Vec<EntityId>, EcsError> {
		let id = self.validate(entity)?;
		let tree = self.registry.tree_node;
		let (archetype, row) = self.location(id);
		match self.archetypes.archetype(archetype).get::<TreeNode>(tree, row) {
			None => Ok(Vec::new()),
			Some(node) => Ok(node
				.children
				.as_slice(&self.tree_pool)
				.iter()
				.map(|id| EntityId::new(*id))
				.collect()),
		}
	}

	pub fn child_count(&self, entity: Entity) -> Result<usize, EcsError> {
		let id = self.validate(entity)?;
		let tree = self.registry.tree_node;
		let (archetype, row) = self.location(id);
		match self.archetypes.archetype(archetype).get::<TreeNode>(tree, row) {
			None => Ok(0),
			Some(node) => Ok(node.children.len()),
		}
	}

	pub fn parent(&self, entity: Entity) -> Result<Option<Entity>, EcsError> {
		let id = self.validate(entity)?;
		match self.parent_of(id) {
			NO_PARENT => Ok(None),
			parent => Ok(Some(self.handle(parent))),
		}
	}

	/// Designate the store's root entity. A second designation fails with
	/// [EcsError::RootAlreadySet] naming the current root.
	pub fn set_root(&mut self, entity: Entity) -> Result<(), EcsError> {
		let id = self.validate(entity)?;
		if self.root != 0 {
			return Err(EcsError::RootAlreadySet(EntityId::new(self.root)));
		}
		self.ensure_tree(id);
		self.root = id;
		Ok(())
	}

	pub fn root(&self) -> Option<Entity> {
		match self.root {
			0 => None,
			id => Some(self.handle(id)),
		}
	}

	/// Remove the entity from the tree prior to deletion: detach from its
	/// parent, orphan its children and return the pooled child set.
	pub(crate) fn detach_tree(&mut self, id: u32) {
		let tree = self.registry.tree_node;
		let (archetype, row) = self.location(id);
		let Some(node) = self.archetypes.archetype(archetype).get::<TreeNode>(tree, row) else {
			return;
		};

		let parent = node.parent;
		let children: Vec<u32> = node.children.as_slice(&self.tree_pool).to_vec();

		let node = self
			.archetypes
			.archetype_mut(archetype)
			.get_mut::<TreeNode>(tree, row)
			.unwrap();
		node.children.clear(&mut self.tree_pool);
		node.parent = NO_PARENT;

		if parent != NO_PARENT {
			self.detach_child(parent, id);
		}
		for child in children {
			let (child_archetype, child_row) = self.location(child);
			self.archetypes
				.archetype_mut(child_archetype)
				.get_mut::<TreeNode>(tree, child_row)
				.unwrap()
				.parent = NO_PARENT;
			self.emit(ChangeEvent::ChildRemoved {
				parent: EntityId::new(id),
				child: EntityId::new(child),
			});
		}
	}

	fn detach_child(&mut self, parent_id: u32, child_id: u32) {
		let tree = self.registry.tree_node;
		let (archetype, row) = self.location(parent_id);
		let node = self
			.archetypes
			.archetype_mut(archetype)
			.get_mut::<TreeNode>(tree, row)
			.unwrap();
		node.children.remove(&mut self.tree_pool, child_id);

		let (child_archetype, child_row) = self.location(child_id);
		self.archetypes
			.archetype_mut(child_archetype)
			.get_mut::<TreeNode>(tree, child_row)
			.unwrap()
			.parent = NO_PARENT;

		self.emit(ChangeEvent::ChildRemoved {
			parent: EntityId::new(parent_id),
			child: EntityId::new(child_id),
		});
	}

	fn parent_of(&self, id: u32) -> u32 {
		let tree = self.registry.tree_node;
		let (archetype, row) = self.location(id);
		match self.archetypes.archetype(archetype).get::<TreeNode>(tree, row) {
			None => NO_PARENT,
			Some(node) => node.parent,
		}
	}

	/// Attach a default [TreeNode] when the entity has none yet. Internal
	/// bookkeeping; fires no component event.
	fn ensure_tree(&mut self, id: u32) {
		let tree = self.registry.tree_node;
		let (archetype, _) = self.location(id);
		if !self.archetypes.archetype(archetype).has_component(tree) {
			let target = self.archetypes.with_component(archetype, tree);
			self.move_rows(id, archetype, target);
		}
	}
}
