use crate::archetypes::ArchetypeInstance;
use crate::data_structures::BitSet;
use crate::entities::EntityId;
use crate::errors::EcsError;
use crate::schema::{Component, ComponentId, TypeRegistry};
use paste::paste;
use std::marker::PhantomData;

pub(crate) const MAX_QUERY_COMPONENTS: usize = 10;

/// The ordered component-id tuple of a query. The order defines the shape of
/// chunk and row tuples; archetype matching uses the unordered bitset.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct Signature {
	ids: [u16; MAX_QUERY_COMPONENTS],
	len: u8,
	/// Section alignment multiple of the widest member, in elements.
	multiple: u8,
}

impl Signature {
	pub fn new(registry: &TypeRegistry, components: &[ComponentId]) -> Self {
		assert!(components.len() <= MAX_QUERY_COMPONENTS);

		let mut ids = [0u16; MAX_QUERY_COMPONENTS];
		let mut multiple = 1usize;
		for (position, component) in components.iter().enumerate() {
			assert!(
				!ids[..position].contains(&(component.value() as u16)),
				"component tuples must not repeat a type"
			);
			ids[position] = component.value() as u16;
			multiple = multiple.max(registry.component(*component).multiple());
		}

		Self {
			ids,
			len: components.len() as u8,
			multiple: multiple as u8,
		}
	}

	#[inline(always)]
	pub fn id(&self, position: usize) -> ComponentId {
		ComponentId::new(self.ids[position])
	}

	pub fn multiple(&self) -> usize {
		self.multiple as usize
	}

	pub fn required_bits(&self) -> BitSet {
		let mut bits = BitSet::new();
		for position in 0..self.len as usize {
			bits.set(self.ids[position] as usize);
		}
		bits
	}
}

/// A column base pointer erased to an address so parallel sections can cross
/// the job runner's channel. The submitting thread blocks until every section
/// finished, so the pointee outlives all uses.
pub struct ErasedPtr<T> {
	address: usize,
	_marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ErasedPtr<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for ErasedPtr<T> {}

impl<T> ErasedPtr<T> {
	fn new(ptr: *mut T) -> Self {
		Self {
			address: ptr as usize,
			_marker: PhantomData,
		}
	}

	/// # Safety
	/// `offset` must stay within the column the address was taken from.
	unsafe fn add(self, offset: usize) -> *mut T {
		(self.address as *mut T).add(offset)
	}
}

/// A tuple of one to ten distinct component types, driving typed access to
/// the archetypes a query matched.
pub trait ComponentTuple: 'static {
	/// Zero-copy column views over one archetype.
	type Slices<'a>;
	/// One row's mutable component references.
	type Refs<'a>;
	/// Erased column base pointers for parallel sections.
	type Ptrs: Copy + Send + Sync;

	fn signature(registry: &TypeRegistry) -> Result<Signature, EcsError>;

	fn slices<'a>(archetype: &'a mut ArchetypeInstance, signature: &Signature) -> Self::Slices<'a>;

	fn ptrs(archetype: &mut ArchetypeInstance, signature: &Signature) -> Self::Ptrs;

	fn for_each_in<Func: for<'a> FnMut(Self::Refs<'a>)>(
		slices: Self::Slices<'_>, len: usize, f: &mut Func,
	);

	fn for_each_with_ids<Func: for<'a> FnMut(EntityId, Self::Refs<'a>)>(
		slices: Self::Slices<'_>, ids: &[EntityId], f: &mut Func,
	);

	/// # Safety
	/// The pointers must come from [Self::ptrs] over columns holding at least
	/// `start + len` rows, and no other thread may touch rows in that range
	/// while this runs.
	unsafe fn for_each_raw<Func: for<'a> Fn(Self::Refs<'a>)>(
		ptrs: Self::Ptrs, start: usize, len: usize, f: &Func,
	);
}

macro_rules! component_tuple {
	($(($type:ident, $index:tt)),+) => {
		paste! {
			impl<$($type: Component),+> ComponentTuple for ($($type,)+) {
				type Slices<'a> = ($(&'a mut [$type],)+);
				type Refs<'a> = ($(&'a mut $type,)+);
				type Ptrs = ($(ErasedPtr<$type>,)+);

				fn signature(registry: &TypeRegistry) -> Result<Signature, EcsError> {
					Ok(Signature::new(registry, &[$(registry.component_id::<$type>()?),+]))
				}

				fn slices<'a>(
					archetype: &'a mut ArchetypeInstance, signature: &Signature,
				) -> Self::Slices<'a> {
					let len = archetype.len();
					// Members are distinct types, so the columns are disjoint.
					unsafe {
						($(
							std::slice::from_raw_parts_mut(
								archetype
									.heap_mut(signature.id($index))
									.unwrap()
									.as_mut_ptr::<$type>(),
								len,
							),
						)+)
					}
				}

				fn ptrs(archetype: &mut ArchetypeInstance, signature: &Signature) -> Self::Ptrs {
					($(
						ErasedPtr::new(
							archetype
								.heap_mut(signature.id($index))
								.unwrap()
								.as_mut_ptr::<$type>(),
						),
					)+)
				}

				fn for_each_in<Func: for<'a> FnMut(Self::Refs<'a>)>(
					slices: Self::Slices<'_>, len: usize, f: &mut Func,
				) {
					let ($([<column_ $type:lower>],)+) = slices;
					for row in 0..len {
						f(($(&mut [<column_ $type:lower>][row],)+));
					}
				}

				fn for_each_with_ids<Func: for<'a> FnMut(EntityId, Self::Refs<'a>)>(
					slices: Self::Slices<'_>, ids: &[EntityId], f: &mut Func,
				) {
					let ($([<column_ $type:lower>],)+) = slices;
					for row in 0..ids.len() {
						f(ids[row], ($(&mut [<column_ $type:lower>][row],)+));
					}
				}

				unsafe fn for_each_raw<Func: for<'a> Fn(Self::Refs<'a>)>(
					ptrs: Self::Ptrs, start: usize, len: usize, f: &Func,
				) {
					let ($([<pointer_ $type:lower>],)+) = ptrs;
					for row in start..start + len {
						f(($(&mut *[<pointer_ $type:lower>].add(row),)+));
					}
				}
			}
		}
	};
}

component_tuple!((A, 0));
component_tuple!((A, 0), (B, 1));
component_tuple!((A, 0), (B, 1), (C, 2));
component_tuple!((A, 0), (B, 1), (C, 2), (D, 3));
component_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4));
component_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5));
component_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6));
component_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7));
component_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7), (I, 8));
component_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7), (I, 8), (J, 9));
