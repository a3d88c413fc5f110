use crate::schema::{Component, ComponentId};
use std::any::{Any, TypeId};
use std::marker::PhantomData;

type Erased = dyn Any + Send + Sync;

/// A type-erased growable component column.
///
/// The backing storage is a plain `Vec<T>` behind `dyn Any`; all operations a
/// structural change needs without knowing `T` go through a per-type table of
/// fn pointers bound at heap construction. Typed access is only used by chunk
/// views, which assert the element type once per chunk.
pub(crate) struct ComponentHeap {
	component: ComponentId,
	type_id: TypeId,
	values: Box<Erased>,
	ops: &'static HeapOps,
}

pub(crate) struct HeapOps {
	push_default: fn(&mut Erased),
	swap_remove: fn(&mut Erased, usize),
	copy_row: fn(&Erased, &mut Erased, usize, usize),
	write_boxed: fn(&mut Erased, usize, Box<Erased>),
	read_boxed: fn(&Erased, usize) -> Box<Erased>,
}

/// Create a [ComponentHeap] storing values of type `T`.
/// Registered as the heap factory of `T`'s [ComponentType](crate::schema::ComponentType).
pub(crate) fn heap_of<T: Component>(component: ComponentId) -> ComponentHeap {
	ComponentHeap {
		component,
		type_id: TypeId::of::<T>(),
		values: Box::new(Vec::<T>::new()),
		ops: &Ops::<T>::TABLE,
	}
}

/// Clone a staged boxed value without knowing its type; used by reusable
/// batches which keep their staged values across applications.
pub(crate) fn clone_boxed<T: Component>(value: &Erased) -> Box<Erased> {
	Box::new(value.downcast_ref::<T>().unwrap().clone())
}

impl ComponentHeap {
	#[inline(always)]
	pub fn component(&self) -> ComponentId {
		self.component
	}

	/// Append a default value, growing by doubling.
	pub fn push_default(&mut self) {
		(self.ops.push_default)(&mut *self.values);
	}

	/// Remove the value at `row` by swapping in the last value. O(1).
	pub fn swap_remove(&mut self, row: usize) {
		(self.ops.swap_remove)(&mut *self.values, row);
	}

	/// Clone the value at `src_row` over `dst`'s value at `dst_row`.
	/// Both heaps must store the same component type.
	pub fn copy_row_to(&self, dst: &mut ComponentHeap, src_row: usize, dst_row: usize) {
		debug_assert_eq!(self.type_id, dst.type_id);
		(self.ops.copy_row)(&*self.values, &mut *dst.values, src_row, dst_row);
	}

	/// Overwrite the value at `row` with a boxed value of the heap's type.
	pub fn write_boxed(&mut self, row: usize, value: Box<Erased>) {
		(self.ops.write_boxed)(&mut *self.values, row, value);
	}

	/// Clone the value at `row` into a box; the import/export boundary.
	pub fn read_boxed(&self, row: usize) -> Box<Erased> {
		(self.ops.read_boxed)(&*self.values, row)
	}

	pub fn as_slice<T: Component>(&self) -> &[T] {
		assert_eq!(self.type_id, TypeId::of::<T>(), "heap does not store values of type T");
		self.values.downcast_ref::<Vec<T>>().unwrap()
	}

	pub fn as_mut_slice<T: Component>(&mut self) -> &mut [T] {
		assert_eq!(self.type_id, TypeId::of::<T>(), "heap does not store values of type T");
		self.values.downcast_mut::<Vec<T>>().unwrap()
	}

	/// Base pointer of the column for zero-copy chunk views.
	pub fn as_mut_ptr<T: Component>(&mut self) -> *mut T {
		self.as_mut_slice::<T>().as_mut_ptr()
	}

}

struct Ops<T>(PhantomData<T>);

impl<T: Component> Ops<T> {
	const TABLE: HeapOps = HeapOps {
		push_default: |values| {
			values.downcast_mut::<Vec<T>>().unwrap().push(T::default());
		},
		swap_remove: |values, row| {
			values.downcast_mut::<Vec<T>>().unwrap().swap_remove(row);
		},
		copy_row: |src, dst, src_row, dst_row| {
			let src = src.downcast_ref::<Vec<T>>().unwrap();
			let dst = dst.downcast_mut::<Vec<T>>().unwrap();
			dst[dst_row] = src[src_row].clone();
		},
		write_boxed: |values, row, value| {
			let values = values.downcast_mut::<Vec<T>>().unwrap();
			values[row] = *value.downcast::<T>().unwrap();
		},
		read_boxed: |values, row| {
			let values = values.downcast_ref::<Vec<T>>().unwrap();
			Box::new(values[row].clone())
		},
	};
}
