use crate::prelude::*;

#[derive(Default)]
struct Banner<const ROW: usize, const COLUMN: usize>;

impl<const ROW: usize, const COLUMN: usize> Tag for Banner<ROW, COLUMN> {}

#[derive(Clone, Default)]
struct Cell<const ROW: usize, const COLUMN: usize>;

impl<const ROW: usize, const COLUMN: usize> Component for Cell<ROW, COLUMN> {}

macro_rules! tag_row {
	($builder:expr, $row:literal; $($column:literal)+) => {
		$($builder.register_tag::<Banner<$row, $column>>();)+
	};
}

macro_rules! tag_grid {
	($builder:expr; $($row:literal)+) => {
		$(tag_row!($builder, $row; 0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15);)+
	};
}

macro_rules! component_row {
	($builder:expr, $row:literal; $($column:literal)+) => {
		$($builder.register_component::<Cell<$row, $column>>();)+
	};
}

macro_rules! component_grid {
	($builder:expr; $($row:literal)+) => {
		$(component_row!($builder, $row; 0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15);)+
	};
}

#[test]
#[should_panic(expected = "tag types are supported")]
pub fn tag_registration_is_bounded_by_identity_width() {
	let mut builder = SchemaBuilder::new();
	// 256 tags plus the built-in Disabled overflow the 1-based bit indices.
	tag_grid!(builder; 0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15);
	builder.build();
}

#[test]
#[should_panic(expected = "component types are supported")]
pub fn component_registration_is_bounded_by_identity_width() {
	let mut builder = SchemaBuilder::new();
	component_grid!(builder; 0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15);
	builder.build();
}

#[test]
#[should_panic(expected = "already registered")]
pub fn registering_a_type_twice_panics() {
	let mut builder = SchemaBuilder::new();
	builder.register_tag::<Banner<0, 0>>();
	builder.register_tag::<Banner<0, 0>>();
}
