/// The length of every section but the last when splitting `len` rows into
/// `sections` parts: the ceiling division rounded up to the component
/// multiple, so all full sections start and end on a vector-width boundary.
pub(crate) fn section_length(len: usize, sections: usize, multiple: usize) -> usize {
	let base = (len + sections - 1) / sections;
	(base + multiple - 1) / multiple * multiple
}
