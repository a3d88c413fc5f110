use crate::data_structures::{IdSet, IdSetPool};
use rand::prelude::*;

#[test]
pub fn small_sets_stay_inline() {
	let mut pool = IdSetPool::new();
	let mut set = IdSet::new();

	assert!(set.is_empty());
	set.add(&mut pool, 7);
	assert_eq!(&[7], set.as_slice(&pool));
	assert!(set.contains(&pool, 7));
	assert_eq!(0, pool.bucket_count(1), "a single id must not allocate a bucket");
}

#[test]
pub fn growth_walks_up_the_size_classes() {
	let mut pool = IdSetPool::new();
	let mut set = IdSet::new();

	set.add(&mut pool, 1);
	set.add(&mut pool, 2);
	assert_eq!(1, pool.bucket_count(1), "two ids must land in a class-1 bucket");

	set.add(&mut pool, 3);
	assert_eq!(0, pool.bucket_count(1), "the class-1 bucket must be freed");
	assert_eq!(1, pool.bucket_count(2));

	set.add(&mut pool, 4);
	set.add(&mut pool, 5);
	assert_eq!(0, pool.bucket_count(2));
	assert_eq!(1, pool.bucket_count(3));

	let mut ids = set.as_slice(&pool).to_vec();
	ids.sort_unstable();
	assert_eq!(vec![1, 2, 3, 4, 5], ids);
}

#[test]
pub fn removal_shrinks_back_to_inline() {
	let mut pool = IdSetPool::new();
	let mut set = IdSet::new();

	for id in 1..=5 {
		set.add(&mut pool, id);
	}
	for id in (2..=5).rev() {
		assert!(set.remove(&mut pool, id));
	}

	assert_eq!(&[1], set.as_slice(&pool));
	assert_eq!(0, pool.bucket_count(1));
	assert_eq!(0, pool.bucket_count(2));
	assert_eq!(0, pool.bucket_count(3));

	assert!(set.remove(&mut pool, 1));
	assert!(set.is_empty());
	assert!(!set.remove(&mut pool, 1));
}

#[test]
pub fn freed_buckets_are_reused() {
	let mut pool = IdSetPool::new();

	let mut a = IdSet::new();
	a.add(&mut pool, 1);
	a.add(&mut pool, 2);
	a.clear(&mut pool);
	assert_eq!(0, pool.bucket_count(1));

	let mut b = IdSet::new();
	b.add(&mut pool, 3);
	b.add(&mut pool, 4);
	assert_eq!(1, pool.bucket_count(1), "the freed bucket must be handed out again");
}

#[test]
pub fn random_churn_matches_a_reference_set() {
	let mut pool = IdSetPool::new();
	let mut set = IdSet::new();
	let mut reference = Vec::new();
	let mut rng = rand::thread_rng();

	let mut ids: Vec<u32> = (1..=64).collect();
	ids.shuffle(&mut rng);

	for id in &ids {
		set.add(&mut pool, *id);
		reference.push(*id);
	}

	ids.shuffle(&mut rng);
	for id in ids.iter().take(40) {
		assert!(set.remove(&mut pool, *id));
		reference.retain(|r| r != id);
	}

	let mut actual = set.as_slice(&pool).to_vec();
	actual.sort_unstable();
	reference.sort_unstable();
	assert_eq!(reference, actual);
}
