use crossbeam_channel::{unbounded, Sender};
use log::debug;
use parking_lot::{Condvar, Mutex};
use std::thread::JoinHandle;

/// Archetypes shorter than this per task run inline on the caller.
const DEFAULT_MIN_SECTION_LENGTH: usize = 1000;

/// A fixed pool of long-lived worker threads executing disjoint sections of
/// parallel query runs.
///
/// There is no work-stealing and no cancellation: the submitting thread hands
/// each worker one section, runs the last section itself and blocks until all
/// sections finished. A runner can be shared between stores via `Arc`.
pub struct JobRunner {
	min_section_length: usize,
	sender: Option<Sender<Job>>,
	workers: Vec<JoinHandle<()>>,
}

struct Job {
	/// Address of the submitting thread's stack-pinned [Scatter].
	scatter: usize,
	section: usize,
}

/// Fan-out state for one scatter call. Lives on the submitting thread's
/// stack; the submitting thread blocks on `done` until `pending` hits zero,
/// so workers never observe it after it is gone.
struct Scatter<'a> {
	task: &'a (dyn Fn(usize) + Sync),
	pending: Mutex<usize>,
	done: Condvar,
}

impl JobRunner {
	pub fn new(worker_count: usize) -> Self {
		Self::with_min_section_length(worker_count, DEFAULT_MIN_SECTION_LENGTH)
	}

	pub fn with_min_section_length(worker_count: usize, min_section_length: usize) -> Self {
		let (sender, receiver) = unbounded::<Job>();

		let workers = (0..worker_count)
			.map(|index| {
				let receiver = receiver.clone();
				std::thread::Builder::new()
					.name(format!("strata-worker-{index}"))
					.spawn(move || {
						while let Ok(job) = receiver.recv() {
							let scatter = unsafe { &*(job.scatter as *const Scatter<'_>) };
							(scatter.task)(job.section);

							let mut pending = scatter.pending.lock();
							*pending -= 1;
							if *pending == 0 {
								scatter.done.notify_one();
							}
						}
					})
					.unwrap()
			})
			.collect();

		debug!("job runner started with {worker_count} workers");
		Self {
			min_section_length,
			sender: Some(sender),
			workers,
		}
	}

	pub fn worker_count(&self) -> usize {
		self.workers.len()
	}

	pub fn min_section_length(&self) -> usize {
		self.min_section_length
	}

	/// Run `task(section)` for every section index, the last one inline on
	/// the caller, and block until all sections completed.
	pub(crate) fn scatter(&self, sections: usize, task: &(dyn Fn(usize) + Sync)) {
		if sections == 1 || self.workers.is_empty() {
			for section in 0..sections {
				task(section);
			}
			return;
		}

		let scatter = Scatter {
			task,
			pending: Mutex::new(sections - 1),
			done: Condvar::new(),
		};
		let address = &scatter as *const Scatter<'_> as usize;

		let sender = self.sender.as_ref().unwrap();
		for section in 0..sections - 1 {
			sender.send(Job { scatter: address, section }).unwrap();
		}
		task(sections - 1);

		let mut pending = scatter.pending.lock();
		while *pending != 0 {
			scatter.done.wait(&mut pending);
		}
	}
}

impl Drop for JobRunner {
	fn drop(&mut self) {
		// Closing the channel ends every worker's receive loop.
		self.sender.take();
		for worker in self.workers.drain(..) {
			let _ = worker.join();
		}
		debug!("job runner stopped");
	}
}
