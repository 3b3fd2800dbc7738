// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! FIFO of tracking calls made before the SDK finished loading.

use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::trace;

/// A first-in, first-out queue.
///
/// Items come out strictly in the order they went in, one at a time. The
/// queue never reorders, batches or drops items; bounding it is the
/// caller's concern.
#[derive(Debug)]
pub struct EventQueue<T> {
	items: Mutex<VecDeque<T>>,
}

impl<T> Default for EventQueue<T> {
	fn default() -> Self {
		Self {
			items: Mutex::new(VecDeque::new()),
		}
	}
}

impl<T> EventQueue<T> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an item at the tail.
	pub fn enqueue(&self, item: T) {
		let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
		items.push_back(item);
		trace!(queued = items.len(), "Enqueued call");
	}

	/// Removes and returns the head.
	pub fn drain(&self) -> Option<T> {
		self
			.items
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.pop_front()
	}

	/// Inspects the head without removing it.
	pub fn peek_head<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
		self
			.items
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.front()
			.map(f)
	}

	pub fn len(&self) -> usize {
		self.items.lock().unwrap_or_else(|e| e.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn drains_in_insertion_order() {
		let queue = EventQueue::new();
		queue.enqueue("A");
		queue.enqueue("B");
		queue.enqueue("C");

		assert_eq!(queue.len(), 3);
		assert_eq!(queue.peek_head(|head| *head), Some("A"));
		assert_eq!(queue.drain(), Some("A"));
		assert_eq!(queue.drain(), Some("B"));
		assert_eq!(queue.drain(), Some("C"));
		assert_eq!(queue.drain(), None);
		assert!(queue.is_empty());
	}

	#[test]
	fn peek_does_not_remove() {
		let queue = EventQueue::new();
		queue.enqueue(1);
		assert_eq!(queue.peek_head(|head| *head), Some(1));
		assert_eq!(queue.len(), 1);
		assert_eq!(EventQueue::<u8>::new().peek_head(|head| *head), None);
	}

	#[test]
	fn holds_boxed_closures() {
		let queue: EventQueue<Box<dyn FnOnce() -> u32 + Send>> = EventQueue::new();
		queue.enqueue(Box::new(|| 1));
		queue.enqueue(Box::new(|| 2));

		let mut results = Vec::new();
		while let Some(call) = queue.drain() {
			results.push(call());
		}
		assert_eq!(results, vec![1, 2]);
	}

	proptest! {
		#[test]
		fn every_item_is_drained_exactly_once(items in proptest::collection::vec(any::<u32>(), 0..64)) {
			let queue = EventQueue::new();
			for item in &items {
				queue.enqueue(*item);
			}

			let mut drained = Vec::new();
			while let Some(item) = queue.drain() {
				drained.push(item);
			}
			prop_assert_eq!(drained, items);
		}
	}
}
