/* src/policy/diff.rs */

use std::collections::HashSet;

/// Remembers which methods the previous update configured.
///
/// Not synchronized; an applier drives its tracker from one dispatch at a
/// time and wraps it in a mutex to satisfy `Sync`.
#[derive(Debug, Clone, Default)]
pub struct MethodTracker {
	methods: HashSet<String>,
}

impl MethodTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the tracked set with `next` and returns the methods that were
	/// tracked before but are missing from `next`, sorted.
	pub fn diff_and_replace(&mut self, next: HashSet<String>) -> Vec<String> {
		let previous = std::mem::replace(&mut self.methods, next);
		let mut removed: Vec<String> = previous
			.into_iter()
			.filter(|method| !self.methods.contains(method))
			.collect();
		removed.sort();
		removed
	}

	pub fn contains(&self, method: &str) -> bool {
		self.methods.contains(method)
	}

	pub fn len(&self) -> usize {
		self.methods.len()
	}

	pub fn is_empty(&self) -> bool {
		self.methods.is_empty()
	}

	/// Tracked methods, sorted.
	pub fn methods(&self) -> Vec<String> {
		let mut methods: Vec<String> = self.methods.iter().cloned().collect();
		methods.sort();
		methods
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn set(names: &[&str]) -> HashSet<String> {
		names.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_first_update_removes_nothing() {
		let mut tracker = MethodTracker::new();
		assert!(tracker.diff_and_replace(set(&["a", "b"])).is_empty());
		assert_eq!(tracker.methods(), vec!["a", "b"]);
	}

	#[test]
	fn test_reports_only_missing_methods() {
		let mut tracker = MethodTracker::new();
		tracker.diff_and_replace(set(&["a", "b", "c"]));
		assert_eq!(tracker.diff_and_replace(set(&["a", "c", "d"])), vec!["b"]);
		assert!(tracker.contains("d"));
		assert!(!tracker.contains("b"));
	}

	#[test]
	fn test_removed_method_is_reported_once() {
		let mut tracker = MethodTracker::new();
		tracker.diff_and_replace(set(&["a", "b"]));
		assert_eq!(tracker.diff_and_replace(set(&["a"])), vec!["b"]);
		assert!(tracker.diff_and_replace(set(&["a"])).is_empty());
	}

	#[test]
	fn test_empty_update_removes_everything() {
		let mut tracker = MethodTracker::new();
		tracker.diff_and_replace(set(&["x", "y"]));
		assert_eq!(tracker.diff_and_replace(HashSet::new()), vec!["x", "y"]);
		assert!(tracker.is_empty());
	}
}
