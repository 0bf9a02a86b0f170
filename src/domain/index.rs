//! Ordered index: an unbalanced binary search tree over keyed records.
//!
//! Nodes live in a generational arena and link to their children by arena
//! index. Every node is referenced from exactly one slot (the root slot or a
//! parent's `left`/`right`), so the arena never holds shared or cyclic links.
//!
//! Keys compare byte-wise (`str` ordering). A node's left subtree holds
//! strictly smaller keys, its right subtree greater or equal keys. There is
//! no rebalancing: the shape depends entirely on insertion order.

use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use serde::{Deserialize, Serialize};
use termtree::Tree;
use tracing::{instrument, trace};

use crate::domain::entities::Keyed;

/// What `insert` does when the incoming key is already present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Keep both records; the newcomer is placed in the right subtree.
    #[default]
    Retain,
    /// Replace the record of the first match on the descent path.
    Overwrite,
    /// Leave the index unchanged.
    Reject,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DuplicatePolicy::Retain => "retain",
            DuplicatePolicy::Overwrite => "overwrite",
            DuplicatePolicy::Reject => "reject",
        };
        f.write_str(name)
    }
}

/// Result of a single `insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Replaced,
    Rejected,
}

#[derive(Debug)]
struct Node<R> {
    record: R,
    left: Option<Index>,
    right: Option<Index>,
}

impl<R> Node<R> {
    fn leaf(record: R) -> Self {
        Self {
            record,
            left: None,
            right: None,
        }
    }
}

/// Binary search tree keyed by [`Keyed::key`].
#[derive(Debug)]
pub struct OrderedIndex<R> {
    arena: Arena<Node<R>>,
    root: Option<Index>,
    policy: DuplicatePolicy,
}

impl<R> Default for OrderedIndex<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> OrderedIndex<R> {
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Lazy in-order traversal (ascending keys). Each call starts a fresh walk.
    pub fn iter(&self) -> InOrder<'_, R> {
        InOrder {
            arena: &self.arena,
            stack: Vec::new(),
            pending: self.root,
            remaining: self.arena.len(),
        }
    }

    /// Number of nodes on the longest root-to-leaf path, 0 for an empty index.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(Index, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();

        while let Some((idx, depth)) = stack.pop() {
            let Some(node) = self.arena.get(idx) else {
                continue;
            };
            max_depth = max_depth.max(depth);
            stack.extend(node.left.map(|child| (child, depth + 1)));
            stack.extend(node.right.map(|child| (child, depth + 1)));
        }

        max_depth
    }

    /// Release every node, children before their parent, and return how many
    /// were released. The index is empty and reusable afterwards.
    #[instrument(level = "trace", skip(self))]
    pub fn clear(&mut self) -> usize {
        let order = self.post_order();
        self.root = None;

        let mut released = 0;
        for idx in order {
            if self.arena.remove(idx).is_some() {
                released += 1;
            }
        }
        trace!(released, "index released");
        released
    }

    /// Arena indices in post-order (left, right, node), computed with an explicit stack.
    fn post_order(&self) -> Vec<Index> {
        let mut order = Vec::with_capacity(self.arena.len());
        let mut stack: Vec<(Index, bool)> = self.root.map(|root| (root, false)).into_iter().collect();

        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                order.push(idx);
                continue;
            }
            if let Some(node) = self.arena.get(idx) {
                stack.push((idx, true));
                stack.extend(node.right.map(|child| (child, false)));
                stack.extend(node.left.map(|child| (child, false)));
            }
        }

        order
    }
}

impl<R: Keyed> OrderedIndex<R> {
    /// Insert a record, descending left while the node's key is strictly
    /// greater than the incoming key and right otherwise.
    #[instrument(level = "trace", skip_all, fields(key = record.key()))]
    pub fn insert(&mut self, record: R) -> InsertOutcome {
        let Some(mut current) = self.root else {
            self.root = Some(self.arena.insert(Node::leaf(record)));
            return InsertOutcome::Inserted;
        };

        loop {
            let node = &self.arena[current];
            let (left, right) = (node.left, node.right);
            let node_key_greater = node.record.key() > record.key();

            if node.record.key() == record.key() {
                match self.policy {
                    DuplicatePolicy::Retain => {}
                    DuplicatePolicy::Overwrite => {
                        self.arena[current].record = record;
                        return InsertOutcome::Replaced;
                    }
                    DuplicatePolicy::Reject => return InsertOutcome::Rejected,
                }
            }

            let next = if node_key_greater { left } else { right };
            match next {
                Some(child) => current = child,
                None => {
                    let leaf = self.arena.insert(Node::leaf(record));
                    let parent = &mut self.arena[current];
                    if node_key_greater {
                        parent.left = Some(leaf);
                    } else {
                        parent.right = Some(leaf);
                    }
                    return InsertOutcome::Inserted;
                }
            }
        }
    }

    /// Exact-key lookup. Among duplicates, the match nearest the root wins.
    #[instrument(level = "trace", skip(self))]
    pub fn search(&self, key: &str) -> Option<&R> {
        let mut current = self.root;

        while let Some(idx) = current {
            let node = self.arena.get(idx)?;
            if node.record.key() == key {
                return Some(&node.record);
            }
            current = if key < node.record.key() {
                node.left
            } else {
                node.right
            };
        }

        None
    }

    pub fn contains(&self, key: &str) -> bool {
        self.search(key).is_some()
    }
}

impl<R: fmt::Display> OrderedIndex<R> {
    /// Render the tree structure. Children are labelled `L`/`R` by the slot they occupy.
    pub fn shape(&self) -> Tree<String> {
        let Some(root) = self.root else {
            return Tree::new("Empty index".to_string());
        };

        // Subtrees are assembled bottom-up so skewed trees need no recursion.
        let mut built: HashMap<Index, Tree<String>> = HashMap::new();
        for idx in self.post_order() {
            let node = &self.arena[idx];
            let mut tree = Tree::new(node.record.to_string());
            for (label, child) in [("L", node.left), ("R", node.right)] {
                if let Some(mut subtree) = child.and_then(|c| built.remove(&c)) {
                    subtree.root = format!("{label} {}", subtree.root);
                    tree.push(subtree);
                }
            }
            built.insert(idx, tree);
        }

        built
            .remove(&root)
            .unwrap_or_else(|| Tree::new("Empty index".to_string()))
    }
}

impl<R> Drop for OrderedIndex<R> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'a, R> IntoIterator for &'a OrderedIndex<R> {
    type Item = &'a R;
    type IntoIter = InOrder<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over an [`OrderedIndex`].
pub struct InOrder<'a, R> {
    arena: &'a Arena<Node<R>>,
    stack: Vec<Index>,
    /// Subtree whose left spine has not been pushed yet
    pending: Option<Index>,
    remaining: usize,
}

impl<'a, R> Iterator for InOrder<'a, R> {
    type Item = &'a R;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.pending.take() {
            let node = self.arena.get(idx)?;
            self.stack.push(idx);
            self.pending = node.left;
        }

        let idx = self.stack.pop()?;
        let node = self.arena.get(idx)?;
        self.pending = node.right;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<R> ExactSizeIterator for InOrder<'_, R> {}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use rstest::rstest;

    use super::*;
    use crate::domain::Course;

    #[derive(Debug)]
    struct Tracked {
        key: String,
        drops: Rc<Cell<usize>>,
    }

    impl Keyed for Tracked {
        fn key(&self) -> &str {
            &self.key
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    fn index_of(keys: &[&str]) -> OrderedIndex<Course> {
        let mut index = OrderedIndex::new();
        for key in keys {
            index.insert(Course::new(*key, format!("name of {key}")));
        }
        index
    }

    /// Walks every node and checks left < node <= right against subtree bounds.
    fn assert_search_order<R: Keyed>(index: &OrderedIndex<R>) {
        let mut stack: Vec<(Index, Option<String>, Option<String>)> = index
            .root
            .map(|root| (root, None, None))
            .into_iter()
            .collect();

        while let Some((idx, lower_inclusive, upper_exclusive)) = stack.pop() {
            let node = &index.arena[idx];
            let key = node.record.key();
            if let Some(lower) = &lower_inclusive {
                assert!(key >= lower.as_str(), "{key} must be >= {lower}");
            }
            if let Some(upper) = &upper_exclusive {
                assert!(key < upper.as_str(), "{key} must be < {upper}");
            }
            if let Some(left) = node.left {
                stack.push((left, lower_inclusive.clone(), Some(key.to_string())));
            }
            if let Some(right) = node.right {
                stack.push((right, Some(key.to_string()), upper_exclusive.clone()));
            }
        }
    }

    #[test]
    fn given_empty_index_when_queried_then_nothing_found() {
        let index: OrderedIndex<Course> = OrderedIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.depth(), 0);
        assert!(index.search("CS101").is_none());
        assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn given_round_trip_scenario_when_traversed_then_sorted_and_searchable() {
        let mut index = OrderedIndex::new();
        index.insert(Course::new("CS101", "Intro to CS"));
        index.insert(Course::new("CS201", "Data Structures").with_prerequisites(["CS101"]));
        index.insert(Course::new("CS050", "Pre-CS"));

        let keys: Vec<&str> = index.iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["CS050", "CS101", "CS201"]);

        let found = index.search("CS201").expect("CS201 present");
        assert_eq!(found.prerequisites, vec!["CS101"]);
        assert!(index.search("MATH999").is_none());
    }

    #[rstest]
    #[case::ascending(&["A1", "B2", "C3", "D4", "E5"])]
    #[case::descending(&["E5", "D4", "C3", "B2", "A1"])]
    #[case::mixed(&["MATH201", "CSCI100", "CSCI400", "CSCI101", "CSCI300", "CSCI200", "CSCI350"])]
    #[case::with_duplicates(&["B", "A", "B", "C", "A", "B"])]
    #[case::case_sensitive(&["cs101", "CS101", "Cs101", "cS101"])]
    fn given_any_insertion_order_when_traversed_then_keys_non_decreasing(#[case] keys: &[&str]) {
        let index = index_of(keys);

        assert_search_order(&index);
        let traversed: Vec<&str> = index.iter().map(|c| c.key()).collect();
        let mut expected: Vec<&str> = keys.to_vec();
        expected.sort_unstable();
        assert_eq!(traversed, expected);
        assert_eq!(index.iter().len(), keys.len());
    }

    #[test]
    fn given_sorted_input_when_inserted_then_degenerates_to_chain() {
        let keys: Vec<String> = (0..50).map(|i| format!("K{i:03}")).collect();
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let index = index_of(&refs);

        assert_eq!(index.depth(), 50);
        assert_search_order(&index);
    }

    #[test]
    fn given_every_inserted_key_when_searched_then_found_with_same_key() {
        let keys = ["CSCI300", "CSCI100", "MATH201", "CSCI200", "CSCI101", "CSCI400"];
        let index = index_of(&keys);

        for key in keys {
            assert_eq!(index.search(key).map(|c| c.key()), Some(key));
        }
        for missing in ["CSCI", "csci100", "CSCI1000", ""] {
            assert!(index.search(missing).is_none(), "{missing} should be absent");
        }
    }

    #[test]
    fn given_duplicate_key_when_retain_policy_then_both_kept_and_first_found() {
        let mut index = OrderedIndex::new();
        assert_eq!(index.insert(Course::new("CS101", "first")), InsertOutcome::Inserted);
        assert_eq!(index.insert(Course::new("CS101", "second")), InsertOutcome::Inserted);

        assert_eq!(index.len(), 2);
        assert_eq!(index.search("CS101").map(|c| c.course_name.as_str()), Some("first"));
        let root = index.root.expect("root");
        assert!(index.arena[root].left.is_none());
        assert!(index.arena[root].right.is_some());
        assert_search_order(&index);
    }

    #[test]
    fn given_duplicate_key_when_overwrite_policy_then_record_replaced_in_place() {
        let mut index = OrderedIndex::with_policy(DuplicatePolicy::Overwrite);
        index.insert(Course::new("CS200", "root"));
        index.insert(Course::new("CS101", "old"));
        assert_eq!(index.insert(Course::new("CS101", "new")), InsertOutcome::Replaced);

        assert_eq!(index.len(), 2);
        assert_eq!(index.search("CS101").map(|c| c.course_name.as_str()), Some("new"));
    }

    #[test]
    fn given_duplicate_key_when_reject_policy_then_index_unchanged() {
        let mut index = OrderedIndex::with_policy(DuplicatePolicy::Reject);
        index.insert(Course::new("CS101", "old"));
        assert_eq!(index.insert(Course::new("CS101", "new")), InsertOutcome::Rejected);

        assert_eq!(index.len(), 1);
        assert_eq!(index.search("CS101").map(|c| c.course_name.as_str()), Some("old"));
    }

    #[test]
    fn given_traversal_when_restarted_then_yields_same_sequence() {
        let index = index_of(&["M", "C", "X", "A", "E"]);
        let first: Vec<&str> = index.iter().map(|c| c.key()).collect();
        let second: Vec<&str> = (&index).into_iter().map(|c| c.key()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn given_n_records_when_index_dropped_then_each_released_once() {
        let drops = Rc::new(Cell::new(0));
        let n = 1_000;
        {
            let mut index = OrderedIndex::new();
            for i in 0..n {
                // scrambled insertion order
                let key = format!("K{:05}", (i * 7919) % n);
                index.insert(Tracked {
                    key,
                    drops: Rc::clone(&drops),
                });
            }
            assert_eq!(index.len(), n);
            assert_eq!(drops.get(), 0);
        }
        assert_eq!(drops.get(), n);
    }

    #[test]
    fn given_deep_chain_when_cleared_then_no_stack_exhaustion() {
        let drops = Rc::new(Cell::new(0));
        let n = 5_000;
        let mut index = OrderedIndex::new();
        for i in 0..n {
            index.insert(Tracked {
                key: format!("K{i:06}"),
                drops: Rc::clone(&drops),
            });
        }

        assert_eq!(index.clear(), n);
        assert_eq!(drops.get(), n);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);

        // second release is a no-op
        assert_eq!(index.clear(), 0);
        drop(index);
        assert_eq!(drops.get(), n);
    }

    #[test]
    fn given_cleared_index_when_reused_then_behaves_like_new() {
        let mut index = index_of(&["B", "A", "C"]);
        index.clear();
        index.insert(Course::new("Z", "zeta"));
        assert_eq!(index.len(), 1);
        assert!(index.search("A").is_none());
        assert!(index.contains("Z"));
    }

    #[test]
    fn given_index_when_shape_rendered_then_shows_slots() {
        let index = index_of(&["M", "C", "X"]);
        let rendered = index.shape().to_string();
        assert!(rendered.starts_with("M: name of M"));
        assert!(rendered.contains("L C: name of C"));
        assert!(rendered.contains("R X: name of X"));
    }

    #[test]
    fn given_empty_index_when_shape_rendered_then_placeholder() {
        let index: OrderedIndex<Course> = OrderedIndex::new();
        assert_eq!(index.shape().root, "Empty index");
    }
}
