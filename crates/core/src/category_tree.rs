//! Category tree engine.
//!
//! Categories are persisted as a flat, owner-scoped list where each row holds
//! an optional `parent_id`. Nothing here stores a tree: every view is computed
//! from a slice of categories, with the parent relation resolved through an
//! id lookup rather than embedded pointers.
//!
//! - [`build_forest`] -- nested roots/children for hierarchical display.
//! - [`flatten_with_depth`] -- pre-order list with indentation labels for
//!   flat selectors. Both views share one traversal so their order agrees.
//! - [`validate_parent`] / [`validate_reparent`] -- write-time checks
//!   (ownership of the parent, self-parenting, indirect cycles).
//! - [`collect_subtree`] -- every id removed by a cascading delete.
//!
//! Malformed input never panics or loops: dangling parents become roots, and
//! members of a parent cycle that no root reaches are promoted to roots.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Marker repeated once per depth level in [`FlatEntry::label`].
pub const INDENT_MARKER: char = '—';

/// Read access to the fields the tree engine needs.
pub trait CategoryNode {
    fn id(&self) -> DbId;
    fn parent_id(&self) -> Option<DbId>;
    fn name(&self) -> &str;
}

/// A category together with its (sorted) children.
///
/// Serializes as the category's own fields plus a `children` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode<T> {
    #[serde(flatten)]
    pub category: T,
    pub children: Vec<TreeNode<T>>,
}

/// One row of the flattened, depth-annotated view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatEntry<T> {
    #[serde(flatten)]
    pub category: T,
    pub depth: usize,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Locale-style name comparison used for sibling order.
///
/// Names are compared case-insensitively first; on a tie the lowercase form
/// sorts before the uppercase one (`"apple" < "Apple"`), and finally the raw
/// strings are compared so the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    folded
        .then_with(|| case_tiebreak(a, b))
        .then_with(|| a.cmp(b))
}

fn case_tiebreak(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            return match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => Ordering::Equal,
            };
        }
    }
    Ordering::Equal
}

fn by_name<T: CategoryNode>(items: &[T], a: usize, b: usize) -> Ordering {
    compare_names(items[a].name(), items[b].name()).then_with(|| items[a].id().cmp(&items[b].id()))
}

/// Label shown in flat selectors: one [`INDENT_MARKER`] per level, then the name.
pub fn indent_label(name: &str, depth: usize) -> String {
    if depth == 0 {
        return name.to_string();
    }
    let mut label: String = std::iter::repeat(INDENT_MARKER).take(depth).collect();
    label.push(' ');
    label.push_str(name);
    label
}

// ---------------------------------------------------------------------------
// Arena index
// ---------------------------------------------------------------------------

/// Index over a category slice: id lookup plus sorted child buckets.
struct Arena<'a, T> {
    items: &'a [T],
    index: HashMap<DbId, usize>,
    children: HashMap<DbId, Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a, T: CategoryNode> Arena<'a, T> {
    fn new(items: &'a [T]) -> Self {
        let index: HashMap<DbId, usize> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.id(), idx))
            .collect();

        let mut children: HashMap<DbId, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            match item.parent_id() {
                Some(pid) if pid != item.id() && index.contains_key(&pid) => {
                    children.entry(pid).or_default().push(idx);
                }
                _ => roots.push(idx),
            }
        }

        roots.sort_by(|&a, &b| by_name(items, a, b));
        for bucket in children.values_mut() {
            bucket.sort_by(|&a, &b| by_name(items, a, b));
        }

        Self {
            items,
            index,
            children,
            roots,
        }
    }

    fn parent_index(&self, idx: usize) -> Option<usize> {
        let item = &self.items[idx];
        item.parent_id()
            .filter(|pid| *pid != item.id())
            .and_then(|pid| self.index.get(&pid).copied())
    }

    /// Pre-order `(index, depth)` sequence covering every item exactly once.
    fn preorder(&self) -> Vec<(usize, usize)> {
        let mut visited = vec![false; self.items.len()];
        let mut out = Vec::with_capacity(self.items.len());

        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&r| (r, 0)).collect();
        self.drain(&mut stack, &mut visited, &mut out);

        while let Some(start) = self.next_unreached(&visited) {
            stack.push((start, 0));
            self.drain(&mut stack, &mut visited, &mut out);
        }

        out
    }

    fn drain(
        &self,
        stack: &mut Vec<(usize, usize)>,
        visited: &mut [bool],
        out: &mut Vec<(usize, usize)>,
    ) {
        while let Some((idx, depth)) = stack.pop() {
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            out.push((idx, depth));

            if let Some(kids) = self.children.get(&self.items[idx].id()) {
                for &kid in kids.iter().rev() {
                    if !visited[kid] {
                        stack.push((kid, depth + 1));
                    }
                }
            }
        }
    }

    /// Pick the item to promote when some categories were not reached from a
    /// root. Those can only sit on (or hang off) a parent cycle, so climb to
    /// the cycle and return its first member in name order.
    fn next_unreached(&self, visited: &[bool]) -> Option<usize> {
        let candidate = (0..self.items.len())
            .filter(|&i| !visited[i])
            .min_by(|&a, &b| by_name(self.items, a, b))?;

        let mut seen = HashSet::new();
        let mut current = candidate;
        while seen.insert(current) {
            match self.parent_index(current) {
                Some(parent) if !visited[parent] => current = parent,
                _ => return Some(current),
            }
        }

        let mut best = current;
        let mut next = self.parent_index(current);
        let mut steps = 0;
        while let Some(member) = next {
            if member == current || steps > self.items.len() {
                break;
            }
            if by_name(self.items, member, best) == Ordering::Less {
                best = member;
            }
            next = self.parent_index(member);
            steps += 1;
        }
        Some(best)
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Build the nested forest for hierarchical display.
///
/// Roots are categories without a resolvable parent in `categories`; siblings
/// at every level are ordered with [`compare_names`] (ties broken by id), so
/// the result does not depend on input order.
pub fn build_forest<T: CategoryNode + Clone>(categories: &[T]) -> Vec<TreeNode<T>> {
    let arena = Arena::new(categories);
    let mut forest = Vec::new();
    let mut open: Vec<TreeNode<T>> = Vec::new();

    for (idx, depth) in arena.preorder() {
        while open.len() > depth {
            close_node(&mut open, &mut forest);
        }
        open.push(TreeNode {
            category: categories[idx].clone(),
            children: Vec::new(),
        });
    }
    while !open.is_empty() {
        close_node(&mut open, &mut forest);
    }

    forest
}

fn close_node<T>(open: &mut Vec<TreeNode<T>>, forest: &mut Vec<TreeNode<T>>) {
    if let Some(done) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(done),
            None => forest.push(done),
        }
    }
}

/// Flatten the forest in pre-order, annotating each category with its depth
/// and an indented label.
pub fn flatten_with_depth<T: CategoryNode + Clone>(categories: &[T]) -> Vec<FlatEntry<T>> {
    Arena::new(categories)
        .preorder()
        .into_iter()
        .map(|(idx, depth)| {
            let category = categories[idx].clone();
            let label = indent_label(category.name(), depth);
            FlatEntry {
                category,
                depth,
                label,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Write-time validation
// ---------------------------------------------------------------------------

/// Reject making a category its own parent.
pub fn check_not_self_parent(id: DbId, parent_id: Option<DbId>) -> Result<(), CoreError> {
    if parent_id == Some(id) {
        return Err(CoreError::Validation(
            "A category cannot be its own parent".to_string(),
        ));
    }
    Ok(())
}

/// Require `parent_id`, when set, to name one of the owner's `categories`.
pub fn validate_parent<T: CategoryNode>(
    categories: &[T],
    parent_id: Option<DbId>,
) -> Result<(), CoreError> {
    match parent_id {
        Some(pid) if !categories.iter().any(|c| c.id() == pid) => Err(CoreError::Validation(
            format!("Parent category {pid} not found"),
        )),
        _ => Ok(()),
    }
}

/// Validate moving category `id` under `parent_id`.
///
/// Fails when the category would become its own parent, when the parent is
/// not among the owner's categories, or when the parent is a descendant of
/// `id` (which would close a cycle).
pub fn validate_reparent<T: CategoryNode>(
    categories: &[T],
    id: DbId,
    parent_id: Option<DbId>,
) -> Result<(), CoreError> {
    check_not_self_parent(id, parent_id)?;
    validate_parent(categories, parent_id)?;

    let parents: HashMap<DbId, Option<DbId>> =
        categories.iter().map(|c| (c.id(), c.parent_id())).collect();

    let mut seen = HashSet::new();
    let mut current = parent_id;
    while let Some(ancestor) = current {
        if ancestor == id {
            return Err(CoreError::Validation(
                "A category cannot be moved under one of its own subcategories".to_string(),
            ));
        }
        if !seen.insert(ancestor) {
            break;
        }
        current = parents.get(&ancestor).copied().flatten();
    }
    Ok(())
}

/// Ids of `root` and all of its descendants, root first, breadth-first.
///
/// Returns `None` when `root` is not among `categories`.
pub fn collect_subtree<T: CategoryNode>(categories: &[T], root: DbId) -> Option<Vec<DbId>> {
    if !categories.iter().any(|c| c.id() == root) {
        return None;
    }

    let mut children: HashMap<DbId, Vec<DbId>> = HashMap::new();
    for c in categories {
        if let Some(pid) = c.parent_id().filter(|pid| *pid != c.id()) {
            children.entry(pid).or_default().push(c.id());
        }
    }

    let mut seen = HashSet::from([root]);
    let mut ids = vec![root];
    let mut queue = VecDeque::from([root]);
    while let Some(current) = queue.pop_front() {
        for &child in children.get(&current).into_iter().flatten() {
            if seen.insert(child) {
                ids.push(child);
                queue.push_back(child);
            }
        }
    }
    Some(ids)
}
