//! Query-driven visibility of tree nodes.
//!
//! A leaf matches when its full slash-joined path contains the query,
//! case-insensitively. Folders are shown (and expanded) only when something
//! below them matches. The empty query shows everything collapsed.

use std::collections::HashMap;

use super::{Folder, Node};

/// Display state of one node for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    pub visible: bool,
    /// Only meaningful for folders.
    pub expanded: bool,
}

/// Visibility of every node of a tree for one query.
#[derive(Debug, Clone)]
pub struct Visibility {
    query: String,
    states: HashMap<String, NodeState>,
    matches: Vec<String>,
}

impl Visibility {
    /// The query this was computed for.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether a non-empty query filtered the tree.
    pub fn is_filtered(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn state(&self, path: &str) -> Option<NodeState> {
        self.states.get(path).copied()
    }

    pub fn is_visible(&self, path: &str) -> bool {
        self.state(path).is_some_and(|state| state.visible)
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.state(path).is_some_and(|state| state.expanded)
    }

    /// Full paths of visible leaves, in tree order.
    pub fn matches(&self) -> &[String] {
        &self.matches
    }
}

/// Compute visibility and expansion for `query` over `tree`.
///
/// Pure function of its inputs; recompute on every query change.
pub fn compute_visibility(tree: &Folder, query: &str) -> Visibility {
    let needle = query.to_lowercase();
    let mut states = HashMap::new();
    let mut matches = Vec::new();

    if needle.is_empty() {
        for (path, node) in tree.walk() {
            states.insert(
                path.clone(),
                NodeState {
                    visible: true,
                    expanded: false,
                },
            );
            if node.is_leaf() {
                matches.push(path);
            }
        }
        return Visibility {
            query: String::new(),
            states,
            matches,
        };
    }

    for (path, node) in tree.walk() {
        match node {
            Node::Folder(_) => {
                states.entry(path).or_insert_with(NodeState::default);
            }
            Node::Leaf(_) => {
                let visible = path.to_lowercase().contains(&needle);
                if visible {
                    expand_ancestors(&mut states, &path);
                    matches.push(path.clone());
                }
                states.insert(
                    path,
                    NodeState {
                        visible,
                        expanded: false,
                    },
                );
            }
        }
    }

    Visibility {
        query: query.to_string(),
        states,
        matches,
    }
}

/// Mark every folder above `path` visible and expanded, deepest first.
fn expand_ancestors(states: &mut HashMap<String, NodeState>, path: &str) {
    for (index, _) in path.rmatch_indices('/') {
        let state = states.entry(path[..index].to_string()).or_default();
        if state.expanded {
            // Everything above was expanded by an earlier match.
            break;
        }
        state.visible = true;
        state.expanded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;

    fn tree() -> Folder {
        let flat = [
            ("Email/Work/outlook", "c1"),
            ("Email/Personal/gmail", "c2"),
            ("Banking/checking", "c3"),
            ("wifi-home", "c4"),
            ("Servers/prod/db", "c5"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()));
        TreeBuilder::new().build(flat).unwrap().tree
    }

    #[test]
    fn test_empty_query_shows_all_collapsed() {
        let tree = tree();
        let visibility = compute_visibility(&tree, "");

        assert!(!visibility.is_filtered());
        for (path, node) in tree.walk() {
            assert!(visibility.is_visible(&path), "{} should be visible", path);
            if !node.is_leaf() {
                assert!(!visibility.is_expanded(&path), "{} should be collapsed", path);
            }
        }
        assert_eq!(visibility.matches().len(), 5);
    }

    #[test]
    fn test_match_expands_all_ancestors() {
        let visibility = compute_visibility(&tree(), "gmail");

        assert_eq!(visibility.matches(), &["Email/Personal/gmail".to_string()]);
        assert!(visibility.is_visible("Email/Personal/gmail"));
        assert!(visibility.is_expanded("Email"));
        assert!(visibility.is_expanded("Email/Personal"));
        assert!(visibility.is_visible("Email"));
    }

    #[test]
    fn test_non_matching_folders_hidden() {
        let visibility = compute_visibility(&tree(), "gmail");

        assert!(!visibility.is_visible("Email/Work"));
        assert!(!visibility.is_visible("Email/Work/outlook"));
        assert!(!visibility.is_visible("Banking"));
        assert!(!visibility.is_expanded("Banking"));
        assert!(!visibility.is_visible("wifi-home"));
        // Hidden folders are still known to the index.
        assert_eq!(visibility.state("Banking"), Some(NodeState::default()));
    }

    #[test]
    fn test_case_insensitive_match_on_full_path() {
        let visibility = compute_visibility(&tree(), "email/WORK");
        assert_eq!(visibility.matches(), &["Email/Work/outlook".to_string()]);

        // Folder names are part of the searchable path.
        let visibility = compute_visibility(&tree(), "servers");
        assert!(visibility.is_visible("Servers/prod/db"));
        assert!(visibility.is_expanded("Servers/prod"));
    }

    #[test]
    fn test_shared_ancestor_for_multiple_matches() {
        let visibility = compute_visibility(&tree(), "e");
        // "e" appears in every path.
        assert_eq!(visibility.matches().len(), 5);
        assert!(visibility.is_expanded("Email"));
        assert!(visibility.is_expanded("Email/Work"));
        assert!(visibility.is_expanded("Email/Personal"));
    }

    #[test]
    fn test_no_match_hides_everything() {
        let tree = tree();
        let visibility = compute_visibility(&tree, "zzz");
        assert!(visibility.matches().is_empty());
        for (path, _) in tree.walk() {
            assert!(!visibility.is_visible(&path));
        }
    }

    #[test]
    fn test_unknown_path_not_visible() {
        let visibility = compute_visibility(&tree(), "");
        assert!(!visibility.is_visible("does/not/exist"));
        assert!(visibility.state("does/not/exist").is_none());
    }

    #[test]
    fn test_every_match_has_expanded_ancestors() {
        let tree = tree();
        for query in ["o", "PROD", "mail", "c", "/"] {
            let visibility = compute_visibility(&tree, query);
            for (path, node) in tree.walk() {
                if !node.is_leaf() {
                    continue;
                }
                let matches = path.to_lowercase().contains(&query.to_lowercase());
                assert_eq!(visibility.is_visible(&path), matches, "{} / {}", query, path);
                if matches {
                    for (index, _) in path.match_indices('/') {
                        assert!(visibility.is_expanded(&path[..index]));
                    }
                }
            }
        }
    }
}
