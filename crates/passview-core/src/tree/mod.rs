//! Hierarchical view of an export.
//!
//! - **builder**: flat `path -> ciphertext` map to [`Folder`] tree
//! - **search**: per-query visibility and expansion of every node

pub mod builder;
pub mod search;

use indexmap::map::Iter;
use indexmap::IndexMap;

pub use builder::{BuildOutput, StructuralWarning, TreeBuilder, KEY_ENTRY};
pub use search::{compute_visibility, NodeState, Visibility};

/// One node of the export tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Ciphertext of a single entry.
    Leaf(String),
    Folder(Folder),
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Node::Folder(folder) => Some(folder),
            Node::Leaf(_) => None,
        }
    }
}

/// A folder: child segment names in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Folder {
    children: IndexMap<String, Node>,
}

impl Folder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Look up a node by its full slash-joined path.
    pub fn find(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split('/');
        let first = segments.next()?;
        let mut node = self.children.get(first)?;
        for segment in segments {
            node = node.as_folder()?.children.get(segment)?;
        }
        Some(node)
    }

    /// Ciphertext of the leaf at `path`, if that path is a leaf.
    pub fn leaf(&self, path: &str) -> Option<&str> {
        match self.find(path)? {
            Node::Leaf(ciphertext) => Some(ciphertext),
            Node::Folder(_) => None,
        }
    }

    /// Depth-first, pre-order traversal yielding `(full path, node)`.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(None, self.children.iter())],
        }
    }

    /// Number of leaves below this folder.
    pub fn leaf_count(&self) -> usize {
        self.walk().filter(|(_, node)| node.is_leaf()).count()
    }

    /// Flatten back into `full path -> ciphertext` pairs.
    pub fn flatten(&self) -> IndexMap<String, String> {
        self.walk()
            .filter_map(|(path, node)| match node {
                Node::Leaf(ciphertext) => Some((path, ciphertext.clone())),
                Node::Folder(_) => None,
            })
            .collect()
    }

    pub(crate) fn children_mut(&mut self) -> &mut IndexMap<String, Node> {
        &mut self.children
    }
}

/// Iterator returned by [`Folder::walk`].
pub struct Walk<'a> {
    stack: Vec<(Option<String>, Iter<'a, String, Node>)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (String, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (prefix, children) = self.stack.last_mut()?;
            match children.next() {
                Some((name, node)) => {
                    let path = match prefix {
                        Some(prefix) => format!("{}/{}", prefix, name),
                        None => name.clone(),
                    };
                    if let Node::Folder(folder) = node {
                        self.stack.push((Some(path.clone()), folder.children.iter()));
                    }
                    return Some((path, node));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Folder {
        let flat = vec![
            ("web/github".to_string(), "c1".to_string()),
            ("web/mail/personal".to_string(), "c2".to_string()),
            ("wifi".to_string(), "c3".to_string()),
        ];
        TreeBuilder::new().build(flat).unwrap().tree
    }

    #[test]
    fn test_find_and_leaf() {
        let tree = sample();
        assert_eq!(tree.leaf("web/mail/personal"), Some("c2"));
        assert_eq!(tree.leaf("wifi"), Some("c3"));
        assert!(tree.leaf("web").is_none());
        assert!(tree.find("web").unwrap().as_folder().is_some());
        assert!(tree.find("web/missing").is_none());
        assert!(tree.find("wifi/deeper").is_none());
    }

    #[test]
    fn test_walk_is_preorder_in_insertion_order() {
        let tree = sample();
        let paths: Vec<String> = tree.walk().map(|(path, _)| path).collect();
        assert_eq!(
            paths,
            vec![
                "web",
                "web/github",
                "web/mail",
                "web/mail/personal",
                "wifi"
            ]
        );
    }

    #[test]
    fn test_leaf_count() {
        assert_eq!(sample().leaf_count(), 3);
        assert_eq!(Folder::new().leaf_count(), 0);
    }

    #[test]
    fn test_walk_keeps_empty_segments() {
        let flat = vec![("/rooted".to_string(), "c".to_string())];
        let tree = TreeBuilder::new().build(flat).unwrap().tree;
        let paths: Vec<String> = tree.walk().map(|(path, _)| path).collect();
        assert_eq!(paths, vec!["", "/rooted"]);
        assert_eq!(tree.leaf("/rooted"), Some("c"));
    }
}
