//! Conversion of the flat export map into a folder tree.

use std::fmt;

use super::{Folder, Node};
use crate::error::{PassviewError, Result};
use crate::secret::PrivateKeyMaterial;

/// Reserved export entry holding the private key material.
pub const KEY_ENTRY: &str = "_key";

/// A non-fatal problem in the shape of the flat input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralWarning {
    /// A leaf at `path` was discarded because `entry` needs it to be a folder.
    LeafReplacedByFolder { path: String, entry: String },
    /// The leaf `path` was discarded because a folder already uses that name.
    LeafShadowedByFolder { path: String },
    /// `path` appeared twice; the later value was kept.
    DuplicateEntry { path: String },
    /// An entry with an empty path was skipped.
    EmptyPath,
}

impl fmt::Display for StructuralWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralWarning::LeafReplacedByFolder { path, entry } => write!(
                f,
                "entry \"{}\" replaced by a folder (needed for \"{}\")",
                path, entry
            ),
            StructuralWarning::LeafShadowedByFolder { path } => {
                write!(f, "entry \"{}\" dropped: a folder has the same name", path)
            }
            StructuralWarning::DuplicateEntry { path } => {
                write!(f, "entry \"{}\" appears more than once; last value kept", path)
            }
            StructuralWarning::EmptyPath => write!(f, "entry with empty path skipped"),
        }
    }
}

/// Result of a tree build.
#[derive(Debug)]
pub struct BuildOutput {
    pub tree: Folder,
    pub private_key: Option<PrivateKeyMaterial>,
    pub warnings: Vec<StructuralWarning>,
}

/// Builds a [`Folder`] tree from `path -> ciphertext` pairs.
///
/// Conflict policy:
/// - an intermediate segment holding a leaf becomes an empty folder
/// - a final segment holding a leaf is overwritten (last write wins)
/// - a final segment holding a folder keeps the folder
///
/// Every conflict is recorded as a [`StructuralWarning`] and logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeBuilder {
    require_key: bool,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the build when the export has no `_key` entry.
    pub fn require_key(mut self, required: bool) -> Self {
        self.require_key = required;
        self
    }

    /// # Errors
    ///
    /// Returns `PassviewError::Data` if the key is required but missing.
    pub fn build<I>(&self, flat: I) -> Result<BuildOutput>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut tree = Folder::new();
        let mut private_key = None;
        let mut warnings = Vec::new();

        for (path, value) in flat {
            if path == KEY_ENTRY {
                private_key = Some(PrivateKeyMaterial::new(value));
                continue;
            }
            insert(&mut tree, &path, value, &mut warnings);
        }

        if self.require_key && private_key.is_none() {
            return Err(PassviewError::Data(format!(
                "Export has no \"{}\" entry",
                KEY_ENTRY
            )));
        }

        for warning in &warnings {
            tracing::warn!(%warning, "Input structure seems invalid");
        }

        Ok(BuildOutput {
            tree,
            private_key,
            warnings,
        })
    }
}

fn insert(root: &mut Folder, full_path: &str, value: String, warnings: &mut Vec<StructuralWarning>) {
    if full_path.is_empty() {
        warnings.push(StructuralWarning::EmptyPath);
        return;
    }

    let (parents, name) = match full_path.rsplit_once('/') {
        Some((parents, name)) => (Some(parents), name),
        None => (None, full_path),
    };

    let mut current = root;
    // End offset of the folder path walked so far within `full_path`.
    let mut walked: Option<usize> = None;
    for segment in parents.into_iter().flat_map(|p| p.split('/')) {
        let end = match walked {
            Some(end) => end + 1 + segment.len(),
            None => segment.len(),
        };
        walked = Some(end);

        let slot = current
            .children_mut()
            .entry(segment.to_string())
            .or_insert_with(|| Node::Folder(Folder::new()));
        if slot.is_leaf() {
            warnings.push(StructuralWarning::LeafReplacedByFolder {
                path: full_path[..end].to_string(),
                entry: full_path.to_string(),
            });
            *slot = Node::Folder(Folder::new());
        }
        current = match slot {
            Node::Folder(folder) => folder,
            Node::Leaf(_) => unreachable!("leaf slots are replaced above"),
        };
    }

    match current.children_mut().get_mut(name) {
        None => {
            current
                .children_mut()
                .insert(name.to_string(), Node::Leaf(value));
        }
        Some(Node::Leaf(existing)) => {
            warnings.push(StructuralWarning::DuplicateEntry {
                path: full_path.to_string(),
            });
            *existing = value;
        }
        Some(Node::Folder(_)) => {
            warnings.push(StructuralWarning::LeafShadowedByFolder {
                path: full_path.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_builds_nested_folders() {
        let output = TreeBuilder::new()
            .build(pairs(&[
                ("email/work", "c1"),
                ("email/home", "c2"),
                ("bank", "c3"),
            ]))
            .unwrap();

        assert!(output.warnings.is_empty());
        let email = output.tree.get("email").and_then(Node::as_folder).unwrap();
        assert_eq!(email.len(), 2);
        assert_eq!(email.get("work"), Some(&Node::Leaf("c1".to_string())));
        assert_eq!(output.tree.get("bank"), Some(&Node::Leaf("c3".to_string())));
    }

    #[test]
    fn test_key_entry_is_extracted_not_a_leaf() {
        let output = TreeBuilder::new()
            .require_key(true)
            .build(pairs(&[("_key", "sealed-key"), ("site", "c1")]))
            .unwrap();

        assert!(output.tree.get(KEY_ENTRY).is_none());
        assert_eq!(output.private_key.unwrap().expose(), "sealed-key");
        assert_eq!(output.tree.len(), 1);
    }

    #[test]
    fn test_nested_key_name_is_ordinary_entry() {
        let output = TreeBuilder::new()
            .build(pairs(&[("folder/_key", "c1")]))
            .unwrap();
        assert!(output.private_key.is_none());
        assert_eq!(output.tree.leaf("folder/_key"), Some("c1"));
    }

    #[test]
    fn test_missing_key_when_required() {
        let result = TreeBuilder::new()
            .require_key(true)
            .build(pairs(&[("site", "c1")]));
        assert!(matches!(result, Err(PassviewError::Data(_))));
    }

    #[test]
    fn test_missing_key_when_optional() {
        let output = TreeBuilder::new().build(pairs(&[("site", "c1")])).unwrap();
        assert!(output.private_key.is_none());
    }

    #[test]
    fn test_leaf_then_descendant_folder_wins() {
        let output = TreeBuilder::new()
            .build(pairs(&[("a", "x"), ("a/b", "y")]))
            .unwrap();

        assert_eq!(output.warnings.len(), 1);
        assert_eq!(
            output.warnings[0],
            StructuralWarning::LeafReplacedByFolder {
                path: "a".to_string(),
                entry: "a/b".to_string()
            }
        );
        assert_eq!(output.tree.leaf("a/b"), Some("y"));
        assert_eq!(output.tree.leaf_count(), 1);
    }

    #[test]
    fn test_descendant_then_leaf_folder_wins() {
        let output = TreeBuilder::new()
            .build(pairs(&[("a/b", "y"), ("a", "x")]))
            .unwrap();

        assert_eq!(output.warnings.len(), 1);
        assert_eq!(
            output.warnings[0],
            StructuralWarning::LeafShadowedByFolder {
                path: "a".to_string()
            }
        );
        assert_eq!(output.tree.leaf("a/b"), Some("y"));
        assert_eq!(output.tree.leaf_count(), 1);
    }

    #[test]
    fn test_deep_intermediate_conflict_reports_prefix() {
        let output = TreeBuilder::new()
            .build(pairs(&[("x/y", "leaf"), ("x/y/z/w", "deep")]))
            .unwrap();

        assert_eq!(
            output.warnings,
            vec![StructuralWarning::LeafReplacedByFolder {
                path: "x/y".to_string(),
                entry: "x/y/z/w".to_string()
            }]
        );
        assert_eq!(output.tree.leaf("x/y/z/w"), Some("deep"));
    }

    #[test]
    fn test_duplicate_path_last_write_wins() {
        let output = TreeBuilder::new()
            .build(pairs(&[("site", "old"), ("other", "o"), ("site", "new")]))
            .unwrap();

        assert_eq!(
            output.warnings,
            vec![StructuralWarning::DuplicateEntry {
                path: "site".to_string()
            }]
        );
        assert_eq!(output.tree.leaf("site"), Some("new"));
        // Overwriting keeps the original position.
        let names: Vec<&str> = output.tree.children().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["site", "other"]);
    }

    #[test]
    fn test_empty_path_skipped() {
        let output = TreeBuilder::new()
            .build(pairs(&[("", "c0"), ("ok", "c1")]))
            .unwrap();
        assert_eq!(output.warnings, vec![StructuralWarning::EmptyPath]);
        assert_eq!(output.tree.len(), 1);
    }

    #[test]
    fn test_flatten_round_trip() {
        let mut flat = IndexMap::new();
        flat.insert("a/b/c".to_string(), "1".to_string());
        flat.insert("a/d".to_string(), "2".to_string());
        flat.insert("e".to_string(), "3".to_string());
        flat.insert("f/g".to_string(), "4".to_string());
        flat.insert("a/b/h".to_string(), "5".to_string());

        let output = TreeBuilder::new().build(flat.clone()).unwrap();
        let rebuilt = output.tree.flatten();

        assert_eq!(rebuilt.len(), flat.len());
        for (path, value) in &flat {
            assert_eq!(rebuilt.get(path), Some(value), "path {}", path);
        }
    }

    #[test]
    fn test_leaf_contents_independent_of_order() {
        let forward = pairs(&[("a", "x"), ("a/b", "y"), ("c/d", "z"), ("c", "w")]);
        let mut backward = forward.clone();
        backward.reverse();

        let one = TreeBuilder::new().build(forward).unwrap().tree.flatten();
        let two = TreeBuilder::new().build(backward).unwrap().tree.flatten();

        assert_eq!(one.len(), two.len());
        for (path, value) in &one {
            assert_eq!(two.get(path), Some(value));
        }
    }

    #[test]
    fn test_warning_display() {
        let warning = StructuralWarning::DuplicateEntry {
            path: "site".to_string(),
        };
        assert!(warning.to_string().contains("\"site\""));
    }
}
