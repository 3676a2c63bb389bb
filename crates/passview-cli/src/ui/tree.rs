//! Folder tree listing.

use serde::Serialize;

use passview_core::{Folder, Node, Visibility};

use super::context::UiContext;
use super::theme::{styled, styles};

/// One displayed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeRow {
    pub path: String,
    pub name: String,
    pub depth: usize,
    pub folder: bool,
    pub expanded: bool,
}

/// Visible rows in tree order.
///
/// Children of a folder are listed only when the folder is expanded, either
/// by the query or by `expand_all`.
pub fn visible_rows(tree: &Folder, visibility: &Visibility, expand_all: bool) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    collect(tree, None, 0, visibility, expand_all, &mut rows);
    rows
}

fn collect(
    folder: &Folder,
    prefix: Option<&str>,
    depth: usize,
    visibility: &Visibility,
    expand_all: bool,
    rows: &mut Vec<TreeRow>,
) {
    for (name, node) in folder.children() {
        let path = match prefix {
            Some(prefix) => format!("{}/{}", prefix, name),
            None => name.to_string(),
        };
        if !visibility.is_visible(&path) {
            continue;
        }
        match node {
            Node::Leaf(_) => rows.push(TreeRow {
                path,
                name: name.to_string(),
                depth,
                folder: false,
                expanded: false,
            }),
            Node::Folder(child) => {
                let expanded = expand_all || visibility.is_expanded(&path);
                rows.push(TreeRow {
                    path: path.clone(),
                    name: name.to_string(),
                    depth,
                    folder: true,
                    expanded,
                });
                if expanded {
                    collect(child, Some(&path), depth + 1, visibility, expand_all, rows);
                }
            }
        }
    }
}

/// Render rows as indented lines.
pub fn render_rows(ctx: &UiContext, rows: &[TreeRow]) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);
            if row.folder {
                let marker = match (row.expanded, ctx.unicode) {
                    (true, true) => "\u{25BE}",
                    (false, true) => "\u{25B8}",
                    (true, false) => "-",
                    (false, false) => "+",
                };
                let name = styled(&format!("{}/", row.name), styles::folder(), ctx.color);
                format!("{}{} {}", indent, marker, name)
            } else {
                format!("{}  {}", indent, row.name)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::OutputMode;
    use passview_core::{compute_visibility, TreeBuilder};

    fn tree() -> Folder {
        let entries = [
            ("web/github", "c"),
            ("web/gitlab", "c"),
            ("web/mail/work", "c"),
            ("wifi", "c"),
        ];
        TreeBuilder::new()
            .build(
                entries
                    .iter()
                    .map(|(path, value)| (path.to_string(), value.to_string())),
            )
            .unwrap()
            .tree
    }

    fn paths(rows: &[TreeRow]) -> Vec<&str> {
        rows.iter().map(|row| row.path.as_str()).collect()
    }

    #[test]
    fn test_empty_query_lists_top_level_collapsed() {
        let tree = tree();
        let rows = visible_rows(&tree, &compute_visibility(&tree, ""), false);
        assert_eq!(paths(&rows), vec!["web", "wifi"]);
        assert!(!rows[0].expanded);
    }

    #[test]
    fn test_expand_all_lists_everything() {
        let tree = tree();
        let rows = visible_rows(&tree, &compute_visibility(&tree, ""), true);
        assert_eq!(
            paths(&rows),
            vec!["web", "web/github", "web/gitlab", "web/mail", "web/mail/work", "wifi"]
        );
        assert_eq!(rows[4].depth, 2);
    }

    #[test]
    fn test_query_expands_matching_ancestors() {
        let tree = tree();
        let rows = visible_rows(&tree, &compute_visibility(&tree, "GIT"), false);
        assert_eq!(paths(&rows), vec!["web", "web/github", "web/gitlab"]);
        assert!(rows[0].expanded);
    }

    #[test]
    fn test_render_ascii() {
        let tree = tree();
        let rows = visible_rows(&tree, &compute_visibility(&tree, "work"), false);
        let ctx = UiContext {
            color: false,
            unicode: false,
            mode: OutputMode::Plain,
        };
        assert_eq!(
            render_rows(&ctx, &rows),
            vec!["- web/", "  - mail/", "      work"]
        );
    }
}
