use std::path::{Path, PathBuf};

/// Index of a node inside its [`ContentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// A page in the reconstructed hierarchy
#[derive(Debug, Clone)]
pub struct DocumentTreeNode {
    /// Flat document name from the export
    pub identifier: String,
    /// Link text from the index, whitespace collapsed
    pub title: String,
    /// Directory segment derived from the identifier
    pub segment: String,
    /// Bullet nesting depth; the root is 0
    pub depth: usize,
    pub parent: Option<NodeId>,
    /// Children in bullet order
    pub children: Vec<NodeId>,
    path: PathBuf,
}

impl DocumentTreeNode {
    /// Directory this node stands for under the output root
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Arena of document nodes. Node 0 is the root and maps to the output root.
///
/// Paths are fixed when a node is inserted, so the tree never needs to walk
/// back up through parents after construction.
#[derive(Debug, Clone)]
pub struct ContentTree {
    nodes: Vec<DocumentTreeNode>,
}

impl ContentTree {
    pub fn new(root_identifier: &str, output_root: &Path) -> Self {
        let root = DocumentTreeNode {
            identifier: root_identifier.to_string(),
            title: root_identifier.to_string(),
            segment: root_identifier.to_string(),
            depth: 0,
            parent: None,
            children: Vec::new(),
            path: output_root.to_path_buf(),
        };
        Self { nodes: vec![root] }
    }

    /// Append a child under `parent`; its path is the parent's path plus `segment`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        identifier: &str,
        title: &str,
        segment: &str,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent_node = &self.nodes[parent.0];
        let node = DocumentTreeNode {
            identifier: identifier.to_string(),
            title: title.to_string(),
            segment: segment.to_string(),
            depth: parent_node.depth + 1,
            parent: Some(parent),
            children: Vec::new(),
            path: parent_node.path.join(segment),
        };
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root(&self) -> &DocumentTreeNode {
        &self.nodes[NodeId::ROOT.0]
    }

    pub fn root_dir(&self) -> &Path {
        self.root().path()
    }

    pub fn node(&self, id: NodeId) -> &DocumentTreeNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Whether `parent` already has a child using `segment`
    pub fn has_child_segment(&self, parent: NodeId, segment: &str) -> bool {
        self.children(parent)
            .iter()
            .any(|child| self.node(*child).segment == segment)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of pages below the root
    pub fn page_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// True when the index yielded no pages
    pub fn is_empty(&self) -> bool {
        self.page_count() == 0
    }

    /// Nodes in depth-first pre-order, starting at the root
    pub fn preorder(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![NodeId::ROOT],
        }
    }

    /// `/`-separated path of a node relative to the output root
    pub fn relative_path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            segments.push(self.node(current).segment.as_str());
            current = parent;
        }
        segments.reverse();
        segments.join("/")
    }

    /// Markdown file holding a node's content.
    ///
    /// Pages sit next to their own directory: `<parent dir>/<segment>.<ext>`.
    /// The root page is `<output root>/<root identifier>.<ext>`.
    pub fn page_file(&self, id: NodeId, extension: &str) -> PathBuf {
        let node = self.node(id);
        match node.parent {
            Some(parent) => self
                .node(parent)
                .path
                .join(format!("{}.{}", node.segment, extension)),
            None => node.path.join(format!("{}.{}", node.identifier, extension)),
        }
    }
}

pub struct PreOrder<'a> {
    tree: &'a ContentTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> ContentTree {
        let mut tree = ContentTree::new("index", Path::new("/out"));
        let a = tree.add_child(NodeId::ROOT, "A", "A", "A");
        tree.add_child(a, "A1", "A one", "A1");
        tree.add_child(a, "A2", "A two", "A2");
        tree.add_child(NodeId::ROOT, "B", "B", "B");
        tree
    }

    #[test]
    fn test_paths_follow_parents() {
        let tree = sample_tree();
        let ids: Vec<NodeId> = tree.preorder().collect();

        assert_eq!(tree.root_dir(), Path::new("/out"));
        assert_eq!(tree.node(ids[2]).path(), Path::new("/out/A/A1"));
        assert_eq!(tree.relative_path(ids[2]), "A/A1");
        assert_eq!(tree.relative_path(NodeId::ROOT), "");
        assert_eq!(tree.node(ids[2]).depth, 2);
    }

    #[test]
    fn test_preorder_keeps_sibling_order() {
        let tree = sample_tree();
        let names: Vec<&str> = tree
            .preorder()
            .map(|id| tree.node(id).identifier.as_str())
            .collect();

        assert_eq!(names, vec!["index", "A", "A1", "A2", "B"]);
    }

    #[test]
    fn test_page_files() {
        let tree = sample_tree();
        let ids: Vec<NodeId> = tree.preorder().collect();

        assert_eq!(tree.page_file(NodeId::ROOT, "md"), PathBuf::from("/out/index.md"));
        assert_eq!(tree.page_file(ids[1], "md"), PathBuf::from("/out/A.md"));
        assert_eq!(tree.page_file(ids[3], "md"), PathBuf::from("/out/A/A2.md"));
    }

    #[test]
    fn test_counts() {
        let tree = sample_tree();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.page_count(), 4);
        assert!(!tree.is_empty());
        assert!(ContentTree::new("index", Path::new("/out")).is_empty());
        assert!(tree.has_child_segment(NodeId::ROOT, "B"));
        assert!(!tree.has_child_segment(NodeId::ROOT, "A1"));
    }
}
