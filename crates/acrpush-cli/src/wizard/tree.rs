//! The wizard's choice tree.
//!
//! Nodes are addressed by [`NodePath`], the child indices from the root.
//! Children are filled in lazily by the wizard when a node is activated.

use acrpush_cloud::Registry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Registry(Registry),
    Repository(String),
    RepositoryCustom,
    Tag(String),
    TagCustom,
    Dockerfile(String),
    DockerfileCustom,
    Context(String),
    ContextCustom,
    ContextCurrentDirectory,
    Confirm,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub label: String,
    pub children: Vec<Node>,
    pub expanded: bool,
    pub loading: bool,
    pub awaiting_input: bool,
}

/// One line of the flattened tree as it should be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub path: NodePath,
    pub depth: usize,
    pub label: String,
    pub has_children: bool,
    pub expanded: bool,
}

impl Node {
    pub fn new(kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            children: Vec::new(),
            expanded: false,
            loading: false,
            awaiting_input: false,
        }
    }

    /// Label with the transient state markers appended.
    pub fn display_label(&self) -> String {
        let mut label = self.label.clone();
        if self.loading {
            label.push_str(" [loading]");
        }
        if self.awaiting_input {
            label.push_str(" [input]");
        }
        label
    }

    pub fn get(&self, path: &NodePath) -> Option<&Node> {
        path.0
            .iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        path.0
            .iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Swap in freshly loaded children and show them.
    pub fn set_children(&mut self, children: Vec<Node>) {
        self.children = children;
        self.expanded = true;
    }

    /// Collapse this node and everything below it.
    pub fn collapse(&mut self) {
        self.expanded = false;
        for child in &mut self.children {
            child.collapse();
        }
    }

    /// Collapse the siblings of `path` and every top-level branch it is not
    /// part of, so only one root-to-leaf path stays open.
    pub fn collapse_unrelated(&mut self, path: &NodePath) {
        let Some((&own, parent)) = path.0.split_last() else {
            return;
        };

        if let Some(&top) = path.0.first() {
            for (i, branch) in self.children.iter_mut().enumerate() {
                if i != top {
                    branch.collapse();
                }
            }
        }

        if let Some(parent) = self.get_mut(&NodePath(parent.to_vec())) {
            for (i, sibling) in parent.children.iter_mut().enumerate() {
                if i != own {
                    sibling.collapse();
                }
            }
        }
    }

    /// The rows currently visible, in display order.
    pub fn visible(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        self.push_rows(NodePath::root(), &mut rows);
        rows
    }

    fn push_rows(&self, path: NodePath, rows: &mut Vec<Row>) {
        rows.push(Row {
            depth: path.depth(),
            path: path.clone(),
            label: self.display_label(),
            has_children: !self.children.is_empty(),
            expanded: self.expanded,
        });
        if self.expanded {
            for (i, child) in self.children.iter().enumerate() {
                child.push_rows(path.child(i), rows);
            }
        }
    }
}
