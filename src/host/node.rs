//! Node - Minimal in-memory node tree.
//!
//! Views render into `Node`s and roots are `Node`s. A node is a shared handle
//! (`Rc<RefCell<..>>`); cloning it clones the handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::types::RootMode;

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root allocated for an element (shadow root or light children).
    Root(RootMode),
    Element(String),
    Text(String),
}

struct NodeData {
    kind: NodeKind,
    attributes: IndexMap<String, String>,
    children: Vec<Node>,
    parent: Weak<RefCell<NodeData>>,
}

/// Shared node handle.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

impl Node {
    fn from_kind(kind: NodeKind) -> Self {
        Node(Rc::new(RefCell::new(NodeData {
            kind,
            attributes: IndexMap::new(),
            children: Vec::new(),
            parent: Weak::new(),
        })))
    }

    pub fn root(mode: RootMode) -> Self {
        Self::from_kind(NodeKind::Root(mode))
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Self::from_kind(NodeKind::Element(tag.into()))
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::from_kind(NodeKind::Text(content.into()))
    }

    pub fn kind(&self) -> NodeKind {
        self.0.borrow().kind.clone()
    }

    /// Builder form of [`Node::set_attribute`].
    pub fn attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`Node::append_child`].
    pub fn child(self, child: Node) -> Self {
        self.append_child(child);
        self
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    /// Append `child`, detaching it from any previous parent first.
    pub fn append_child(&self, child: Node) {
        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child);
    }

    /// Remove this node from its parent, if any.
    pub fn detach(&self) {
        let parent = self.0.borrow().parent.upgrade();
        if let Some(parent) = parent {
            parent
                .borrow_mut()
                .children
                .retain(|c| !Rc::ptr_eq(&c.0, &self.0));
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    /// Detach every child.
    pub fn clear_children(&self) {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in children {
            child.0.borrow_mut().parent = Weak::new();
        }
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(text) => text.clone(),
            _ => data.children.iter().map(Node::text_content).collect(),
        }
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Node")
            .field("kind", &data.kind)
            .field("attributes", &data.attributes)
            .field("children", &data.children)
            .finish()
    }
}
