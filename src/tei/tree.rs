/*!
 * Arena-backed XML document tree.
 *
 * Nodes live in one vector and refer to each other through `NodeId` handles,
 * which keeps parent links cheap and lets the parser hold several insertion
 * points at once. Detached nodes stay in the arena but are unreachable from
 * the root.
 */

/// Handle of a node inside a `DocumentTree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(String),
    Comment,
}

/// One entry in a node's ordered content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Text(String),
    Node(NodeId),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    attrs: Vec<(String, String)>,
    children: Vec<Child>,
    parent: Option<NodeId>,
}

/// An ordered XML tree with a single root element
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl DocumentTree {
    pub fn new(root_name: &str) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.alloc(NodeKind::Element(root_name.to_string()), None);
        tree
    }

    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            attrs: Vec::new(),
            children: Vec::new(),
            parent,
        });
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Append a new element as the last child of `parent`
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = self.alloc(NodeKind::Element(name.to_string()), Some(parent));
        self.nodes[parent.0].children.push(Child::Node(id));
        id
    }

    /// Append an element carrying a single text child
    pub fn append_text_element(&mut self, parent: NodeId, name: &str, text: &str) -> NodeId {
        let id = self.append_element(parent, name);
        self.append_text(id, text);
        id
    }

    /// Append a new comment node as the last child of `parent`
    pub fn append_comment(&mut self, parent: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Comment, Some(parent));
        self.nodes[parent.0].children.push(Child::Node(id));
        id
    }

    /// Append text, extending a trailing text child if there is one
    pub fn append_text(&mut self, node: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        let children = &mut self.nodes[node.0].children;
        match children.last_mut() {
            Some(Child::Text(existing)) => existing.push_str(text),
            _ => children.push(Child::Text(text.to_string())),
        }
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    /// Element name, `None` for comments
    pub fn name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(name) => Some(name),
            NodeKind::Comment => None,
        }
    }

    pub fn is_element(&self, node: NodeId, name: &str) -> bool {
        self.name(node) == Some(name)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[Child] {
        &self.nodes[node.0].children
    }

    /// Child nodes, text skipped
    pub fn child_nodes(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[node.0].children.iter().filter_map(|c| match c {
            Child::Node(id) => Some(*id),
            Child::Text(_) => None,
        })
    }

    pub fn attrs(&self, node: NodeId) -> &[(String, String)] {
        &self.nodes[node.0].attrs
    }

    pub fn attr(&self, node: NodeId, key: &str) -> Option<&str> {
        self.nodes[node.0]
            .attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping its position when it already exists
    pub fn set_attr(&mut self, node: NodeId, key: &str, value: &str) {
        let attrs = &mut self.nodes[node.0].attrs;
        match attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => attrs.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, key: &str) -> Option<String> {
        let attrs = &mut self.nodes[node.0].attrs;
        let index = attrs.iter().position(|(k, _)| k == key)?;
        Some(attrs.remove(index).1)
    }

    pub fn clear_attrs(&mut self, node: NodeId) {
        self.nodes[node.0].attrs.clear();
    }

    /// Concatenated text of the node and all its descendants
    pub fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        for child in &self.nodes[node.0].children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Node(id) => self.collect_text(*id, out),
            }
        }
    }

    /// Remove all children of a node
    pub fn clear(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            if let Child::Node(id) = child {
                self.nodes[id.0].parent = None;
            }
        }
    }

    /// Replace the node's text children; `None` from `f` drops the text
    pub fn map_text_children<F>(&mut self, node: NodeId, mut f: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        self.nodes[node.0].children = children
            .into_iter()
            .filter_map(|child| match child {
                Child::Text(text) => f(&text).map(Child::Text),
                node @ Child::Node(_) => Some(node),
            })
            .collect();
    }

    /// The node and its descendants in document order
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            result.push(current);
            let nested: Vec<NodeId> = self.child_nodes(current).collect();
            stack.extend(nested.into_iter().rev());
        }
        result
    }

    /// Descendant elements with the given name, in document order
    pub fn elements_named(&self, node: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|id| self.is_element(*id, name))
            .collect()
    }

    /// First descendant element with the given name
    pub fn find_first(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(node)
            .into_iter()
            .find(|id| self.is_element(*id, name))
    }
}
