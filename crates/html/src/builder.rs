use crate::types::{Node, Token};

/// Build a document tree from a token stream.
pub fn build_document(tokens: &[Token]) -> Node {
    let mut arena = NodeArena::new();
    let root = arena.push(ArenaNode::Document {
        doctype: None,
        children: Vec::new(),
    });
    arena.fill(root, tokens);
    arena.into_node(root)
}

/// Build the child list of a fragment (`innerHTML`-style parsing). Doctype tokens are dropped.
pub fn build_fragment(tokens: &[Token]) -> Vec<Node> {
    let mut arena = NodeArena::new();
    let root = arena.push(ArenaNode::Element {
        name: String::new(),
        attributes: Vec::new(),
        children: Vec::new(),
    });
    arena.fill(root, tokens);
    arena.into_node(root).into_children()
}

#[derive(Debug)]
enum ArenaNode {
    Document {
        doctype: Option<String>,
        children: Vec<usize>,
    },
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<usize>,
    },
    Text(String),
    Comment(String),
}

impl ArenaNode {
    fn children(&self) -> &[usize] {
        match self {
            ArenaNode::Document { children, .. } | ArenaNode::Element { children, .. } => children,
            ArenaNode::Text(_) | ArenaNode::Comment(_) => &[],
        }
    }
}

#[derive(Debug)]
struct NodeArena {
    nodes: Vec<Option<ArenaNode>>,
}

impl NodeArena {
    fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, node: ArenaNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Some(node));
        index
    }

    fn add_child(&mut self, parent: usize, child: ArenaNode) -> usize {
        let index = self.push(child);
        match self.nodes[parent].as_mut() {
            Some(ArenaNode::Document { children, .. } | ArenaNode::Element { children, .. }) => {
                children.push(index);
            }
            _ => unreachable!("builder parent is always a container node"),
        }
        index
    }

    fn is_element_named(&self, index: usize, target: &str) -> bool {
        matches!(&self.nodes[index], Some(ArenaNode::Element { name, .. }) if name == target)
    }

    fn fill(&mut self, root: usize, tokens: &[Token]) {
        let mut open: Vec<usize> = Vec::new();
        for token in tokens {
            let parent = open.last().copied().unwrap_or(root);
            match token {
                Token::Doctype(doctype) => {
                    if let Some(ArenaNode::Document { doctype: slot, .. }) = self.nodes[root].as_mut() {
                        *slot = Some(doctype.clone());
                    }
                }
                Token::Comment(text) => {
                    self.add_child(parent, ArenaNode::Comment(text.clone()));
                }
                Token::Text(text) => {
                    if !text.is_empty() {
                        self.add_child(parent, ArenaNode::Text(text.clone()));
                    }
                }
                Token::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let index = self.add_child(
                        parent,
                        ArenaNode::Element {
                            name: name.clone(),
                            attributes: attributes.clone(),
                            children: Vec::new(),
                        },
                    );
                    if !*self_closing {
                        open.push(index);
                    }
                }
                Token::EndTag(name) => {
                    // Unmatched end tags are ignored; matched ones close everything above them.
                    if open.iter().any(|&i| self.is_element_named(i, name)) {
                        while let Some(index) = open.pop() {
                            if self.is_element_named(index, name) {
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    // Iterative post-order so deep markup cannot overflow the stack.
    fn into_node(mut self, root: usize) -> Node {
        let mut built: Vec<Node> = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, bool)> = vec![(root, false)];

        while let Some((index, visited)) = stack.pop() {
            if !visited {
                stack.push((index, true));
                if let Some(node) = &self.nodes[index] {
                    for &child in node.children().iter().rev() {
                        stack.push((child, false));
                    }
                }
                continue;
            }

            let Some(node) = self.nodes[index].take() else {
                continue;
            };
            let child_count = node.children().len();
            let children = built.split_off(built.len() - child_count);
            built.push(match node {
                ArenaNode::Document { doctype, .. } => Node::Document { doctype, children },
                ArenaNode::Element {
                    name, attributes, ..
                } => Node::Element {
                    name,
                    attributes,
                    children,
                },
                ArenaNode::Text(text) => Node::Text { text },
                ArenaNode::Comment(text) => Node::Comment { text },
            });
        }

        debug_assert_eq!(built.len(), 1, "builder must produce exactly one root");
        built.pop().unwrap_or(Node::Document {
            doctype: None,
            children: Vec::new(),
        })
    }
}
