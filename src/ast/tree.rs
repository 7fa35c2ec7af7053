//! In-memory [`AstFactory`] that stores nodes in an arena and renders them
//! as S-expressions.

use smallvec::SmallVec;

use super::{
    ArrayHandle, AstFactory, Child, FactoryError, FactoryResult, Literal, NodeHandle, NodeKind,
    Operator,
};

/// An arena slot
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Node {
        kind: NodeKind,
        children: SmallVec<[NodeHandle; 4]>,
    },
    Constant(Literal),
    Operator(Operator),
}

enum RenderStep {
    Node {
        node: NodeHandle,
        indent: Option<usize>,
        gap: Gap,
    },
    Close,
}

/// Separator written before a rendered child
enum Gap {
    None,
    Space,
    Line(usize),
}

/// Arena-backed factory
///
/// `print` renders the node and appends it to [`printed`](Self::printed).
#[derive(Debug, Clone, Default)]
pub struct TreeFactory {
    entries: Vec<Entry>,
    arrays: Vec<Vec<NodeHandle>>,
    printed: Vec<String>,
    limit: Option<usize>,
}

impl TreeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory that fails with [`FactoryError::CapacityExceeded`] after
    /// `limit` entries
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Number of entries allocated so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, node: NodeHandle) -> Option<&Entry> {
        self.entries.get(node.index() as usize)
    }

    /// Kind of a node; constants report [`NodeKind::Constant`], operators `None`
    pub fn kind(&self, node: NodeHandle) -> Option<NodeKind> {
        match self.entry(node)? {
            Entry::Node { kind, .. } => Some(*kind),
            Entry::Constant(_) => Some(NodeKind::Constant),
            Entry::Operator(_) => None,
        }
    }

    pub fn children(&self, node: NodeHandle) -> &[NodeHandle] {
        match self.entry(node) {
            Some(Entry::Node { children, .. }) => children,
            _ => &[],
        }
    }

    pub fn child(&self, node: NodeHandle, index: usize) -> Option<NodeHandle> {
        self.children(node).get(index).copied()
    }

    pub fn literal(&self, node: NodeHandle) -> Option<&Literal> {
        match self.entry(node)? {
            Entry::Constant(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn operator(&self, node: NodeHandle) -> Option<Operator> {
        match self.entry(node)? {
            Entry::Operator(op) => Some(*op),
            _ => None,
        }
    }

    /// Everything handed to `print`, in order
    pub fn printed(&self) -> &[String] {
        &self.printed
    }

    pub fn take_printed(&mut self) -> Vec<String> {
        std::mem::take(&mut self.printed)
    }

    /// Single-line S-expression rendering
    pub fn render(&self, node: NodeHandle) -> FactoryResult<String> {
        let mut out = String::new();
        self.render_into(node, None, &mut out)?;
        Ok(out)
    }

    /// Rendering with one block statement per line
    pub fn render_pretty(&self, node: NodeHandle) -> FactoryResult<String> {
        let mut out = String::new();
        self.render_into(node, Some(0), &mut out)?;
        Ok(out)
    }

    fn render_into(
        &self,
        root: NodeHandle,
        indent: Option<usize>,
        out: &mut String,
    ) -> FactoryResult<()> {
        // Explicit work stack; expression chains can nest arbitrarily deep
        let mut stack = vec![RenderStep::Node {
            node: root,
            indent,
            gap: Gap::None,
        }];
        while let Some(step) = stack.pop() {
            let (node, indent, gap) = match step {
                RenderStep::Close => {
                    out.push(')');
                    continue;
                }
                RenderStep::Node { node, indent, gap } => (node, indent, gap),
            };
            match gap {
                Gap::None => {}
                Gap::Space => out.push(' '),
                Gap::Line(depth) => {
                    out.push('\n');
                    out.push_str(&"  ".repeat(depth));
                }
            }
            match self.entry(node).ok_or(FactoryError::UnknownNode(node))? {
                Entry::Constant(lit) => out.push_str(&lit.to_string()),
                Entry::Operator(op) => out.push_str(op.as_str()),
                Entry::Node { kind, children } => {
                    out.push('(');
                    out.push_str(kind.as_str());
                    stack.push(RenderStep::Close);
                    let multiline = indent.filter(|_| *kind == NodeKind::BlockStmt);
                    for &child in children.iter().rev() {
                        stack.push(match multiline {
                            Some(depth) => RenderStep::Node {
                                node: child,
                                indent: Some(depth + 1),
                                gap: Gap::Line(depth + 1),
                            },
                            None => RenderStep::Node {
                                node: child,
                                indent,
                                gap: Gap::Space,
                            },
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn alloc(&mut self, entry: Entry) -> FactoryResult<NodeHandle> {
        if self.limit.is_some_and(|limit| self.entries.len() >= limit) {
            return Err(FactoryError::CapacityExceeded);
        }
        let index = u32::try_from(self.entries.len()).map_err(|_| FactoryError::CapacityExceeded)?;
        self.entries.push(entry);
        Ok(NodeHandle::new(index))
    }

    fn check(&self, node: NodeHandle) -> FactoryResult<NodeHandle> {
        if (node.index() as usize) < self.entries.len() {
            Ok(node)
        } else {
            Err(FactoryError::UnknownNode(node))
        }
    }
}

impl AstFactory for TreeFactory {
    fn make_node(&mut self, kind: NodeKind, children: &[Child]) -> FactoryResult<NodeHandle> {
        let mut flat = SmallVec::new();
        for child in children {
            match *child {
                Child::Node(node) => flat.push(self.check(node)?),
                Child::Array(array) => {
                    let nodes = self
                        .arrays
                        .get(array.index() as usize)
                        .ok_or(FactoryError::UnknownArray(array))?;
                    flat.extend(nodes.iter().copied());
                }
            }
        }
        self.alloc(Entry::Node {
            kind,
            children: flat,
        })
    }

    fn make_constant(&mut self, value: Literal) -> FactoryResult<NodeHandle> {
        self.alloc(Entry::Constant(value))
    }

    fn make_operator(&mut self, op: Operator) -> FactoryResult<NodeHandle> {
        self.alloc(Entry::Operator(op))
    }

    fn make_array(&mut self, nodes: Vec<NodeHandle>) -> FactoryResult<ArrayHandle> {
        for &node in &nodes {
            self.check(node)?;
        }
        let index = u32::try_from(self.arrays.len()).map_err(|_| FactoryError::CapacityExceeded)?;
        self.arrays.push(nodes);
        Ok(ArrayHandle::new(index))
    }

    fn print(&mut self, node: NodeHandle) -> FactoryResult<()> {
        let text = self.render_pretty(node)?;
        self.printed.push(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested_nodes() {
        let mut tree = TreeFactory::new();
        let name = tree.make_constant(Literal::from("x")).unwrap();
        let var = tree.make_node(NodeKind::Var, &[name.into()]).unwrap();
        let one = tree.make_constant(Literal::I32(1)).unwrap();
        let assign = tree
            .make_node(NodeKind::Assign, &[var.into(), one.into()])
            .unwrap();
        assert_eq!(tree.render(assign).unwrap(), "(ASSIGN (VAR \"x\") 1)");
        assert_eq!(tree.kind(assign), Some(NodeKind::Assign));
        assert_eq!(tree.children(assign), &[var, one]);
    }

    #[test]
    fn test_arrays_are_spliced() {
        let mut tree = TreeFactory::new();
        let a = tree.make_constant(Literal::I64(7)).unwrap();
        let b = tree.make_constant(Literal::U32(8)).unwrap();
        let array = tree.make_array(vec![a, b]).unwrap();
        let head = tree.make_constant(Literal::from("f")).unwrap();
        let call = tree
            .make_node(NodeKind::Call, &[head.into(), array.into()])
            .unwrap();
        assert_eq!(tree.children(call).len(), 3);
        assert_eq!(tree.render(call).unwrap(), "(CALL \"f\" 7L 8u)");
    }

    #[test]
    fn test_empty_and_operator_rendering() {
        let mut tree = TreeFactory::new();
        let empty = tree.make_node(NodeKind::Empty, &[]).unwrap();
        let op = tree.make_operator(Operator::Add).unwrap();
        assert_eq!(tree.render(empty).unwrap(), "(EMPTY)");
        assert_eq!(tree.render(op).unwrap(), "OP_ADD");
        assert_eq!(tree.kind(op), None);
        assert_eq!(tree.operator(op), Some(Operator::Add));
    }

    #[test]
    fn test_print_renders_block_statements_one_per_line() {
        let mut tree = TreeFactory::new();
        let label = tree.make_constant(Literal::from("BLOCK #0")).unwrap();
        let ret = tree.make_node(NodeKind::Return, &[]).unwrap();
        let stmt = tree
            .make_node(NodeKind::LabelStmt, &[label.into(), ret.into()])
            .unwrap();
        let block = tree.make_node(NodeKind::BlockStmt, &[stmt.into()]).unwrap();
        tree.print(block).unwrap();
        assert_eq!(
            tree.printed(),
            &["(BLOCK_STMT\n  (LABEL_STMT \"BLOCK #0\" (RETURN)))".to_string()]
        );
        assert_eq!(tree.take_printed().len(), 1);
        assert!(tree.printed().is_empty());
    }

    #[test]
    fn test_foreign_handles_are_rejected() {
        let mut tree = TreeFactory::new();
        let bogus = NodeHandle::new(42);
        assert_eq!(
            tree.make_node(NodeKind::Var, &[bogus.into()]),
            Err(FactoryError::UnknownNode(bogus))
        );
        assert_eq!(
            tree.make_node(NodeKind::Var, &[ArrayHandle::new(3).into()]),
            Err(FactoryError::UnknownArray(ArrayHandle::new(3)))
        );
        assert!(tree.render(bogus).is_err());
    }

    #[test]
    fn test_capacity_limit() {
        let mut tree = TreeFactory::with_limit(1);
        assert!(tree.make_node(NodeKind::Empty, &[]).is_ok());
        assert_eq!(
            tree.make_node(NodeKind::Empty, &[]),
            Err(FactoryError::CapacityExceeded)
        );
    }

    #[test]
    fn test_render_deeply_nested_chain() {
        let mut tree = TreeFactory::new();
        let mut node = tree.make_constant(Literal::I32(0)).unwrap();
        for _ in 0..200_000 {
            node = tree.make_node(NodeKind::Return, &[node.into()]).unwrap();
        }
        let block = tree.make_node(NodeKind::BlockStmt, &[node.into()]).unwrap();

        let flat = tree.render(node).unwrap();
        assert_eq!(flat.len(), 200_000 * "(RETURN )".len() + 1);
        assert!(flat.starts_with("(RETURN (RETURN "));
        assert!(flat.ends_with(" 0))"));

        let pretty = tree.render_pretty(block).unwrap();
        assert!(pretty.starts_with("(BLOCK_STMT\n  (RETURN (RETURN "));
    }
}
