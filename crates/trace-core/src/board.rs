//! Grouping components into boards.

use crate::session::{BoardId, ComponentId};

/// Anything that contains components: a single component, a collection, or
/// a user struct of sub-blocks.
///
/// ```
/// use trace_core::{Block, ComponentId};
///
/// struct Divider {
///     top: ComponentId,
///     bottom: ComponentId,
/// }
///
/// impl Block for Divider {
///     fn visit(&self, f: &mut dyn FnMut(ComponentId)) {
///         self.top.visit(f);
///         self.bottom.visit(f);
///     }
/// }
/// ```
pub trait Block {
    /// Call `f` for every component, in declaration order. Duplicates are
    /// fine; boards drop them.
    fn visit(&self, f: &mut dyn FnMut(ComponentId));
}

impl Block for ComponentId {
    fn visit(&self, f: &mut dyn FnMut(ComponentId)) {
        f(*self)
    }
}

impl<T: Block + ?Sized> Block for &T {
    fn visit(&self, f: &mut dyn FnMut(ComponentId)) {
        (**self).visit(f)
    }
}

impl<T: Block> Block for Option<T> {
    fn visit(&self, f: &mut dyn FnMut(ComponentId)) {
        if let Some(inner) = self {
            inner.visit(f)
        }
    }
}

impl<T: Block> Block for [T] {
    fn visit(&self, f: &mut dyn FnMut(ComponentId)) {
        for item in self {
            item.visit(f)
        }
    }
}

impl<T: Block, const N: usize> Block for [T; N] {
    fn visit(&self, f: &mut dyn FnMut(ComponentId)) {
        self.as_slice().visit(f)
    }
}

impl<T: Block> Block for Vec<T> {
    fn visit(&self, f: &mut dyn FnMut(ComponentId)) {
        self.as_slice().visit(f)
    }
}

/// A top-level collection of components, flattened from its blocks.
#[derive(Debug, Clone)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub(crate) components: Vec<ComponentId>,
}

impl Board {
    /// Components in visit order.
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        left: ComponentId,
        right: Option<ComponentId>,
    }

    impl Block for Pair {
        fn visit(&self, f: &mut dyn FnMut(ComponentId)) {
            self.left.visit(f);
            self.right.visit(f);
        }
    }

    #[test]
    fn nested_blocks_visit_in_order() {
        let pairs = vec![
            Pair {
                left: ComponentId(3),
                right: None,
            },
            Pair {
                left: ComponentId(1),
                right: Some(ComponentId(2)),
            },
        ];
        let mut seen = Vec::new();
        pairs.visit(&mut |c| seen.push(c.index()));
        assert_eq!(seen, [3, 1, 2]);
    }
}
