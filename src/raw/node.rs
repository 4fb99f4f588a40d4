use super::handle::Handle;

/// Which child slot of a parent a node hangs from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A tree vertex.
///
/// The node owns nothing: `value` indexes the value arena and the three link
/// fields index the node arena. `parent` is a pure back-reference used for
/// in-order traversal and unlinking; only `left`/`right` describe the tree
/// shape.
#[derive(Clone)]
pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) value: Handle,
    pub(crate) parent: Option<Handle>,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
}

impl<K> Node<K> {
    pub(crate) const fn new(key: K, value: Handle, parent: Option<Handle>) -> Self {
        Self {
            key,
            value,
            parent,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) const fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}
