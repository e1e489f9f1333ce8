mod forest;
mod index;

pub use forest::Forest;
pub use index::HDIndex;

use crate::node::{Branch, Leaf};

/// Callbacks for a depth first traversal of the full tree.
///
/// Every branch visits its left subtree then its right subtree, and each
/// subtree receives its own copy of the cursor taken after the callback
/// that precedes it. Callbacks default to doing nothing.
/// * `pre_order` - before the left subtree.
/// * `in_order` - between the subtrees.
/// * `post_order` - after the right subtree.
/// * `leaf` - at every leaf.
pub trait Visitor {
    /// Per subtree state handed down the traversal.
    type Cursor: Clone;

    fn pre_order(&mut self, _branch: &Branch, _cursor: &mut Self::Cursor) {}

    fn in_order(&mut self, _branch: &Branch, _cursor: &mut Self::Cursor) {}

    fn post_order(&mut self, _branch: &Branch, _cursor: &mut Self::Cursor) {}

    fn leaf(&mut self, _leaf: &Leaf, _cursor: &mut Self::Cursor) {}
}

/// Collects leaves in key order.
#[derive(Debug, Default)]
pub(crate) struct Leaves(pub(crate) Vec<Leaf>);

impl Visitor for Leaves {
    type Cursor = ();

    fn leaf(&mut self, leaf: &Leaf, _cursor: &mut ()) {
        self.0.push(leaf.clone());
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Gutter {
    last: bool,
    indent: String,
    /// Depth of the enclosing branch, `None` above the root.
    depth: Option<u8>,
}

impl Default for Gutter {
    fn default() -> Self {
        Self {
            last: true,
            indent: String::new(),
            depth: None,
        }
    }
}

impl Gutter {
    fn prefix(&self) -> &'static str {
        if self.last {
            " └─ "
        } else {
            " ├─ "
        }
    }
}

/// Renders the tree as indented lines, one per node.
#[derive(Debug, Default)]
pub(crate) struct Drawing(pub(crate) Vec<String>);

impl Visitor for Drawing {
    type Cursor = Gutter;

    fn pre_order(&mut self, branch: &Branch, cursor: &mut Gutter) {
        self.0
            .push(format!("{}{}{}", cursor.indent, cursor.prefix(), branch.depth()));
        cursor
            .indent
            .push_str(if cursor.last { "  " } else { " │" });
        cursor.depth = Some(branch.depth());
        cursor.last = false;
    }

    fn in_order(&mut self, _branch: &Branch, cursor: &mut Gutter) {
        cursor.last = true;
    }

    /// Leaves show their key in hex and in binary, the binary form split
    /// where the key leaves its parent branch.
    fn leaf(&mut self, leaf: &Leaf, cursor: &mut Gutter) {
        let key = leaf.key();
        let bin = match cursor.depth {
            Some(depth) => key.to_bin_split(true, depth.into()),
            None => Ok(key.to_bin(true)),
        };
        self.0.push(format!(
            "{}{}{} {}",
            cursor.indent,
            cursor.prefix(),
            key.to_hex(true),
            bin.unwrap_or_default()
        ));
    }
}
