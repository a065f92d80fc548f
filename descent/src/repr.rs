//! Structural descriptions of grammars.
//!
//! [`Parser::display`](crate::Parser::display) walks a grammar graph and returns a
//! [`Repr`] tree. A node seen for the first time is [`Repr::Expanded`]; any later
//! occurrence is a [`Repr::BackRef`] carrying only its identity, which keeps the
//! description finite for recursive grammars.
//!
//! The serialized form is JSON, for example
//!
//! ```text
//! {"newRef":7,"value":{"or":[{"newRef":5,"value":{"literal":"a"}},{"oldRef":7}]}}
//! ```

use std::fmt;

use serde::Serialize;

use crate::parser::{NodeId, Visited};

/// A node of a grammar description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Repr {
    /// First occurrence of a node, with its full structure.
    Expanded {
        #[serde(rename = "newRef")]
        id: NodeId,
        value: Node,
    },
    /// Later occurrence of a node that was expanded earlier in the same description.
    BackRef {
        #[serde(rename = "oldRef")]
        id: NodeId,
    },
}

/// The kind tag of a grammar node together with its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Node {
    Literal(String),
    Pattern(String),
    Map(Box<Repr>),
    And(Box<Repr>, Box<Repr>),
    AndKeepLeft(Box<Repr>, Box<Repr>),
    AndKeepRight(Box<Repr>, Box<Repr>),
    Or(Box<Repr>, Box<Repr>),
    Optional(Box<Repr>),
    Star(Box<Repr>),
    Repeat { count: usize, inner: Box<Repr> },
    Named { name: String, inner: Box<Repr> },
    /// A recursive rule that could not be built.
    Unresolved,
}

impl Node {
    /// The direct children of this node, left to right.
    pub fn children(&self) -> Vec<&Repr> {
        match self {
            Node::Literal(_) | Node::Pattern(_) | Node::Unresolved => Vec::new(),
            Node::Map(inner)
            | Node::Optional(inner)
            | Node::Star(inner)
            | Node::Repeat { inner, .. }
            | Node::Named { inner, .. } => vec![inner],
            Node::And(left, right)
            | Node::AndKeepLeft(left, right)
            | Node::AndKeepRight(left, right)
            | Node::Or(left, right) => vec![left, right],
        }
    }

    /// The serialized kind tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Node::Literal(_) => "literal",
            Node::Pattern(_) => "pattern",
            Node::Map(_) => "map",
            Node::And(..) => "and",
            Node::AndKeepLeft(..) => "andKeepLeft",
            Node::AndKeepRight(..) => "andKeepRight",
            Node::Or(..) => "or",
            Node::Optional(_) => "optional",
            Node::Star(_) => "star",
            Node::Repeat { .. } => "repeat",
            Node::Named { .. } => "named",
            Node::Unresolved => "unresolved",
        }
    }
}

impl Repr {
    /// The identity this entry stands for.
    pub fn id(&self) -> NodeId {
        match self {
            Repr::Expanded { id, .. } | Repr::BackRef { id } => *id,
        }
    }

    /// The structure, if this is the expanded occurrence.
    pub fn node(&self) -> Option<&Node> {
        match self {
            Repr::Expanded { value, .. } => Some(value),
            Repr::BackRef { .. } => None,
        }
    }

    /// Visit every entry in pre-order, which is the order they were produced in.
    pub fn walk<'r>(&'r self, f: &mut impl FnMut(&'r Repr)) {
        f(self);
        if let Repr::Expanded { value, .. } = self {
            for child in value.children() {
                child.walk(f);
            }
        }
    }

    /// Whether each identity is expanded exactly once, and every back reference
    /// follows the expansion it refers to.
    pub fn is_well_formed(&self) -> bool {
        let mut expanded = Visited::default();
        let mut ok = true;
        self.walk(&mut |repr| match repr {
            Repr::Expanded { id, .. } => ok &= expanded.insert(*id),
            Repr::BackRef { id } => ok &= expanded.contains(id),
        });
        ok
    }

    /// Indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
