//! Deterministic text form of a graph.
//!
//! Output is Graphviz DOT: one declaration per node in index order, annotated
//! with its domain category, then one line per edge in insertion order.
//!
//! ```text
//! digraph G {
//! 	Queue_0 [category=Source];
//! 	QueueAxiom_3 [category=Correspondence, default=true];
//! 	Queue_0 -> Function_2 [label=Triggers];
//! 	QueueAxiom_3 -> Queue_0;
//! }
//! ```
//!
//! Stable for identical graphs, so suitable for golden comparisons. Names,
//! node labels and edge labels that are not bare DOT identifiers are written
//! as quoted strings.

use std::borrow::Cow;
use std::fmt;

use super::Graph;

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph {} {{", dot_id(self.name().unwrap_or("G")))?;

        for node in &self.nodes {
            write!(f, "\t{} [category={}", dot_id(&node.label()), node.domain.category())?;
            if node.is_default {
                write!(f, ", default=true")?;
            }
            writeln!(f, "];")?;
        }

        for edge in &self.edges {
            let (from, to) = (self.record(edge.from).label(), self.record(edge.to).label());
            let (from, to) = (dot_id(&from), dot_id(&to));
            match &edge.edge_type {
                Some(t) => writeln!(f, "\t{} -> {} [label={}];", from, to, dot_id(t))?,
                None => writeln!(f, "\t{} -> {};", from, to)?,
            }
        }

        write!(f, "}}")
    }
}

/// `name` as a DOT identifier: bare when it is one, quoted otherwise.
fn dot_id(name: &str) -> Cow<'_, str> {
    let bare = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if bare {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\"")))
    }
}

impl Graph {
    /// Render as DOT text.
    pub fn to_dot(&self) -> String {
        self.to_string()
    }
}
