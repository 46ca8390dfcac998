use std::fmt;

use indexmap::IndexMap;

use crate::provider::DependencyProvider;
use crate::state::State;

/// One endpoint of a dependency edge in a [`ResolutionGraph`].
pub enum Node<P: DependencyProvider> {
    /// The virtual root that introduced the requirements passed directly to
    /// [`crate::Resolver::resolve`].
    Root,
    /// A pinned candidate.
    Candidate(P::Candidate),
}

impl<P: DependencyProvider> Clone for Node<P> {
    fn clone(&self) -> Self {
        match self {
            Self::Root => Self::Root,
            Self::Candidate(c) => Self::Candidate(c.clone()),
        }
    }
}

impl<P: DependencyProvider> PartialEq for Node<P> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Root, Self::Root) => true,
            (Self::Candidate(a), Self::Candidate(b)) => a == b,
            _ => false,
        }
    }
}

impl<P: DependencyProvider> fmt::Debug for Node<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "Root"),
            Self::Candidate(c) => write!(f, "Candidate({c:?})"),
        }
    }
}

/// The dependency graph backing a successful resolution: one node per
/// pinned candidate, plus a virtual [`Node::Root`], and one edge per
/// `(parent, requirement)` pair that was satisfied by a pinned candidate.
///
/// This graph is built purely for inspection and display. Self-referential
/// edges (a candidate depending, directly or through extras, on its own
/// identifier) are admitted rather than filtered, since they carry
/// information about why a package was pulled in even when they would be
/// redundant to *display* twice.
pub struct ResolutionGraph<P: DependencyProvider> {
    mapping: IndexMap<P::Identifier, P::Candidate>,
    edges: Vec<(Node<P>, P::Candidate)>,
}

impl<P: DependencyProvider> Clone for ResolutionGraph<P> {
    fn clone(&self) -> Self {
        Self {
            mapping: self.mapping.clone(),
            edges: self.edges.clone(),
        }
    }
}

impl<P: DependencyProvider> fmt::Debug for ResolutionGraph<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionGraph")
            .field("mapping", &self.mapping)
            .field("edges", &self.edges)
            .finish()
    }
}

impl<P: DependencyProvider> ResolutionGraph<P> {
    pub(crate) fn from_state(state: &State<P>) -> Self {
        let mapping = state.mapping().clone();
        let mut edges: Vec<(Node<P>, P::Candidate)> = Vec::new();

        for (identifier, criterion) in state.criteria() {
            let Some(candidate) = mapping.get(identifier) else {
                continue;
            };
            for info in criterion.information() {
                let parent = match &info.parent {
                    Some(parent) => Node::Candidate(parent.clone()),
                    None => Node::Root,
                };
                let edge = (parent, candidate.clone());
                if !edges.contains(&edge) {
                    edges.push(edge);
                }
            }
        }

        Self { mapping, edges }
    }

    /// The pinned candidate for every resolved identifier.
    pub fn mapping(&self) -> &IndexMap<P::Identifier, P::Candidate> {
        &self.mapping
    }

    /// The pinned candidate for `identifier`, if it was part of the
    /// resolution.
    pub fn candidate(&self, identifier: &P::Identifier) -> Option<&P::Candidate> {
        self.mapping.get(identifier)
    }

    /// Every `(parent, child)` dependency edge in the graph, where `parent`
    /// is [`Node::Root`] for a directly requested candidate.
    pub fn edges(&self) -> impl Iterator<Item = &(Node<P>, P::Candidate)> + '_ {
        self.edges.iter()
    }

    /// The candidates directly required by `parent` (or the root
    /// requirements, if `parent` is `None`).
    pub fn dependents_of(&self, parent: Option<&P::Candidate>) -> impl Iterator<Item = &P::Candidate> + '_ {
        let parent = match parent {
            Some(c) => Node::Candidate(c.clone()),
            None => Node::Root,
        };
        self.edges
            .iter()
            .filter(move |(p, _)| *p == parent)
            .map(|(_, child)| child)
    }
}
