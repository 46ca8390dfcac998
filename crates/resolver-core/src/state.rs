use std::fmt;

use indexmap::IndexMap;

use crate::criterion::{Criterion, RequirementInformation};
use crate::provider::DependencyProvider;

/// A snapshot of the resolution branch at one point in the backtracking
/// search: which identifiers are pinned so far, and what is known about
/// every identifier that has been touched by a requirement.
///
/// States are pushed onto the resolver's stack one per successful pin (or
/// per round that added requirements without pinning anything new, when a
/// round discovers fresh identifiers but cannot yet satisfy all of them).
/// Backtracking pops states off this stack; [`crate::Resolver`] never
/// mutates a state still reachable from an earlier stack frame, so popped
/// states remain valid to consult for backjump bookkeeping.
pub struct State<P: DependencyProvider> {
    mapping: IndexMap<P::Identifier, P::Candidate>,
    criteria: IndexMap<P::Identifier, Criterion<P>>,
    backtrack_causes: Vec<RequirementInformation<P>>,
}

impl<P: DependencyProvider> Clone for State<P> {
    fn clone(&self) -> Self {
        Self {
            mapping: self.mapping.clone(),
            criteria: self.criteria.clone(),
            backtrack_causes: self.backtrack_causes.clone(),
        }
    }
}

impl<P: DependencyProvider> fmt::Debug for State<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("mapping", &self.mapping)
            .field("criteria", &self.criteria)
            .field("backtrack_causes", &self.backtrack_causes)
            .finish()
    }
}

impl<P: DependencyProvider> State<P> {
    /// The empty state: nothing pinned, nothing known, no backtrack causes
    /// (this is the initial state, per `spec.md` §3: "empty on the initial
    /// state").
    pub fn empty() -> Self {
        Self {
            mapping: IndexMap::new(),
            criteria: IndexMap::new(),
            backtrack_causes: Vec::new(),
        }
    }

    /// The candidates pinned so far, in pinning order.
    pub fn mapping(&self) -> &IndexMap<P::Identifier, P::Candidate> {
        &self.mapping
    }

    /// The criterion accumulated for every identifier touched so far.
    pub fn criteria(&self) -> &IndexMap<P::Identifier, Criterion<P>> {
        &self.criteria
    }

    /// The criterion for `identifier`, if it has been touched.
    pub fn criterion(&self, identifier: &P::Identifier) -> Option<&Criterion<P>> {
        self.criteria.get(identifier)
    }

    /// The candidate pinned for `identifier`, if any.
    pub fn pinned(&self, identifier: &P::Identifier) -> Option<&P::Candidate> {
        self.mapping.get(identifier)
    }

    /// Replaces (or inserts) the criterion for `identifier`.
    pub fn set_criterion(&mut self, identifier: P::Identifier, criterion: Criterion<P>) {
        self.criteria.insert(identifier, criterion);
    }

    /// Pins `candidate` for `identifier`, overwriting any previous pin.
    pub fn pin(&mut self, identifier: P::Identifier, candidate: P::Candidate) {
        self.mapping.insert(identifier, candidate);
    }

    /// The Φ blamed for the most recent conflict that led to this state, in
    /// the order each entry was first blamed. Empty on the initial state and
    /// on every state reached without ever backjumping.
    pub fn backtrack_causes(&self) -> &[RequirementInformation<P>] {
        &self.backtrack_causes
    }

    /// Records `causes` as the Φ that produced this state via backjumping
    /// (`spec.md` §4.4 step 6: "Set `top.backtrack_causes := Φ`").
    pub fn set_backtrack_causes(&mut self, causes: Vec<RequirementInformation<P>>) {
        self.backtrack_causes = causes;
    }

    /// Whether every identifier with a criterion is also pinned, i.e. the
    /// branch is a complete, consistent resolution.
    pub fn is_complete(&self) -> bool {
        self.mapping.len() == self.criteria.len()
    }

    /// The identifiers with a criterion but no pin yet, in first-seen order.
    pub fn unsatisfied_identifiers(&self) -> impl Iterator<Item = &P::Identifier> + '_ {
        self.criteria
            .keys()
            .filter(move |identifier| !self.mapping.contains_key(*identifier))
    }
}
