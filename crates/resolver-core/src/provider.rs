use std::fmt::Debug;
use std::hash::Hash;

use crate::views::{IncompatibilitiesView, RequirementsView, ResolverView};

/// The domain oracle the resolution engine is built on top of.
///
/// A `DependencyProvider` owns the package universe: it is the only thing in
/// this crate that knows what a "candidate" or a "requirement" actually
/// means. The engine treats [`Self::Requirement`] and [`Self::Candidate`] as
/// opaque values and only ever calls into the provider to identify them,
/// compare them, enumerate matches, and list dependencies.
///
/// Implementations are expected to be pure with respect to the current
/// package universe: calling the same method with the same arguments twice
/// should yield the same result within one resolution.
pub trait DependencyProvider {
    /// The token that equates a requirement with the candidates that can
    /// satisfy it. Two requirements or candidates that describe the same
    /// package (and, if applicable, the same extras) must map to the same
    /// identifier.
    type Identifier: Clone + Eq + Hash + Debug;

    /// A constraint on candidates for one identifier.
    type Requirement: Clone + Debug;

    /// A concrete choice for an identifier.
    type Candidate: Clone + Debug + PartialEq;

    /// A totally ordered key used to decide which unsatisfied identifier to
    /// pin next. Smaller keys are pinned earlier.
    type PreferenceKey: Ord;

    /// Returns the identifier described by a requirement.
    fn identify_requirement(&self, requirement: &Self::Requirement) -> Self::Identifier;

    /// Returns the identifier described by a candidate.
    fn identify_candidate(&self, candidate: &Self::Candidate) -> Self::Identifier;

    /// Returns whether `candidate` satisfies `requirement`.
    fn is_satisfied_by(&self, requirement: &Self::Requirement, candidate: &Self::Candidate)
        -> bool;

    /// Returns the dependency requirements introduced by pinning `candidate`.
    fn get_dependencies(&self, candidate: &Self::Candidate) -> Vec<Self::Requirement>;

    /// Returns the candidates for `identifier`, in preferred pinning order,
    /// filtered to those that satisfy every currently active requirement and
    /// excluding everything already known to be incompatible.
    fn find_matches(
        &self,
        identifier: &Self::Identifier,
        requirements: &RequirementsView<'_, Self>,
        incompatibilities: &IncompatibilitiesView<'_, Self>,
    ) -> Vec<Self::Candidate>;

    /// Returns the preference key used to order `identifier` among the other
    /// unsatisfied identifiers considered this round. Must be stable.
    /// `view` exposes the resolutions and criteria seen so far, plus
    /// [`ResolverView::backtrack_causes`] — the Φ blamed for the most recent
    /// conflict — so a provider can bias toward identifiers implicated in
    /// the last backjump.
    fn get_preference(
        &self,
        identifier: &Self::Identifier,
        view: &ResolverView<'_, Self>,
    ) -> Self::PreferenceKey;

    /// Narrows the set of unsatisfied identifiers the engine will choose
    /// from this round. The default implementation considers every
    /// unsatisfied identifier; providers may override this to, for example,
    /// prefer identifiers with zero or one remaining candidate, or
    /// identifiers named in `view.backtrack_causes()`.
    fn narrow_requirement_selection(
        &self,
        identifiers: &[Self::Identifier],
        _view: &ResolverView<'_, Self>,
    ) -> Vec<Self::Identifier> {
        identifiers.to_vec()
    }
}
