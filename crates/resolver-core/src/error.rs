use std::fmt;

use crate::criterion::RequirementInformation;
use crate::provider::DependencyProvider;

/// Why [`crate::Resolver::resolve`] failed to produce a pinning.
///
/// Not a `thiserror` derive: every variant is generic over `P` and the
/// messages below only ever need `Debug` on its associated types, which
/// `thiserror`'s field-interpolation would require anyway — a hand-written
/// `Display` keeps that bound visible at the call site instead of hidden in
/// macro expansion.
pub enum ResolutionError<P: DependencyProvider> {
    /// The search space was exhausted: every candidate considered for some
    /// identifier eventually conflicted with some other requirement, and
    /// backjumping ran out of stack frames to pop.
    ///
    /// `causes` lists every `(requirement, parent)` pair that was blamed for
    /// a conflict at some point during the search (the union of Φ across
    /// every backjump), in the order each was first blamed. This is not
    /// necessarily a minimal unsatisfiable core, but it is always a superset
    /// of one.
    ResolutionImpossible {
        /// The accumulated conflict causes.
        causes: Vec<RequirementInformation<P>>,
    },

    /// The search exceeded [`crate::ResolverOptions::max_rounds`] without
    /// reaching a pinning or proving impossibility. This guards against
    /// providers whose `find_matches`/`get_dependencies` never converge; it
    /// should not trigger for a well-behaved finite package universe.
    ResolutionTooDeep {
        /// The configured round limit that was hit.
        round_count: usize,
    },

    /// [`DependencyProvider::find_matches`][crate::DependencyProvider::find_matches]
    /// returned `candidate` for `identifier` even though it does not satisfy
    /// one of the requirements it was supposed to have been filtered
    /// against. This is always a provider bug, never a resolvable conflict,
    /// so it is fatal rather than triggering backjumping.
    InconsistentCandidate {
        /// The identifier `candidate` was returned for.
        identifier: P::Identifier,
        /// The offending candidate.
        candidate: P::Candidate,
    },
}

impl<P: DependencyProvider> fmt::Debug for ResolutionError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResolutionImpossible { causes } => f
                .debug_struct("ResolutionImpossible")
                .field("causes", causes)
                .finish(),
            Self::ResolutionTooDeep { round_count } => f
                .debug_struct("ResolutionTooDeep")
                .field("round_count", round_count)
                .finish(),
            Self::InconsistentCandidate {
                identifier,
                candidate,
            } => f
                .debug_struct("InconsistentCandidate")
                .field("identifier", identifier)
                .field("candidate", candidate)
                .finish(),
        }
    }
}

impl<P: DependencyProvider> fmt::Display for ResolutionError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResolutionImpossible { causes } => write!(
                f,
                "no candidates satisfy the given requirements ({} conflicting requirement(s) involved)",
                causes.len()
            ),
            Self::ResolutionTooDeep { round_count } => {
                write!(f, "resolution did not converge within {round_count} round(s)")
            }
            Self::InconsistentCandidate { identifier, .. } => write!(
                f,
                "provider bug: find_matches returned a candidate for {identifier:?} that does not satisfy its own active requirements"
            ),
        }
    }
}

impl<P: DependencyProvider> std::error::Error for ResolutionError<P> {}
