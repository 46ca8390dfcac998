use indexmap::IndexMap;

use crate::criterion::{Criterion, RequirementInformation};
use crate::provider::DependencyProvider;

/// A read-only window over the requirements active for one identifier,
/// passed to [`DependencyProvider::find_matches`][crate::DependencyProvider::find_matches].
///
/// The requirements for `identifier` are the ones currently being merged in
/// (not yet committed to the branch's criteria map), so this view overlays
/// them on top of the rest of the map rather than requiring the caller to
/// clone the whole map just to append one entry.
pub struct RequirementsView<'a, P: DependencyProvider + ?Sized> {
    base: &'a IndexMap<P::Identifier, Criterion<P>>,
    identifier: &'a P::Identifier,
    overlay: &'a [RequirementInformation<P>],
}

impl<'a, P: DependencyProvider + ?Sized> RequirementsView<'a, P> {
    pub(crate) fn new(
        base: &'a IndexMap<P::Identifier, Criterion<P>>,
        identifier: &'a P::Identifier,
        overlay: &'a [RequirementInformation<P>],
    ) -> Self {
        Self {
            base,
            identifier,
            overlay,
        }
    }

    /// Iterates the `(requirement, parent)` pairs active for `identifier`.
    ///
    /// When `identifier` is the one this view was built for, the in-flight
    /// overlay is returned; otherwise the committed criterion (if any) for
    /// that identifier is used.
    pub fn information_for(
        &self,
        identifier: &P::Identifier,
    ) -> Box<dyn Iterator<Item = (&P::Requirement, Option<&P::Candidate>)> + '_> {
        if identifier == self.identifier {
            Box::new(
                self.overlay
                    .iter()
                    .map(|info| (&info.requirement, info.parent.as_ref())),
            )
        } else {
            match self.base.get(identifier) {
                Some(criterion) => Box::new(
                    criterion
                        .information()
                        .iter()
                        .map(|info| (&info.requirement, info.parent.as_ref())),
                ),
                None => Box::new(std::iter::empty()),
            }
        }
    }

    /// Iterates just the requirements active for `identifier`.
    pub fn requirements_for(
        &self,
        identifier: &P::Identifier,
    ) -> Box<dyn Iterator<Item = &P::Requirement> + '_> {
        Box::new(self.information_for(identifier).map(|(req, _)| req))
    }

    /// The identifiers with at least one active requirement, including the
    /// one this view was built for (even if its overlay is still empty on
    /// the very first call).
    pub fn identifiers(&self) -> impl Iterator<Item = &P::Identifier> + '_ {
        std::iter::once(self.identifier).chain(
            self.base
                .keys()
                .filter(move |id| *id != self.identifier),
        )
    }
}

/// A read-only window over the candidates already known to be invalid for
/// each identifier, passed to
/// [`DependencyProvider::find_matches`][crate::DependencyProvider::find_matches].
pub struct IncompatibilitiesView<'a, P: DependencyProvider + ?Sized> {
    base: &'a IndexMap<P::Identifier, Criterion<P>>,
}

impl<'a, P: DependencyProvider + ?Sized> IncompatibilitiesView<'a, P> {
    pub(crate) fn new(base: &'a IndexMap<P::Identifier, Criterion<P>>) -> Self {
        Self { base }
    }

    /// The candidates excluded for `identifier` in the current branch.
    pub fn for_identifier(&self, identifier: &P::Identifier) -> &[P::Candidate] {
        self.base
            .get(identifier)
            .map(|criterion| criterion.incompatibilities())
            .unwrap_or(&[])
    }
}

/// A read-only window over the whole in-progress resolution state, passed to
/// [`DependencyProvider::get_preference`][crate::DependencyProvider::get_preference]
/// and
/// [`DependencyProvider::narrow_requirement_selection`][crate::DependencyProvider::narrow_requirement_selection].
pub struct ResolverView<'a, P: DependencyProvider + ?Sized> {
    criteria: &'a IndexMap<P::Identifier, Criterion<P>>,
    mapping: &'a IndexMap<P::Identifier, P::Candidate>,
    backtrack_causes: &'a [RequirementInformation<P>],
}

impl<'a, P: DependencyProvider + ?Sized> ResolverView<'a, P> {
    pub(crate) fn new(
        criteria: &'a IndexMap<P::Identifier, Criterion<P>>,
        mapping: &'a IndexMap<P::Identifier, P::Candidate>,
        backtrack_causes: &'a [RequirementInformation<P>],
    ) -> Self {
        Self {
            criteria,
            mapping,
            backtrack_causes,
        }
    }

    /// The criterion accumulated so far for `identifier`, if any requirement
    /// has touched it yet.
    pub fn criterion(&self, identifier: &P::Identifier) -> Option<&Criterion<P>> {
        self.criteria.get(identifier)
    }

    /// Whether `identifier` already has a pinned candidate in this branch.
    pub fn is_pinned(&self, identifier: &P::Identifier) -> bool {
        self.mapping.contains_key(identifier)
    }

    /// The candidate pinned for `identifier` in this branch, if any.
    pub fn pinned(&self, identifier: &P::Identifier) -> Option<&P::Candidate> {
        self.mapping.get(identifier)
    }

    /// The number of candidates [`DependencyProvider::find_matches`][crate::DependencyProvider::find_matches]
    /// last returned for `identifier`, or `0` if it has no criterion yet.
    pub fn candidate_count(&self, identifier: &P::Identifier) -> usize {
        self.criteria
            .get(identifier)
            .map(|criterion| criterion.candidates().len())
            .unwrap_or(0)
    }

    /// All identifiers with a criterion so far, in first-seen order.
    pub fn identifiers(&self) -> impl Iterator<Item = &P::Identifier> + '_ {
        self.criteria.keys()
    }

    /// All currently pinned `(identifier, candidate)` pairs, in pinning
    /// order.
    pub fn pins(&self) -> impl Iterator<Item = (&P::Identifier, &P::Candidate)> + '_ {
        self.mapping.iter()
    }

    /// The Φ blamed for the most recent conflict that led to this branch,
    /// i.e. `State::backtrack_causes`. Empty on the initial state and on any
    /// branch reached without backjumping. Providers may use this to bias
    /// `get_preference`/`narrow_requirement_selection` toward identifiers
    /// implicated in the last conflict.
    pub fn backtrack_causes(&self) -> &'a [RequirementInformation<P>] {
        self.backtrack_causes
    }
}
