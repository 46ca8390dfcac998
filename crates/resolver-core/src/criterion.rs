use std::fmt;

use indexmap::IndexMap;

use crate::provider::DependencyProvider;
use crate::views::{IncompatibilitiesView, RequirementsView};

/// A `(requirement, parent)` pair: `parent` is the candidate that introduced
/// `requirement`, or `None` for a root requirement.
pub struct RequirementInformation<P: DependencyProvider> {
    /// The requirement itself.
    pub requirement: P::Requirement,
    /// The candidate that introduced this requirement, or `None` if it is a
    /// root requirement supplied directly to [`crate::Resolver::resolve`].
    pub parent: Option<P::Candidate>,
}

impl<P: DependencyProvider> Clone for RequirementInformation<P> {
    fn clone(&self) -> Self {
        Self {
            requirement: self.requirement.clone(),
            parent: self.parent.clone(),
        }
    }
}

impl<P: DependencyProvider> fmt::Debug for RequirementInformation<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequirementInformation")
            .field("requirement", &self.requirement)
            .field("parent", &self.parent)
            .finish()
    }
}

/// The accumulated constraint set and candidate list for one identifier in
/// the current branch.
///
/// Criteria are logically immutable: [`Criterion::merged_with`] and
/// [`Criterion::excluded`] both return a new value rather than mutating in
/// place. The engine replaces map entries rather than mutating them.
pub struct Criterion<P: DependencyProvider> {
    information: Vec<RequirementInformation<P>>,
    incompatibilities: Vec<P::Candidate>,
    candidates: Vec<P::Candidate>,
}

impl<P: DependencyProvider> Clone for Criterion<P> {
    fn clone(&self) -> Self {
        Self {
            information: self.information.clone(),
            incompatibilities: self.incompatibilities.clone(),
            candidates: self.candidates.clone(),
        }
    }
}

impl<P: DependencyProvider> fmt::Debug for Criterion<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criterion")
            .field("information", &self.information)
            .field("incompatibilities", &self.incompatibilities)
            .field("candidates", &self.candidates)
            .finish()
    }
}

impl<P: DependencyProvider> Criterion<P> {
    /// A criterion with no requirements, no incompatibilities and no
    /// candidates yet.
    pub fn empty() -> Self {
        Self {
            information: Vec::new(),
            incompatibilities: Vec::new(),
            candidates: Vec::new(),
        }
    }

    /// The `(requirement, parent)` pairs accumulated on this identifier so
    /// far, in the order they were added.
    pub fn information(&self) -> &[RequirementInformation<P>] {
        &self.information
    }

    /// The candidates known to be invalid for this identifier in the current
    /// branch.
    pub fn incompatibilities(&self) -> &[P::Candidate] {
        &self.incompatibilities
    }

    /// The candidates that currently satisfy every requirement in
    /// [`Self::information`], in provider-preferred order.
    pub fn candidates(&self) -> &[P::Candidate] {
        &self.candidates
    }

    /// Accessor over the requirements in [`Self::information`].
    pub fn iter_requirement(&self) -> impl Iterator<Item = &P::Requirement> {
        self.information.iter().map(|info| &info.requirement)
    }

    /// Accessor over the parents in [`Self::information`].
    pub fn iter_parent(&self) -> impl Iterator<Item = Option<&P::Candidate>> {
        self.information.iter().map(|info| info.parent.as_ref())
    }

    /// Returns a new criterion with `(requirement, parent)` appended to
    /// [`Self::information`] and [`Self::candidates`] re-filtered via
    /// `provider.find_matches` so that only candidates satisfying every
    /// requirement (including the new one) remain.
    ///
    /// `base_criteria` is the rest of the branch's criteria map, used to
    /// answer `find_matches` queries about identifiers other than this one
    /// (for example a provider implementing extras needs to see the base
    /// package's own requirements). Entries for `identifier` in
    /// `base_criteria` are shadowed by the criterion being built here.
    ///
    /// Returns `Err` with the (unsatisfiable) criterion when the resulting
    /// candidate list is empty; the caller is expected to treat this as the
    /// internal `RequirementsConflicted` signal and never let it escape.
    pub fn merged_with(
        &self,
        provider: &P,
        base_criteria: &IndexMap<P::Identifier, Criterion<P>>,
        identifier: &P::Identifier,
        requirement: P::Requirement,
        parent: Option<P::Candidate>,
    ) -> Result<Self, Self> {
        let mut information = self.information.clone();
        information.push(RequirementInformation { requirement, parent });

        let requirements = RequirementsView::new(base_criteria, identifier, &information);
        let incompatibilities = IncompatibilitiesView::new(base_criteria);
        let candidates = provider.find_matches(identifier, &requirements, &incompatibilities);

        let merged = Self {
            information,
            incompatibilities: self.incompatibilities.clone(),
            candidates,
        };

        if merged.candidates.is_empty() {
            Err(merged)
        } else {
            Ok(merged)
        }
    }

    /// Returns a new criterion with `candidate` added to
    /// [`Self::incompatibilities`] and removed from [`Self::candidates`].
    pub fn excluded(&self, candidate: &P::Candidate) -> Self {
        let mut incompatibilities = self.incompatibilities.clone();
        incompatibilities.push(candidate.clone());
        let candidates = self
            .candidates
            .iter()
            .filter(|c| *c != candidate)
            .cloned()
            .collect();

        Self {
            information: self.information.clone(),
            incompatibilities,
            candidates,
        }
    }
}
