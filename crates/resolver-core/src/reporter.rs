use crate::criterion::RequirementInformation;
use crate::provider::DependencyProvider;

/// Lifecycle callbacks fired while [`crate::Resolver::resolve`] runs.
///
/// Every method has a no-op default, so implementors only override the
/// events they care about. None of these calls influence the outcome of the
/// resolution; they exist purely for observability (progress bars, verbose
/// logging, metrics).
#[allow(unused_variables)]
pub trait Reporter<P: DependencyProvider> {
    /// Called once at the start of [`crate::Resolver::resolve`].
    fn starting(&self) {}

    /// Called at the start of each round of the main loop.
    fn starting_round(&self, index: usize) {}

    /// Called when `requirement` (introduced by `parent`, or a root
    /// requirement if `parent` is `None`) is merged into the criteria map.
    fn adding_requirement(&self, requirement: &P::Requirement, parent: Option<&P::Candidate>) {}

    /// Called when `candidate` is successfully committed to the mapping,
    /// i.e. every dependency it introduces merged cleanly. Not called for a
    /// candidate that was tried and rejected — see [`Self::rejecting_candidate`].
    fn pinning(&self, candidate: &P::Candidate) {}

    /// Called once per candidate the engine actually attempts to commit for
    /// `identifier`, whether or not the attempt ultimately succeeds. Tests
    /// use this to assert that a candidate excluded earlier in the branch
    /// (or pruned by backjumping) was never re-visited.
    fn considering(&self, identifier: &P::Identifier, candidate: &P::Candidate) {}

    /// Called when `candidate` is rejected for `identifier` because it does
    /// not satisfy every active requirement, or because pinning it produced
    /// a dependency conflict that was resolved by exclusion instead of
    /// backjumping.
    fn rejecting_candidate(&self, identifier: &P::Identifier, candidate: &P::Candidate) {}

    /// Called when a conflict forces the search to discard one or more
    /// stack frames. `depth` is how many frames were popped.
    fn backtracking(&self, depth: usize) {}

    /// Called with the accumulated cause set Φ right before the engine pops
    /// one or more stack frames to repair a conflict.
    fn resolving_conflicts(&self, causes: &[RequirementInformation<P>]) {}

    /// Called once, right before [`crate::Resolver::resolve`] returns, with
    /// whether a pinning was found.
    fn ending(&self, success: bool) {}
}

/// A [`Reporter`] that does nothing. The default used when
/// [`crate::ResolverOptions`] is not given a reporter explicitly.
pub struct NoopReporter;

impl<P: DependencyProvider> Reporter<P> for NoopReporter {}
