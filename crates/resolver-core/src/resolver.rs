use crate::error::ResolutionError;
use crate::graph::ResolutionGraph;
use crate::provider::DependencyProvider;
use crate::reporter::{NoopReporter, Reporter};
use crate::resolution;

/// The outcome of [`Resolver::resolve`].
pub type ResolverResult<P> = Result<ResolutionGraph<P>, ResolutionError<P>>;

/// Tuning knobs for the backtracking search. [`Default::default`] matches
/// what a CLI consumer should reach for first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverOptions {
    /// How aggressively the search jumps back over ancestor pins that are
    /// not implicated in a conflict, instead of retrying them one at a time.
    ///
    /// Must lie in `0.0..=1.0`. `0.0` disables the fast path entirely
    /// (pure chronological backtracking); `1.0` always takes the longest
    /// sound jump available. The choice only affects how many candidates
    /// are visited along the way, never whether a resolution is found.
    pub optimistic_backjumping_ratio: f64,

    /// An upper bound on the number of rounds the main loop may run before
    /// giving up with [`ResolutionError::ResolutionTooDeep`]. Guards
    /// against a provider whose candidate or dependency lists never
    /// converge; a well-behaved finite package universe will never come
    /// close to it.
    pub max_rounds: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            optimistic_backjumping_ratio: 0.5,
            max_rounds: 500,
        }
    }
}

/// The entry point of this crate: a backtracking search over the package
/// universe described by a [`DependencyProvider`], producing a
/// [`ResolutionGraph`] that pins exactly one candidate per identifier.
///
/// `R` is the [`Reporter`] notified of search lifecycle events; it defaults
/// to [`NoopReporter`], so most callers only ever need
/// `Resolver::new(provider)`.
pub struct Resolver<P: DependencyProvider, R: Reporter<P> = NoopReporter> {
    provider: P,
    options: ResolverOptions,
    reporter: R,
}

impl<P: DependencyProvider> Resolver<P, NoopReporter> {
    /// Builds a resolver over `provider` with [`ResolverOptions::default`].
    pub fn new(provider: P) -> Self {
        Self::with_options(provider, ResolverOptions::default())
    }

    /// Builds a resolver over `provider` with explicit `options`.
    pub fn with_options(provider: P, options: ResolverOptions) -> Self {
        Self {
            provider,
            options,
            reporter: NoopReporter,
        }
    }
}

impl<P: DependencyProvider, R: Reporter<P>> Resolver<P, R> {
    /// Attaches `reporter`, replacing whatever reporter (if any) was set
    /// before.
    pub fn with_reporter<R2: Reporter<P>>(self, reporter: R2) -> Resolver<P, R2> {
        Resolver {
            provider: self.provider,
            options: self.options,
            reporter,
        }
    }

    /// A reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// A reference to the attached reporter.
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Runs the backtracking search against `root_requirements`, returning
    /// the resulting [`ResolutionGraph`] or the [`ResolutionError`] that
    /// proves no consistent pinning exists.
    pub fn resolve(&self, root_requirements: Vec<P::Requirement>) -> ResolverResult<P> {
        resolution::run(
            &self.provider,
            &self.reporter,
            &self.options,
            root_requirements,
        )
    }
}
