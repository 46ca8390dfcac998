use resolver_core::{Reporter, RequirementInformation};
use test_utils::{Candidate, FixtureProvider, Requirement};

/// Logs every engine lifecycle event through `tracing`. Pass `--verbose` to
/// actually see anything: this is wired up at `debug`/`trace` level, so it
/// stays silent under the default `info` filter.
pub struct TracingReporter {
    verbose: bool,
}

impl TracingReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter<FixtureProvider> for TracingReporter {
    fn starting(&self) {
        tracing::debug!("resolution starting");
    }

    fn starting_round(&self, index: usize) {
        if self.verbose {
            tracing::trace!(round = index, "starting round");
        }
    }

    fn adding_requirement(&self, requirement: &Requirement, parent: Option<&Candidate>) {
        if self.verbose {
            match parent {
                Some(parent) => tracing::trace!(
                    name = %requirement.name,
                    specifier = %requirement.specifier,
                    parent = %parent.name,
                    "adding requirement"
                ),
                None => tracing::trace!(
                    name = %requirement.name,
                    specifier = %requirement.specifier,
                    "adding root requirement"
                ),
            }
        }
    }

    fn pinning(&self, candidate: &Candidate) {
        tracing::debug!(package = %candidate.name, version = %candidate.version, "pinning");
    }

    fn considering(&self, identifier: &String, candidate: &Candidate) {
        if self.verbose {
            tracing::trace!(package = %identifier, version = %candidate.version, "considering");
        }
    }

    fn rejecting_candidate(&self, identifier: &String, candidate: &Candidate) {
        tracing::debug!(package = %identifier, version = %candidate.version, "rejecting");
    }

    fn backtracking(&self, depth: usize) {
        tracing::debug!(depth, "backtracking");
    }

    fn resolving_conflicts(&self, causes: &[RequirementInformation<FixtureProvider>]) {
        if self.verbose {
            tracing::trace!(causes = causes.len(), "resolving conflicts");
        }
    }

    fn ending(&self, success: bool) {
        tracing::debug!(success, "resolution ended");
    }
}
