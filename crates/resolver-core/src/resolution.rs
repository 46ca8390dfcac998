use std::collections::HashSet;

use crate::criterion::{Criterion, RequirementInformation};
use crate::error::ResolutionError;
use crate::graph::ResolutionGraph;
use crate::provider::DependencyProvider;
use crate::reporter::Reporter;
use crate::resolver::ResolverOptions;
use crate::state::State;

/// One step of the backtracking stack: the state *before* `identifier` was
/// pinned, plus which identifier and candidate the pin committed to. The
/// state *after* the pin is never stored separately — it's always `current`,
/// one frame up.
struct Frame<P: DependencyProvider> {
    base: State<P>,
    identifier: P::Identifier,
    candidate: P::Candidate,
}

/// What trying to pin one identifier against one state produced.
enum PinOutcome<P: DependencyProvider> {
    /// Some candidate's dependencies all merged cleanly against `state`,
    /// which already has that candidate pinned.
    Success { state: State<P>, candidate: P::Candidate },
    /// Every candidate for the identifier conflicted with something.
    /// `causes` is the accumulated Φ for this attempt: one entry per
    /// candidate rejected along the way, plus (at minimum) the identifier's
    /// own criterion contents.
    Exhausted(Vec<RequirementInformation<P>>),
}

/// Runs the backtracking search to completion.
///
/// This is the only place in the crate where the actual resolution algorithm
/// lives; [`crate::Resolver::resolve`] is a thin facade over this function.
#[tracing::instrument(skip_all)]
pub(crate) fn run<P, R>(
    provider: &P,
    reporter: &R,
    options: &ResolverOptions,
    root_requirements: Vec<P::Requirement>,
) -> Result<ResolutionGraph<P>, ResolutionError<P>>
where
    P: DependencyProvider,
    R: Reporter<P>,
{
    reporter.starting();

    let mut current = initial_state(provider, reporter, root_requirements)?;
    let mut history: Vec<Frame<P>> = Vec::new();
    let mut accumulated_causes: Vec<RequirementInformation<P>> = Vec::new();

    for round in 0..options.max_rounds {
        reporter.starting_round(round);

        if current.is_complete() {
            tracing::debug!(rounds = round, "resolution complete");
            reporter.ending(true);
            return Ok(ResolutionGraph::from_state(&current));
        }

        let identifier = pick_identifier(&current, provider);

        match try_pin(provider, reporter, &current, &identifier)? {
            PinOutcome::Success { state, candidate } => {
                tracing::trace!(identifier = ?identifier, "pinned");
                history.push(Frame {
                    base: current,
                    identifier,
                    candidate,
                });
                current = state;
            }
            PinOutcome::Exhausted(causes) => {
                accumulated_causes.extend(causes.iter().cloned());
                reporter.resolving_conflicts(&accumulated_causes);

                let blamed = blame_targets(&causes, provider);
                let depth_before = history.len();
                match backjump(&mut history, &blamed, options.optimistic_backjumping_ratio, causes) {
                    Some(next) => {
                        reporter.backtracking(depth_before - history.len());
                        current = next;
                    }
                    None => {
                        reporter.ending(false);
                        return Err(ResolutionError::ResolutionImpossible {
                            causes: accumulated_causes,
                        });
                    }
                }
            }
        }
    }

    reporter.ending(false);
    Err(ResolutionError::ResolutionTooDeep {
        round_count: options.max_rounds,
    })
}

fn initial_state<P, R>(
    provider: &P,
    reporter: &R,
    root_requirements: Vec<P::Requirement>,
) -> Result<State<P>, ResolutionError<P>>
where
    P: DependencyProvider,
    R: Reporter<P>,
{
    let mut state = State::empty();
    for requirement in root_requirements {
        let identifier = provider.identify_requirement(&requirement);
        reporter.adding_requirement(&requirement, None);
        match add_to_criteria(provider, &state, &identifier, requirement, None) {
            Ok(merged) => state.set_criterion(identifier, merged),
            Err(conflicted) => {
                return Err(ResolutionError::ResolutionImpossible {
                    causes: conflicted.information().to_vec(),
                });
            }
        }
    }
    Ok(state)
}

/// The injection primitive of §4.5: merge `(requirement, parent)` into
/// `state.criteria[identifier]`, creating an empty criterion first if
/// `identifier` hasn't been touched yet.
fn add_to_criteria<P: DependencyProvider>(
    provider: &P,
    state: &State<P>,
    identifier: &P::Identifier,
    requirement: P::Requirement,
    parent: Option<P::Candidate>,
) -> Result<Criterion<P>, Criterion<P>> {
    let old = state
        .criterion(identifier)
        .cloned()
        .unwrap_or_else(Criterion::empty);
    old.merged_with(provider, state.criteria(), identifier, requirement, parent)
}

fn pick_identifier<P: DependencyProvider>(state: &State<P>, provider: &P) -> P::Identifier {
    use crate::views::ResolverView;

    let unsatisfied: Vec<P::Identifier> = state.unsatisfied_identifiers().cloned().collect();
    let view = ResolverView::new(state.criteria(), state.mapping(), state.backtrack_causes());
    let narrowed = provider.narrow_requirement_selection(&unsatisfied, &view);
    let pool = if narrowed.is_empty() {
        unsatisfied
    } else {
        narrowed
    };

    pool.into_iter()
        .min_by_key(|identifier| provider.get_preference(identifier, &view))
        .expect("at least one unsatisfied identifier exists when the branch is incomplete")
}

/// Implements §4.3: try every candidate for `identifier`, in order, until one
/// pins cleanly or the list is exhausted. A candidate that conflicts with an
/// already-pinned dependency is rejected on the spot, without touching
/// `current`'s criteria or the backtrack stack; a candidate whose dependency
/// merge fails instead folds the conflicting criterion's causes into the
/// attempt and moves on. Only once every candidate has been tried does this
/// report back to `run` for backjumping.
fn try_pin<P, R>(
    provider: &P,
    reporter: &R,
    current: &State<P>,
    identifier: &P::Identifier,
) -> Result<PinOutcome<P>, ResolutionError<P>>
where
    P: DependencyProvider,
    R: Reporter<P>,
{
    let criterion = current
        .criterion(identifier)
        .expect("identifier was selected from the criteria map")
        .clone();

    let mut attempt_causes: Vec<RequirementInformation<P>> = Vec::new();

    'candidates: for candidate in criterion.candidates() {
        reporter.considering(identifier, candidate);

        for info in criterion.information() {
            if !provider.is_satisfied_by(&info.requirement, candidate) {
                return Err(ResolutionError::InconsistentCandidate {
                    identifier: identifier.clone(),
                    candidate: candidate.clone(),
                });
            }
        }

        let dependencies = provider.get_dependencies(candidate);
        let mut next = current.clone();
        next.pin(identifier.clone(), candidate.clone());

        for requirement in dependencies {
            let dependency_id = provider.identify_requirement(&requirement);

            if let Some(pinned) = next.pinned(&dependency_id) {
                if !provider.is_satisfied_by(&requirement, pinned) {
                    // `dependency_id` is already pinned to something this
                    // candidate cannot live with. Per §4.3 that's a conflict
                    // specific to the current branch's mapping, not a global
                    // incompatibility: reject the whole candidate outright,
                    // with no exclusion recorded and no stack frame touched.
                    attempt_causes.push(RequirementInformation {
                        requirement,
                        parent: Some(candidate.clone()),
                    });
                    reporter.rejecting_candidate(identifier, candidate);
                    continue 'candidates;
                }
            }

            reporter.adding_requirement(&requirement, Some(candidate));
            match add_to_criteria(provider, &next, &dependency_id, requirement, Some(candidate.clone())) {
                Ok(merged) => next.set_criterion(dependency_id, merged),
                Err(conflicted) => {
                    attempt_causes.extend(conflicted.information().iter().cloned());
                    reporter.rejecting_candidate(identifier, candidate);
                    continue 'candidates;
                }
            }
        }

        reporter.pinning(candidate);
        return Ok(PinOutcome::Success {
            state: next,
            candidate: candidate.clone(),
        });
    }

    attempt_causes.extend(criterion.information().iter().cloned());
    Ok(PinOutcome::Exhausted(attempt_causes))
}

/// The identifiers an ancestor pin should be blamed under for `causes`: the
/// identifier of every blamed requirement itself (so that, if that same
/// identifier was pinned earlier, its frame can be reopened), unioned with
/// the identifiers of every candidate that introduced one of those
/// requirements (a fallback ancestor to jump to when the conflicting
/// identifier was never pinned before, only required by something that was).
fn blame_targets<P: DependencyProvider>(
    causes: &[RequirementInformation<P>],
    provider: &P,
) -> HashSet<P::Identifier> {
    let mut targets = HashSet::new();
    for info in causes {
        targets.insert(provider.identify_requirement(&info.requirement));
        if let Some(parent) = &info.parent {
            targets.insert(provider.identify_candidate(parent));
        }
    }
    targets
}

/// Decides whether the evidence in `blamed` warrants an aggressive,
/// multi-frame jump straight to the shallowest implicated ancestor, trading
/// off against `ratio`.
///
/// Returns the history index to jump to, or `None` when no jump clears the
/// bar (the caller falls back to a one-step-at-a-time search). At
/// `ratio <= 0.0` this never recommends a jump, matching pure chronological
/// backtracking. At `ratio == 1.0` it always takes the shallowest blamed
/// frame, however far back that is. Intermediate ratios only take the jump
/// once its distance clears that fraction of the current stack depth.
///
/// Every jump this function recommends is sound: every frame between the
/// target and the top pinned an identifier that is not in `blamed`, so
/// re-trying its other candidates could not have avoided the conflict that
/// is actually rooted at the target.
fn choose_aggressive_backjump_target<P: DependencyProvider>(
    history: &[Frame<P>],
    blamed: &HashSet<P::Identifier>,
    ratio: f64,
) -> Option<usize> {
    let top = history.len();
    if ratio <= 0.0 || top == 0 {
        return None;
    }

    let shallowest = history
        .iter()
        .position(|frame| blamed.contains(&frame.identifier))?;

    let jump = top - shallowest;
    let threshold = ((1.0 - ratio) * top as f64).ceil() as usize;
    if jump >= threshold {
        Some(shallowest)
    } else {
        None
    }
}

/// Unwinds `history` because the current top of the stack ran out of
/// candidates entirely for some identifier. `blamed` names every identifier
/// an ancestor pin could be reopened for. `causes` is Φ, the accumulated
/// cause set that provoked this backjump; it is stamped onto the returned
/// state as `backtrack_causes` (`spec.md` §4.4 step 6) so a provider's
/// `get_preference`/`narrow_requirement_selection` can see why the branch was
/// reopened. Returns `None` only when there is nothing left to unwind,
/// meaning the resolution is impossible.
fn backjump<P: DependencyProvider>(
    history: &mut Vec<Frame<P>>,
    blamed: &HashSet<P::Identifier>,
    ratio: f64,
    causes: Vec<RequirementInformation<P>>,
) -> Option<State<P>> {
    if history.is_empty() {
        return None;
    }

    let target = choose_aggressive_backjump_target(history, blamed, ratio)
        .or_else(|| history.iter().rposition(|frame| blamed.contains(&frame.identifier)))
        .unwrap_or(history.len() - 1);

    let mut popped = history.split_off(target).into_iter();
    let frame = popped.next().expect("split_off(target) is non-empty since target < history.len()");

    let mut base = frame.base;
    if let Some(criterion) = base.criterion(&frame.identifier) {
        let excluded = criterion.excluded(&frame.candidate);
        base.set_criterion(frame.identifier, excluded);
    }
    base.set_backtrack_causes(causes);
    Some(base)
}
