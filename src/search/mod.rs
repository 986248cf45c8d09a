use crate::error::{DagForgeError, DfResult};
use crate::model::{ArcSet, Dag, NodeKind};
use crate::operators::{Operator, OperatorSet, TabuSet};
use crate::score::{LocalScoreCache, Score, ValidatedScore};
use tracing::{debug, info};

/// Rounding guard for the `delta - epsilon` convergence comparison; exact
/// float equality there risks oscillation or premature termination.
pub const MACHINE_TOL: f64 = 1e-9;

/// Read-only observation point invoked once at entry, after every step and
/// once at exit. Returning `false` aborts the run with
/// [`DagForgeError::Aborted`]; the loop never catches it and no partial
/// model is returned.
pub trait ProgressCallback {
    fn on_step(&self, model: &Dag, op: Option<&Operator>, score: &dyn Score, iteration: usize)
        -> bool;
}

fn notify(
    callback: Option<&dyn ProgressCallback>,
    model: &Dag,
    op: Option<&Operator>,
    score: &dyn Score,
    iteration: usize,
) -> DfResult<()> {
    if let Some(cb) = callback {
        if !cb.on_step(model, op, score, iteration) {
            return Err(DagForgeError::Aborted);
        }
    }
    Ok(())
}

/// Plain greedy hill climbing over the single driving score.
///
/// Clones `start`, checks the blacklist, force-includes the whitelist,
/// pushes all constraints into the operator set and greedily applies the
/// best candidate until none improves by more than `epsilon` (beyond
/// [`MACHINE_TOL`]) or `max_iters` is reached. Returns the working model.
#[allow(clippy::too_many_arguments)]
pub fn estimate_hc(
    op_set: &mut dyn OperatorSet,
    score: &dyn Score,
    start: &Dag,
    blacklist: &ArcSet,
    whitelist: &ArcSet,
    max_indegree: usize,
    max_iters: usize,
    epsilon: f64,
    callback: Option<&dyn ProgressCallback>,
) -> DfResult<Dag> {
    let mut current = start.clone();
    current.check_blacklist(blacklist)?;
    current.force_whitelist(whitelist)?;

    op_set.set_arc_blacklist(blacklist.clone());
    op_set.set_arc_whitelist(whitelist.clone());
    op_set.set_max_indegree(max_indegree);

    op_set.cache_scores(&current, score);
    info!(nodes = current.num_nodes(), max_iters, epsilon, "Hill climbing started");

    notify(callback, &current, None, score, 0)?;

    let mut iter = 0;
    while iter < max_iters {
        let best_op = match op_set.find_max(&current) {
            Some(op) if (op.delta() - epsilon) >= MACHINE_TOL => op,
            _ => break,
        };

        best_op.apply(&mut current)?;
        op_set.update_scores(&current, score, &best_op);
        iter += 1;

        debug!(iteration = iter, op = %best_op.describe(&current), "Applied operator");
        notify(callback, &current, Some(&best_op), score, iter)?;
    }

    notify(callback, &current, None, score, iter)?;
    info!(iterations = iter, arcs = current.num_arcs(), "Hill climbing finished");
    Ok(current)
}

/// Incremental change in validated local score caused by `op`, restricted to
/// the nodes it touches; refreshes those cache entries as a side effect.
///
/// The closed operator enum makes this match exhaustive, so the "unreachable
/// operator kind" failure of a runtime-dispatch design cannot arise.
pub fn validation_delta_score(
    model: &Dag,
    score: &dyn ValidatedScore,
    op: &Operator,
    cache: &mut LocalScoreCache,
) -> f64 {
    match *op {
        Operator::AddArc { target, .. } | Operator::RemoveArc { target, .. } => {
            let prev = cache.local_score(target);
            cache.update_vlocal_score(model, score, op);
            cache.local_score(target) - prev
        }
        Operator::FlipArc { source, target, .. } => {
            let prev = cache.local_score(source) + cache.local_score(target);
            cache.update_vlocal_score(model, score, op);
            cache.local_score(source) + cache.local_score(target) - prev
        }
        Operator::ChangeNodeKind { node, .. } => {
            let prev = cache.local_score(node);
            cache.update_vlocal_score(model, score, op);
            cache.local_score(node) - prev
        }
    }
}

/// Validated hill climbing: held-out acceptance, tabu-guided escape and
/// patience-based tolerance of transient regressions.
///
/// Candidate ranking is driven by the training-side score; each applied move
/// is then accepted or merely tolerated by its incremental held-out delta.
/// Accepted moves commit `best = current.clone()`, reset patience and the
/// validation offset and clear the tabu set. Tolerated moves accumulate
/// their (non-positive net) delta into the offset, count against `patience`
/// and tabu-list their own inverse so the excursion cannot be trivially
/// undone. Returns `best` — only validation-confirmed structures.
#[allow(clippy::too_many_arguments)]
pub fn estimate_validated_hc(
    op_set: &mut dyn OperatorSet,
    score: &dyn ValidatedScore,
    start: &Dag,
    blacklist: &ArcSet,
    whitelist: &ArcSet,
    kind_whitelist: &[(usize, NodeKind)],
    max_indegree: usize,
    max_iters: usize,
    epsilon: f64,
    patience: usize,
    callback: Option<&dyn ProgressCallback>,
) -> DfResult<Dag> {
    let mut current = start.clone();
    current.check_blacklist(blacklist)?;
    current.force_whitelist(whitelist)?;
    current.force_kind_whitelist(kind_whitelist);

    op_set.set_arc_blacklist(blacklist.clone());
    op_set.set_arc_whitelist(whitelist.clone());
    op_set.set_kind_whitelist(kind_whitelist);
    op_set.set_max_indegree(max_indegree);

    let mut best = current.clone();

    let mut local_validation = LocalScoreCache::new(&current);
    local_validation.cache_vlocal_scores(&current, score);

    op_set.cache_scores(&current, score);
    info!(
        nodes = current.num_nodes(),
        max_iters, epsilon, patience, "Validated hill climbing started"
    );

    let mut p = 0;
    let mut validation_offset = 0.0;
    let mut tabu_set = TabuSet::new();

    notify(callback, &current, None, score, 0)?;

    let mut iter = 0;
    while iter < max_iters {
        let best_op = match op_set.find_max_tabu(&current, &tabu_set) {
            Some(op) if (op.delta() - epsilon) >= MACHINE_TOL => op,
            _ => break,
        };

        best_op.apply(&mut current)?;
        let validation_delta =
            validation_delta_score(&current, score, &best_op, &mut local_validation);

        if validation_delta + validation_offset > 0.0 {
            p = 0;
            validation_offset = 0.0;
            best = current.clone();
            tabu_set.clear();
            debug!(iteration = iter, validation_delta, "Move accepted");
        } else {
            p += 1;
            if p >= patience {
                debug!(iteration = iter, "Patience exhausted");
                break;
            }
            validation_offset += validation_delta;
            tabu_set.insert(&best_op.opposite());
            debug!(
                iteration = iter,
                validation_delta,
                validation_offset,
                tabu = tabu_set.len(),
                "Move tolerated"
            );
        }

        op_set.update_scores(&current, score, &best_op);
        iter += 1;

        notify(callback, &current, Some(&best_op), score, iter)?;
    }

    notify(callback, &current, None, score, iter)?;
    info!(iterations = iter, arcs = best.num_arcs(), "Validated hill climbing finished");
    Ok(best)
}
