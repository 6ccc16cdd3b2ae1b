//! Unit propagation.
use partial_ref::{partial, PartialRef};

use s1t_formula::Lit;

use crate::context::{AssignmentP, ClauseStoreP, Context, WatchlistsP};

pub mod assignment;
pub mod watch;

pub use assignment::{backtrack, Assignment, Trail};
pub use watch::{init_watches, ClauseIdx, WatchedPair, Watchlists};

/// A failed attempt at extending the current assignment.
///
/// Conflicts are not errors: they are the return value of propagation that
/// drives backtracking.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Conflict {
    /// The literal's variable is already assigned the opposite polarity.
    Assign(Lit),
    /// Every literal of the clause is false under the extended assignment.
    Clause(ClauseIdx),
}

/// Make a literal true and propagate all forced consequences.
///
/// Every newly assigned variable is recorded on `trail` so the caller can undo
/// the extension. Assigning a literal that already holds is a no-op.
///
/// Making `lit` true falsifies `!lit`, so the clauses watching `!lit` may
/// violate the watch invariant. Each of them either moves its watch to a
/// replacement literal, is already satisfied by its other watched literal (the
/// watch stays put, see [`watch`](crate::prop::watch)), has become unit
/// (propagate the other watched literal, depth first), or is falsified.
pub fn try_assign(
    mut ctx: partial!(Context, mut AssignmentP, mut WatchlistsP, ClauseStoreP),
    lit: Lit,
    trail: &mut Trail,
) -> Result<(), Conflict> {
    match ctx.part(AssignmentP).lit_value(lit) {
        None => {
            ctx.part_mut(AssignmentP).assign_lit(lit);
            trail.record(lit.var());
        }
        Some(false) => return Err(Conflict::Assign(lit)),
        Some(true) => return Ok(()),
    }

    let false_lit = !lit;

    let mut watch_idx = 0;
    while watch_idx < ctx.part(WatchlistsP).watched_by(false_lit).len() {
        let clause = ctx.part(WatchlistsP).watched_by(false_lit)[watch_idx];
        // Re-read the pair on every iteration: nested propagation can move
        // the other watch of this clause.
        let pair = match ctx.part(WatchlistsP).pair(clause) {
            Some(pair) => pair,
            None => {
                // Watch lists only ever hold clauses with a watched pair.
                debug_assert!(false);
                watch_idx += 1;
                continue;
            }
        };
        let other = pair.other(false_lit);

        match find_replacement(ctx.borrow(), clause, false_lit, other) {
            Some(replacement) => {
                // The clause stops watching `false_lit`. Swap-and-pop moves
                // another clause into this position, so the index stays.
                ctx.part_mut(WatchlistsP)
                    .move_watch(false_lit, watch_idx, replacement);
            }
            None => {
                match ctx.part(AssignmentP).lit_value(other) {
                    None => try_assign(ctx.borrow(), other, trail)?,
                    // Satisfied; the relaxed watch is restored by undo.
                    Some(true) => {}
                    Some(false) => return Err(Conflict::Clause(clause)),
                }
                watch_idx += 1;
            }
        }
    }

    Ok(())
}

/// First literal of the clause that can take over a falsified watch.
///
/// Scans the clause's literals in stored order, skipping the two currently
/// watched literals, and picks the first one that is unassigned or true.
fn find_replacement(
    ctx: partial!(Context, AssignmentP, ClauseStoreP),
    clause: ClauseIdx,
    false_lit: Lit,
    other: Lit,
) -> Option<Lit> {
    let assignment = ctx.part(AssignmentP);
    for &candidate in ctx.part(ClauseStoreP).clause(clause).iter() {
        if candidate == false_lit || candidate == other {
            continue;
        }
        if assignment.lit_value(candidate) != Some(false) {
            return Some(candidate);
        }
    }
    None
}

/// Flush the unit clauses of the store.
///
/// Watch picking skips clauses with a single literal, so each one is asserted
/// here before search starts, chaining into regular propagation. The trail is
/// thrown away: these assignments are never undone.
pub fn propagate_units(
    mut ctx: partial!(Context, mut AssignmentP, mut WatchlistsP, ClauseStoreP),
) -> Result<(), Conflict> {
    for index in 0..ctx.part(ClauseStoreP).len() {
        let clause = ctx.part(ClauseStoreP).clause(index);
        if clause.len() != 1 {
            continue;
        }
        let unit = clause[0];
        let mut trail = Trail::default();
        try_assign(ctx.borrow(), unit, &mut trail)?;
    }
    Ok(())
}
