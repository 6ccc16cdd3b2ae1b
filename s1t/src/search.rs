//! Chronological backtracking search.
use partial_ref::{partial, PartialRef};

use crate::context::{AssignmentP, ClauseStoreP, Context, WatchlistsP};
use crate::prop::{backtrack, try_assign, Trail};

/// Search for an assignment satisfying every clause, extending the current
/// assignment.
///
/// Branches on the smallest unassigned variable, positive polarity first, and
/// propagates each branch before descending. On conflict the branch's trail is
/// undone and the opposite polarity is tried; when both fail the caller
/// backtracks further. Returns `true` once no unassigned variable is left.
///
/// `search_from` is the index of the variable the parent branched on. All
/// variables below it are assigned, so the scan for the next decision skips
/// them. `depth` is informational only: there are no decision levels beyond
/// the trail of the current branch.
pub fn search(
    mut ctx: partial!(Context, mut AssignmentP, mut WatchlistsP, ClauseStoreP),
    depth: usize,
    search_from: usize,
) -> bool {
    let var = match ctx.part(AssignmentP).next_unassigned_var(search_from) {
        Some(var) => var,
        None => return true,
    };

    for &polarity in [true, false].iter() {
        let mut trail = Trail::default();
        if try_assign(ctx.borrow(), var.lit(polarity), &mut trail).is_ok()
            && search(ctx.borrow(), depth + 1, var.index())
        {
            return true;
        }
        backtrack(ctx.borrow(), &mut trail);
    }

    false
}
