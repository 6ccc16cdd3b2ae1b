//! Central solver data structure.
use partial_ref::{part, partial, PartialRef, PartialRefTarget};

use s1t_formula::{CnfFormula, Problem};

use crate::prop::{Assignment, Watchlists};

/// Part declarations for the [`Context`] struct.
mod parts {
    use super::*;

    part!(pub AssignmentP: Assignment);
    part!(pub ClauseStoreP: CnfFormula);
    part!(pub WatchlistsP: Watchlists);
}

pub use parts::*;

/// Central solver data structure.
///
/// This struct contains all data kept by the solver. Functions operating on
/// multiple fields of the context use partial references provided by the
/// `partial_ref` crate. This documents the data dependencies and makes the
/// borrow checker happy without the overhead of passing individual references.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part = "AssignmentP"]
    assignment: Assignment,
    #[part = "ClauseStoreP"]
    clause_store: CnfFormula,
    #[part = "WatchlistsP"]
    watchlists: Watchlists,
}

/// Materialise a problem's clauses and size all structures for its declared
/// variable count.
pub fn load_problem(
    mut ctx: partial!(Context, mut AssignmentP, mut ClauseStoreP, mut WatchlistsP),
    problem: &Problem,
) {
    let var_count = problem.spec.var_count;

    *ctx.part_mut(ClauseStoreP) = problem.formula.clone();
    ctx.part_mut(AssignmentP).set_var_count(var_count);
    ctx.part_mut(WatchlistsP).set_var_count(var_count);
}
