//! Watchlists to detect clauses that became unit.
//!
//! Each clause with at least two literals watches two distinct literals of
//! itself, and every literal has a list of the clauses currently watching it.
//! While a clause is not satisfied, a watched literal is only ever falsified
//! when the clause has no unfalsified unwatched literal left; a falsified
//! watch therefore means the clause became unit on its other watched literal,
//! or a conflict.
//!
//! When a literal is assigned false, scanning its watchers is enough to
//! restore that invariant: each watcher either moves its watch to a literal
//! that is unassigned or true, or it has become unit or falsified. A clause
//! that is already satisfied by its other watched literal may keep the
//! falsified watch; the invariant only speaks about unsatisfied clauses and
//! holds again as soon as the assignment is undone.
//!
//! There is no need to update watchlists on backtracking, as unassigning
//! variables cannot invalidate the invariant.
//!
//! See [Section 4.5.1 of the "Handbook of Satisfiability"][handbook-ch4] for
//! more details and references.
//!
//! [handbook-ch4]: https://www.satassociation.org/articles/FAIA185-0131.pdf

use partial_ref::{partial, PartialRef};

use s1t_formula::Lit;

use crate::context::{ClauseStoreP, Context, WatchlistsP};

/// Index of a clause in the clause store.
pub type ClauseIdx = usize;

/// The two literals a clause currently watches.
#[derive(Copy, Clone, Debug)]
pub struct WatchedPair {
    lits: [Lit; 2],
}

impl WatchedPair {
    /// The watched literal that is not `lit`.
    pub fn other(&self, lit: Lit) -> Lit {
        if self.lits[0] == lit {
            self.lits[1]
        } else {
            self.lits[0]
        }
    }

    /// Replace the slot watching `old` with `new`.
    pub fn replace(&mut self, old: Lit, new: Lit) {
        if self.lits[0] == old {
            self.lits[0] = new;
        } else {
            self.lits[1] = new;
        }
    }

    /// Both watched literals.
    pub fn lits(&self) -> [Lit; 2] {
        self.lits
    }
}

/// Watchlists to detect clauses that became unit.
#[derive(Default)]
pub struct Watchlists {
    /// Maps each literal code to the clauses currently watching that literal.
    watches: Vec<Vec<ClauseIdx>>,
    /// Maps each clause to its watched pair, `None` for clauses with fewer
    /// than two literals.
    pairs: Vec<Option<WatchedPair>>,
}

impl Watchlists {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize(count * 2, vec![]);
    }

    /// Update structures for a new clause count.
    pub fn set_clause_count(&mut self, count: usize) {
        self.pairs.resize(count, None);
    }

    /// Start watching a clause on two of its literals.
    ///
    /// The literals have to be distinct and part of the clause.
    pub fn watch_clause(&mut self, clause: ClauseIdx, lits: [Lit; 2]) {
        debug_assert_ne!(lits[0], lits[1]);
        for &lit in lits.iter() {
            self.watches[lit.code()].push(clause);
        }
        self.pairs[clause] = Some(WatchedPair { lits });
    }

    /// Clauses currently watching a literal.
    pub fn watched_by(&self, lit: Lit) -> &[ClauseIdx] {
        &self.watches[lit.code()]
    }

    /// The watched pair of a clause, `None` for short clauses.
    pub fn pair(&self, clause: ClauseIdx) -> Option<WatchedPair> {
        self.pairs.get(clause).and_then(|&pair| pair)
    }

    /// Move the watch at `position` of `from`'s list over to the literal `to`.
    ///
    /// Removal is swap-and-pop; the order within a watch list carries no
    /// meaning.
    pub fn move_watch(&mut self, from: Lit, position: usize, to: Lit) {
        let clause = self.watches[from.code()].swap_remove(position);
        self.watches[to.code()].push(clause);
        if let Some(pair) = self.pairs[clause].as_mut() {
            pair.replace(from, to);
        }
    }
}

/// Pick the initial watched literals for every clause in the store.
///
/// Clauses watch their first two literals. Empty and unit clauses get no
/// watches: empty clauses are rejected before search and unit clauses are
/// flushed by the initial propagation pass.
pub fn init_watches(mut ctx: partial!(Context, mut WatchlistsP, ClauseStoreP)) {
    let (watchlists, ctx) = ctx.split_part_mut(WatchlistsP);
    let store = ctx.part(ClauseStoreP);

    watchlists.set_clause_count(store.len());

    for (index, clause) in store.iter().enumerate() {
        if clause.len() >= 2 {
            watchlists.watch_clause(index, [clause[0], clause[1]]);
        }
    }
}
