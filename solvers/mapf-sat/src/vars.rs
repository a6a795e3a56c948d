//! Variable schema: allocation and lookup for the three variable families
//! `on(x,y,a,t)`, `shift(x,y,o,t)` and `finalState(a,t)`.
//!
//! Each family is backed by one contiguous `Vec<u32>`, addressed by a
//! computed offset, with `0` as the "not allocated" sentinel (reachability
//! pruning means most `on` slots in a dense `x*y*a*t` table are never
//! assigned a variable, and `finalState` is only meaningful from an
//! agent's shortest-path length onward). A variable's id is always `1 +`
//! its slot in allocation order, so id `0` can never collide with a real
//! variable.

use std::collections::HashMap;

use mapf_core::{Op, Problem, Reachability, INFINITE};

/// Which family a variable belongs to, recovered by [`VarTable::lookup`]
/// for diagnostics and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarFamily {
    /// Agent `a` occupies `(x, y)` at time `t`.
    On { x: u32, y: u32, a: usize, t: u32 },
    /// Cell `(x, y)` performs operation `op` at time `t`.
    Shift { x: u32, y: u32, op: Op, t: u32 },
    /// Agent `a` has reached and is holding its goal as of time `t`.
    FinalState { a: usize, t: u32 },
}

/// Dense, reachability-pruned variable tables for one `encode(T)` call.
///
/// `on_table[on_off(x,y,a,t)]` and `shift_table[shift_off(x,y,op,t)]` hold
/// `0` for slots that reachability pruning never allocates. `final_table`
/// likewise holds `0` for `t < SPL(a)` — an agent can't be "finalized"
/// before its shortest-path length has elapsed, so those slots are never
/// referenced by any clause and aren't allocated a variable either.
#[derive(Debug, Clone)]
pub struct VarTable {
    x_dim: u32,
    y_dim: u32,
    num_agents: usize,
    horizon: u32,
    on_table: Vec<u32>,
    shift_table: Vec<u32>,
    final_table: Vec<u32>,
    reverse: HashMap<u32, VarFamily>,
    next_var: u32,
}

impl VarTable {
    /// Allocate variables for a horizon of `horizon` (i.e. `t` ranges over
    /// `0..=horizon`), pruning `on` and `shift` slots that `reach` rules out.
    pub fn build(problem: &Problem, reach: &Reachability, horizon: u32) -> Self {
        let x_dim = problem.grid.x_dim();
        let y_dim = problem.grid.y_dim();
        let num_agents = problem.num_agents();

        let on_len = (x_dim as usize) * (y_dim as usize) * num_agents * (horizon as usize + 1);
        let shift_len = (x_dim as usize) * (y_dim as usize) * 5 * (horizon as usize);
        let final_len = num_agents * (horizon as usize + 1);

        let mut table = Self {
            x_dim,
            y_dim,
            num_agents,
            horizon,
            on_table: vec![0; on_len],
            shift_table: vec![0; shift_len],
            final_table: vec![0; final_len],
            reverse: HashMap::new(),
            next_var: 0,
        };

        for (x, y) in problem.grid.free_cells() {
            for a in 0..num_agents {
                for t in 0..=horizon {
                    if reach.reachable(x, y, a, t, horizon) {
                        table.alloc_on(x, y, a, t);
                    }
                }
            }
            for t in 0..horizon {
                for &op in problem.grid.compatible_ops(x, y) {
                    table.alloc_shift(x, y, op, t);
                }
            }
        }

        for a in 0..num_agents {
            let spl = reach.spl(a);
            if spl == INFINITE {
                continue;
            }
            for t in spl..=horizon {
                table.alloc_final(a, t);
            }
        }

        table
    }

    fn fresh(&mut self) -> u32 {
        self.next_var += 1;
        self.next_var
    }

    #[inline]
    fn on_off(&self, x: u32, y: u32, a: usize, t: u32) -> usize {
        (((x as usize * self.y_dim as usize + y as usize) * self.num_agents + a) * (self.horizon as usize + 1)) + t as usize
    }

    #[inline]
    fn shift_off(&self, x: u32, y: u32, op: Op, t: u32) -> usize {
        (((x as usize * self.y_dim as usize + y as usize) * 5 + op as usize) * self.horizon as usize) + t as usize
    }

    #[inline]
    fn final_off(&self, a: usize, t: u32) -> usize {
        a * (self.horizon as usize + 1) + t as usize
    }

    fn alloc_on(&mut self, x: u32, y: u32, a: usize, t: u32) -> u32 {
        let off = self.on_off(x, y, a, t);
        if self.on_table[off] == 0 {
            let v = self.fresh();
            self.on_table[off] = v;
            self.reverse.insert(v, VarFamily::On { x, y, a, t });
        }
        self.on_table[off]
    }

    fn alloc_shift(&mut self, x: u32, y: u32, op: Op, t: u32) -> u32 {
        let off = self.shift_off(x, y, op, t);
        if self.shift_table[off] == 0 {
            let v = self.fresh();
            self.shift_table[off] = v;
            self.reverse.insert(v, VarFamily::Shift { x, y, op, t });
        }
        self.shift_table[off]
    }

    fn alloc_final(&mut self, a: usize, t: u32) -> u32 {
        let off = self.final_off(a, t);
        if self.final_table[off] == 0 {
            let v = self.fresh();
            self.final_table[off] = v;
            self.reverse.insert(v, VarFamily::FinalState { a, t });
        }
        self.final_table[off]
    }

    /// `on(x,y,a,t)`, or `None` if reachability pruning never allocated it
    /// (the clause generator treats an absent `on` as permanently false).
    pub fn on(&self, x: u32, y: u32, a: usize, t: u32) -> Option<u32> {
        if t > self.horizon {
            return None;
        }
        let off = self.on_off(x, y, a, t);
        match self.on_table.get(off) {
            Some(&0) | None => None,
            Some(&v) => Some(v),
        }
    }

    /// `shift(x,y,op,t)` for `t < horizon`, or `None` if `op` is not
    /// compatible with `(x,y)` (obstacle or out-of-bounds target).
    pub fn shift(&self, x: u32, y: u32, op: Op, t: u32) -> Option<u32> {
        if t >= self.horizon {
            return None;
        }
        let off = self.shift_off(x, y, op, t);
        match self.shift_table.get(off) {
            Some(&0) | None => None,
            Some(&v) => Some(v),
        }
    }

    /// `finalState(a,t)`. Only valid for `t >= SPL(a)` (every caller in
    /// `clauses.rs` only ever reaches this once reachability has already
    /// established that); use [`VarTable::final_state_if_allocated`] when
    /// `t` isn't already known to be in range.
    pub fn final_state(&self, a: usize, t: u32) -> u32 {
        let off = self.final_off(a, t);
        let v = self.final_table[off];
        debug_assert_ne!(v, 0, "finalState({a},{t}) was never allocated (t < SPL(a)?)");
        v
    }

    /// `finalState(a,t)`, or `None` if `t < SPL(a)` (never allocated) or
    /// `t > horizon`. Used by the decoder, which doesn't otherwise know
    /// `SPL(a)` and needs to scan forward for the first true `finalState`.
    pub fn final_state_if_allocated(&self, a: usize, t: u32) -> Option<u32> {
        if t > self.horizon {
            return None;
        }
        match self.final_table.get(self.final_off(a, t)) {
            Some(&0) | None => None,
            Some(&v) => Some(v),
        }
    }

    pub fn lookup(&self, var: u32) -> Option<VarFamily> {
        self.reverse.get(&var).copied()
    }

    pub fn num_vars(&self) -> u32 {
        self.next_var
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    pub fn x_dim(&self) -> u32 {
        self.x_dim
    }

    pub fn y_dim(&self) -> u32 {
        self.y_dim
    }

    pub fn num_agents(&self) -> usize {
        self.num_agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapf_core::ReachabilityMode;

    fn small_problem() -> Problem {
        let input = "1\nGrid:\n2,2\n..\n..\nAgents:\n1\n0,0,0,1,1\n";
        Problem::parse(input).unwrap()
    }

    #[test]
    fn final_state_is_allocated_from_spl_onward_only() {
        let p = small_problem();
        let reach = Reachability::compute(&p, ReachabilityMode::Dijkstra);
        // SPL(0) == 2 on this instance, so at horizon 3 only t in 2..=3 is
        // allocated; t=0 and t=1 must not be (the agent can't possibly be
        // "finalized" before its shortest path has elapsed).
        let table = VarTable::build(&p, &reach, 3);
        assert_eq!(reach.spl(0), 2);
        assert!(table.final_state_if_allocated(0, 0).is_none());
        assert!(table.final_state_if_allocated(0, 1).is_none());
        assert!(table.final_state_if_allocated(0, 2).is_some());
        assert!(table.final_state_if_allocated(0, 3).is_some());
    }

    #[test]
    fn on_is_pruned_outside_reachability_window() {
        let p = small_problem();
        let reach = Reachability::compute(&p, ReachabilityMode::Dijkstra);
        // horizon 2 == SPL, so agent can't be at (1,1) at t=0.
        let table = VarTable::build(&p, &reach, 2);
        assert!(table.on(1, 1, 0, 0).is_none());
        assert!(table.on(0, 0, 0, 0).is_some());
        assert!(table.on(1, 1, 0, 2).is_some());
    }

    #[test]
    fn reverse_lookup_round_trips() {
        let p = small_problem();
        let reach = Reachability::compute(&p, ReachabilityMode::Dijkstra);
        let table = VarTable::build(&p, &reach, 2);
        let v = table.on(0, 0, 0, 0).unwrap();
        match table.lookup(v) {
            Some(VarFamily::On { x, y, a, t }) => {
                assert_eq!((x, y, a, t), (0, 0, 0, 0));
            }
            other => panic!("unexpected family: {other:?}"),
        }
    }

    #[test]
    fn variable_ids_never_collide_across_families() {
        let p = small_problem();
        let reach = Reachability::compute(&p, ReachabilityMode::Dijkstra);
        let table = VarTable::build(&p, &reach, 2);
        assert_eq!(table.num_vars() as usize, table.reverse.len());
    }
}
