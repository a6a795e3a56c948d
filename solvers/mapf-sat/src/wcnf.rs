//! WCNF (DIMACS partial weighted CNF) serialization and the minimal model
//! parsing the solver front-ends need.

use std::fmt::Write as _;

use crate::cnf::{ClauseSet, Lit};

/// A fully-assembled partial weighted CNF instance ready to hand to an
/// external MaxSAT solver.
#[derive(Debug, Clone)]
pub struct Wcnf {
    pub num_vars: u32,
    pub hard: Vec<Vec<Lit>>,
    pub soft: Vec<Lit>,
    pub top: u64,
}

impl Wcnf {
    /// Build from a generated clause set and its soft-clause top weight.
    /// `top = numSoftClauses`, except the detected-UNSAT case which callers
    /// build with [`Wcnf::trivially_unsat`] instead.
    pub fn from_clauses(clauses: ClauseSet, num_soft_clauses: u64) -> Self {
        let top = num_soft_clauses.max(1);
        Self {
            num_vars: clauses.num_vars(),
            hard: clauses.hard,
            soft: clauses.soft,
            top,
        }
    }

    /// The `p wcnf 0 1 2` / `2 0` trivial-UNSAT instance: a single empty
    /// hard clause, no variables.
    pub fn trivially_unsat() -> Self {
        Self {
            num_vars: 0,
            hard: vec![Vec::new()],
            soft: Vec::new(),
            top: 2,
        }
    }

    pub fn num_clauses(&self) -> usize {
        self.hard.len() + self.soft.len()
    }

    /// Render as DIMACS partial weighted CNF text.
    pub fn to_wcnf_string(&self) -> String {
        let mut out = String::new();
        writeln!(out, "p wcnf {} {} {}", self.num_vars, self.num_clauses(), self.top).unwrap();
        for clause in &self.hard {
            write!(out, "{} ", self.top).unwrap();
            for lit in clause {
                write!(out, "{lit} ").unwrap();
            }
            writeln!(out, "0").unwrap();
        }
        for &lit in &self.soft {
            writeln!(out, "1 {lit} 0").unwrap();
        }
        out
    }
}

/// A model line as reported by a MaxSAT solver: the truth value of every
/// variable `1..=num_vars`, plus the reported cost (falsified soft weight).
#[derive(Debug, Clone)]
pub struct Model {
    pub assignment: Vec<bool>,
    pub cost: u64,
}

impl Model {
    /// Parse from the common `v <signed literals> 0` / `o <cost>` solver
    /// output convention (the de facto MaxSAT Evaluation output format).
    pub fn parse(output: &str, num_vars: u32) -> Option<Self> {
        let mut assignment = vec![false; num_vars as usize];
        let mut cost = None;
        let mut saw_assignment = false;
        for line in output.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("o ") {
                cost = rest.trim().parse::<u64>().ok();
            } else if let Some(rest) = line.strip_prefix("v ") {
                saw_assignment = true;
                for tok in rest.split_whitespace() {
                    let lit: i64 = tok.parse().ok()?;
                    if lit == 0 {
                        continue;
                    }
                    let idx = (lit.unsigned_abs() - 1) as usize;
                    if idx < assignment.len() {
                        assignment[idx] = lit > 0;
                    }
                }
            }
        }
        if !saw_assignment {
            return None;
        }
        Some(Self {
            assignment,
            cost: cost.unwrap_or(0),
        })
    }

    pub fn value(&self, var: u32) -> bool {
        self.assignment.get((var - 1) as usize).copied().unwrap_or(false)
    }
}
