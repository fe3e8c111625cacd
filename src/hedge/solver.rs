//! Dense two-phase simplex for small box-bounded linear programs.
//!
//! Solves
//!
//! ```text
//! minimize    c · x
//! subject to  A x = b
//!             lower_i <= x_i <= upper_i
//! ```
//!
//! Variables are shifted to `y = x − lower`, fixed variables are eliminated,
//! and finite upper bounds become extra rows with a slack column. Phase one
//! finds a feasible basis using one artificial column per row; phase two
//! optimizes `c`. Bland's rule picks entering and leaving columns, so the
//! method cannot cycle and the result is deterministic.

use tracing::{instrument, trace};

use crate::error::{OptimizerError, SolverDiagnostic};

/// Box bound on one variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    /// Lower limit (finite).
    pub lower: f64,
    /// Upper limit, `None` for unbounded above.
    pub upper: Option<f64>,
}

impl Bound {
    /// `[0, ∞)`.
    pub const NON_NEGATIVE: Self = Self {
        lower: 0.0,
        upper: None,
    };

    /// `[value, value]`.
    pub fn fixed(value: f64) -> Self {
        Self {
            lower: value,
            upper: Some(value),
        }
    }
}

impl Default for Bound {
    fn default() -> Self {
        Self::NON_NEGATIVE
    }
}

/// Iteration cap and numerical tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Maximum number of pivots across both phases.
    pub max_iterations: usize,
    /// Pivot, optimality and feasibility tolerance.
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-9,
        }
    }
}

/// Optimal point of a [`LinearProgram`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Optimal variable values.
    pub x: Vec<f64>,
    /// Objective value `c · x`.
    pub objective: f64,
    /// Pivots performed.
    pub iterations: usize,
}

/// Linear program with equality constraints and box bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    objective: Vec<f64>,
    equalities: Vec<(Vec<f64>, f64)>,
    bounds: Vec<Bound>,
}

impl LinearProgram {
    /// Minimize `objective · x`; every variable starts bounded to `[0, ∞)`.
    pub fn minimize(objective: Vec<f64>) -> Self {
        let bounds = vec![Bound::NON_NEGATIVE; objective.len()];
        Self {
            objective,
            equalities: Vec::new(),
            bounds,
        }
    }

    /// Add the constraint `coefficients · x = rhs`.
    pub fn subject_to(mut self, coefficients: Vec<f64>, rhs: f64) -> Self {
        self.equalities.push((coefficients, rhs));
        self
    }

    /// Replace the bound on variable `index`.
    pub fn with_bound(mut self, index: usize, bound: Bound) -> Self {
        if let Some(slot) = self.bounds.get_mut(index) {
            *slot = bound;
        }
        self
    }

    /// Number of variables.
    pub fn dimension(&self) -> usize {
        self.objective.len()
    }

    /// Solve the program.
    #[instrument(level = "debug", skip_all, fields(vars = self.dimension(), rows = self.equalities.len()))]
    pub fn solve(&self, options: &SolverOptions) -> Result<Solution, OptimizerError> {
        self.check_shape()?;
        let tol = options.tolerance;
        let n = self.dimension();

        // Shift to y = x - lower and drop fixed columns.
        let free: Vec<usize> = (0..n)
            .filter(|&i| match self.bounds[i].upper {
                Some(upper) => upper - self.bounds[i].lower > tol,
                None => true,
            })
            .collect();
        let capped: Vec<(usize, f64)> = free
            .iter()
            .enumerate()
            .filter_map(|(col, &i)| {
                self.bounds[i]
                    .upper
                    .map(|upper| (col, upper - self.bounds[i].lower))
            })
            .collect();

        let structural = free.len();
        let slacks = capped.len();
        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(self.equalities.len() + slacks);
        let mut rhs: Vec<f64> = Vec::with_capacity(self.equalities.len() + slacks);

        for (coefficients, b) in &self.equalities {
            let shifted = b - coefficients
                .iter()
                .zip(&self.bounds)
                .map(|(a, bound)| a * bound.lower)
                .sum::<f64>();
            let mut row = vec![0.0; structural + slacks];
            for (col, &i) in free.iter().enumerate() {
                row[col] = coefficients[i];
            }
            rows.push(row);
            rhs.push(shifted);
        }
        for (s, &(col, width)) in capped.iter().enumerate() {
            let mut row = vec![0.0; structural + slacks];
            row[col] = 1.0;
            row[structural + s] = 1.0;
            rows.push(row);
            rhs.push(width);
        }

        let rhs_scale = 1.0 + rhs.iter().map(|b| b.abs()).sum::<f64>();
        let mut tableau = Tableau::new(rows, rhs, structural + slacks, tol);
        let art_start = structural + slacks;
        let mut iterations = 0;

        // Phase one: minimize the sum of artificials.
        tableau.set_cost(|j| if j >= art_start { 1.0 } else { 0.0 });
        tableau
            .run(|_| true, &mut iterations, options.max_iterations)
            .map_err(|d| failed(d, &free, iterations))?;

        let residual = tableau.objective_value();
        if residual > tol * rhs_scale {
            return Err(failed(SolverDiagnostic::Infeasible { residual }, &free, iterations));
        }
        tableau.evict_artificials(art_start);

        // Phase two: minimize the real objective over non-artificial columns.
        let cost: Vec<f64> = free.iter().map(|&i| self.objective[i]).collect();
        tableau.set_cost(|j| cost.get(j).copied().unwrap_or(0.0));
        tableau
            .run(|j| j < art_start, &mut iterations, options.max_iterations)
            .map_err(|d| failed(d, &free, iterations))?;

        let y = tableau.basic_values(structural);
        let mut x: Vec<f64> = self.bounds.iter().map(|b| b.lower).collect();
        for (col, &i) in free.iter().enumerate() {
            x[i] += y[col];
        }
        self.snap_to_bounds(&mut x, tol);
        self.check_feasible(&x, tol, iterations)?;

        let objective = self.objective.iter().zip(&x).map(|(c, v)| c * v).sum::<f64>();
        trace!(?x, objective, iterations, "simplex optimum");

        Ok(Solution {
            x,
            objective,
            iterations,
        })
    }

    fn check_shape(&self) -> Result<(), OptimizerError> {
        let n = self.dimension();
        let malformed = |msg: String| OptimizerError::OptimizationFailed {
            diagnostic: SolverDiagnostic::Malformed(msg),
            iterations: 0,
        };

        if let Some((row, _)) = self
            .equalities
            .iter()
            .enumerate()
            .find(|(_, (a, _))| a.len() != n)
        {
            return Err(malformed(format!("constraint {row} does not have {n} coefficients")));
        }
        for (i, bound) in self.bounds.iter().enumerate() {
            if !bound.lower.is_finite() {
                return Err(malformed(format!("lower bound of variable {i} is not finite")));
            }
            if bound.upper.is_some_and(|u| u < bound.lower) {
                return Err(malformed(format!("bounds of variable {i} are empty")));
            }
        }
        let all_finite = self.objective.iter().all(|c| c.is_finite())
            && self
                .equalities
                .iter()
                .all(|(a, b)| b.is_finite() && a.iter().all(|v| v.is_finite()));
        if !all_finite {
            return Err(malformed("non-finite coefficient".to_string()));
        }
        Ok(())
    }

    fn snap_to_bounds(&self, x: &mut [f64], tol: f64) {
        for (v, bound) in x.iter_mut().zip(&self.bounds) {
            if *v < bound.lower && *v > bound.lower - tol {
                *v = bound.lower;
            }
            if let Some(upper) = bound.upper {
                if *v > upper && *v < upper + tol {
                    *v = upper;
                }
            }
        }
    }

    fn check_feasible(&self, x: &[f64], tol: f64, iterations: usize) -> Result<(), OptimizerError> {
        for (row, (a, b)) in self.equalities.iter().enumerate() {
            let lhs: f64 = a.iter().zip(x).map(|(a, v)| a * v).sum();
            let scale = 1.0 + b.abs() + a.iter().zip(x).map(|(a, v)| (a * v).abs()).sum::<f64>();
            let violation = (lhs - b).abs();
            if violation > tol * scale {
                return Err(OptimizerError::OptimizationFailed {
                    diagnostic: SolverDiagnostic::ConstraintViolation { row, violation },
                    iterations,
                });
            }
        }
        Ok(())
    }
}

fn failed(diagnostic: SolverDiagnostic, free: &[usize], iterations: usize) -> OptimizerError {
    // Report unbounded columns by original variable index.
    let diagnostic = match diagnostic {
        SolverDiagnostic::Unbounded { column } => SolverDiagnostic::Unbounded {
            column: free.get(column).copied().unwrap_or(column),
        },
        other => other,
    };
    OptimizerError::OptimizationFailed {
        diagnostic,
        iterations,
    }
}

/// Simplex tableau in canonical form: `rows · [columns | rhs]` plus a
/// reduced-cost row whose last entry is the negated objective value.
#[derive(Debug)]
struct Tableau {
    rows: Vec<Vec<f64>>,
    cost: Vec<f64>,
    basis: Vec<usize>,
    columns: usize,
    tol: f64,
}

impl Tableau {
    /// Append one artificial column per row and start from the artificial
    /// basis. Rows are flipped so every right-hand side is non-negative.
    fn new(rows: Vec<Vec<f64>>, rhs: Vec<f64>, width: usize, tol: f64) -> Self {
        let m = rows.len();
        let columns = width + m;

        let rows: Vec<Vec<f64>> = rows
            .into_iter()
            .zip(rhs)
            .enumerate()
            .map(|(i, (row, b))| {
                let sign = if b < 0.0 { -1.0 } else { 1.0 };
                let mut full: Vec<f64> = row.into_iter().map(|v| v * sign).collect();
                full.extend((0..m).map(|k| if k == i { 1.0 } else { 0.0 }));
                full.push(b * sign);
                full
            })
            .collect();

        Self {
            rows,
            cost: vec![0.0; columns + 1],
            basis: (width..columns).collect(),
            columns,
            tol,
        }
    }

    /// Load a cost vector and price out the current basis.
    fn set_cost(&mut self, cost: impl Fn(usize) -> f64) {
        self.cost = (0..self.columns).map(&cost).collect();
        self.cost.push(0.0);

        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            let cb = cost(basic);
            if cb != 0.0 {
                for (c, v) in self.cost.iter_mut().zip(row) {
                    *c -= cb * v;
                }
            }
        }
    }

    fn objective_value(&self) -> f64 {
        -self.cost[self.columns]
    }

    /// Pivot until no allowed column has a negative reduced cost.
    fn run(
        &mut self,
        allowed: impl Fn(usize) -> bool,
        iterations: &mut usize,
        max_iterations: usize,
    ) -> Result<(), SolverDiagnostic> {
        loop {
            let Some(entering) = (0..self.columns).find(|&j| allowed(j) && self.cost[j] < -self.tol) else {
                return Ok(());
            };
            if *iterations >= max_iterations {
                return Err(SolverDiagnostic::IterationLimit { max_iterations });
            }

            let rhs = self.columns;
            let mut leaving: Option<(usize, f64)> = None;
            for (i, row) in self.rows.iter().enumerate() {
                let a = row[entering];
                if a <= self.tol {
                    continue;
                }
                let ratio = row[rhs] / a;
                leaving = match leaving {
                    None => Some((i, ratio)),
                    Some((best, best_ratio)) => {
                        if ratio < best_ratio - self.tol
                            || (ratio <= best_ratio + self.tol && self.basis[i] < self.basis[best])
                        {
                            Some((i, ratio))
                        } else {
                            Some((best, best_ratio))
                        }
                    }
                };
            }

            let Some((row, _)) = leaving else {
                return Err(SolverDiagnostic::Unbounded { column: entering });
            };
            trace!(entering, leaving = self.basis[row], "pivot");
            self.pivot(row, entering);
            *iterations += 1;
        }
    }

    /// Swap zero-valued artificials out of the basis where a real column can
    /// replace them. Rows with no such column are redundant and keep their
    /// artificial at zero.
    fn evict_artificials(&mut self, art_start: usize) {
        for r in 0..self.rows.len() {
            if self.basis[r] < art_start {
                continue;
            }
            if let Some(col) = (0..art_start).find(|&j| self.rows[r][j].abs() > self.tol) {
                self.pivot(r, col);
            }
        }
    }

    fn pivot(&mut self, r: usize, c: usize) {
        let p = self.rows[r][c];
        for v in self.rows[r].iter_mut() {
            *v /= p;
        }
        let pivot_row = self.rows[r].clone();

        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == r {
                continue;
            }
            let factor = row[c];
            if factor != 0.0 {
                for (v, pv) in row.iter_mut().zip(&pivot_row) {
                    *v -= factor * pv;
                }
            }
        }

        let factor = self.cost[c];
        if factor != 0.0 {
            for (v, pv) in self.cost.iter_mut().zip(&pivot_row) {
                *v -= factor * pv;
            }
        }
        self.basis[r] = c;
    }

    /// Values of the first `count` columns at the current basic solution.
    fn basic_values(&self, count: usize) -> Vec<f64> {
        let mut values = vec![0.0; count];
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            if basic < count {
                values[basic] = row[self.columns];
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn solve(program: &LinearProgram) -> Result<Solution, OptimizerError> {
        program.solve(&SolverOptions::default())
    }

    #[test]
    fn minimizes_over_simplex() {
        // min x0 + 2 x1 + 3 x2  s.t. x0 + x1 + x2 = 1
        let program = LinearProgram::minimize(vec![1.0, 2.0, 3.0]).subject_to(vec![1.0, 1.0, 1.0], 1.0);
        let solution = solve(&program).unwrap();

        assert!((solution.x[0] - 1.0).abs() < EPS);
        assert!(solution.x[1].abs() < EPS);
        assert!(solution.x[2].abs() < EPS);
        assert!((solution.objective - 1.0).abs() < EPS);
    }

    #[test]
    fn negative_rhs_is_handled() {
        // min -x1  s.t. x0 - x1 = -2, x1 <= 5  ->  x1 = 5, x0 = 3
        let program = LinearProgram::minimize(vec![0.0, -1.0])
            .subject_to(vec![1.0, -1.0], -2.0)
            .with_bound(1, Bound { lower: 0.0, upper: Some(5.0) });
        let solution = solve(&program).unwrap();

        assert!((solution.x[0] - 3.0).abs() < EPS);
        assert!((solution.x[1] - 5.0).abs() < EPS);
    }

    #[test]
    fn fixed_variable_is_respected() {
        // min -x0 - x1  s.t. x0 - x1 = 0, x0 fixed at 4
        let program = LinearProgram::minimize(vec![-1.0, -1.0])
            .subject_to(vec![1.0, -1.0], 0.0)
            .with_bound(0, Bound::fixed(4.0));
        let solution = solve(&program).unwrap();

        assert_eq!(solution.x[0], 4.0);
        assert!((solution.x[1] - 4.0).abs() < EPS);
    }

    #[test]
    fn redundant_constraints_are_tolerated() {
        let program = LinearProgram::minimize(vec![1.0, 1.0])
            .subject_to(vec![1.0, 1.0], 2.0)
            .subject_to(vec![2.0, 2.0], 4.0);
        let solution = solve(&program).unwrap();

        assert!((solution.x[0] + solution.x[1] - 2.0).abs() < EPS);
    }

    #[test]
    fn infeasible_program_fails() {
        // x0 + x1 = -1 with x >= 0
        let program = LinearProgram::minimize(vec![1.0, 1.0]).subject_to(vec![1.0, 1.0], -1.0);
        let err = solve(&program).unwrap_err();

        assert!(matches!(
            err,
            OptimizerError::OptimizationFailed {
                diagnostic: SolverDiagnostic::Infeasible { .. },
                ..
            }
        ));
    }

    #[test]
    fn unbounded_program_fails() {
        // min -x0  s.t. x0 - x1 = 0
        let program = LinearProgram::minimize(vec![-1.0, 0.0]).subject_to(vec![1.0, -1.0], 0.0);
        let err = solve(&program).unwrap_err();

        assert!(matches!(
            err,
            OptimizerError::OptimizationFailed {
                diagnostic: SolverDiagnostic::Unbounded { .. },
                ..
            }
        ));
    }

    #[test]
    fn iteration_cap_surfaces_as_failure() {
        let program = LinearProgram::minimize(vec![1.0, 2.0, 3.0]).subject_to(vec![1.0, 1.0, 1.0], 1.0);
        let options = SolverOptions {
            max_iterations: 0,
            tolerance: 1e-9,
        };

        assert!(matches!(
            program.solve(&options),
            Err(OptimizerError::OptimizationFailed {
                diagnostic: SolverDiagnostic::IterationLimit { max_iterations: 0 },
                iterations: 0,
            })
        ));
    }

    #[test]
    fn malformed_constraint_is_rejected() {
        let program = LinearProgram::minimize(vec![1.0, 1.0]).subject_to(vec![1.0], 1.0);

        assert!(matches!(
            solve(&program),
            Err(OptimizerError::OptimizationFailed {
                diagnostic: SolverDiagnostic::Malformed(_),
                ..
            })
        ));
    }
}
