//! # Reactor BVP Utilities Module
//!
//! Shared plumbing for the plug-flow reactor boundary value problem: the crate-wide error
//! type, the solver settings, the boundary-condition bookkeeping and the templates used to
//! seed initial profiles.
//!
//! ## Main Structures
//!
//! - **`ReactorError`**: every fallible operation in the crate returns this type
//!   - configuration errors are raised by constructors
//!   - shape errors are raised at call time
//!   - `NotConverged` is returned only when a caller explicitly demands a converged table
//!
//! - **`SimulationSettings`**: tolerance, node limit, verbosity and boundary tolerance handed
//!   to the collocation solver. Serializable, every field has a default.
//!
//! - **`SolverStatus`**: termination of the collocation solver, decoded from its status code.
//!
//! - **`BorderValue`**: a single scalar fixed either at the inlet (`z = 0`) or at the outlet
//!   (`z = L`). Built from a `{"in": value}` / `{"out": value}` map.
//!
//! - **`BorderConditions`**: stacked inlet and outlet vectors aligned with the state rows.
//!   Records which rows are constrained at each edge and evaluates the boundary residuals.
//!
//! - **`InitialTemplate`**: profile generators used by the balances to seed the first guess.
//!
//! ## Boundary Residual Layout
//! Residuals are emitted in a fixed order: first one term per inlet-constrained row (in row
//! order) evaluated at the left edge, then one term per outlet-constrained row evaluated at the
//! right edge. A row constrained at both edges therefore produces two terms.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        found: usize,
    },
    #[error("Substance '{substance}' has no {property} defined")]
    MissingProperty { substance: String, property: String },
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error("Simulation did not converge ({status:?}): {message}")]
    NotConverged { status: SolverStatus, message: String },
    #[error("BVP solver error: {0}")]
    Solver(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReactorError {
    pub fn shape(context: &str, expected: usize, found: usize) -> Self {
        ReactorError::ShapeMismatch {
            context: context.to_string(),
            expected,
            found,
        }
    }
}

/// Termination of the collocation solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    Converged,
    MaxNodesExceeded,
    SingularJacobian,
    BcToleranceNotMet,
}

impl SolverStatus {
    /// `BVPResult::status` code: 0 converged, 1 max nodes, 2 singular Jacobian, 3 bc tolerance
    pub fn from_code(code: i32) -> Result<Self, ReactorError> {
        match code {
            0 => Ok(SolverStatus::Converged),
            1 => Ok(SolverStatus::MaxNodesExceeded),
            2 => Ok(SolverStatus::SingularJacobian),
            3 => Ok(SolverStatus::BcToleranceNotMet),
            other => Err(ReactorError::Solver(format!("unknown status code {}", other))),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SolverStatus::Converged => "The algorithm converged to the desired accuracy.",
            SolverStatus::MaxNodesExceeded => "The maximum number of mesh nodes is exceeded.",
            SolverStatus::SingularJacobian => {
                "A singular Jacobian encountered when solving the collocation system."
            }
            SolverStatus::BcToleranceNotMet => {
                "The solver was unable to satisfy boundary conditions tolerance on iteration 10."
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SolverStatus::Converged)
    }
}

/// Template types for initial guess generation
#[derive(Debug, Clone, PartialEq)]
pub enum InitialTemplate {
    /// Linear interpolation between start and end values
    Linear { start: f64, end: f64 },
    /// Constant value throughout domain
    Constant { value: f64 },
}

impl InitialTemplate {
    /// Generate values for n_steps grid points
    pub fn generate(&self, n_steps: usize) -> Vec<f64> {
        let mut values = Vec::with_capacity(n_steps);
        let denominator = if n_steps > 1 { (n_steps - 1) as f64 } else { 1.0 };

        for i in 0..n_steps {
            let z = i as f64 / denominator; // z ∈ [0, 1]

            let value = match self {
                InitialTemplate::Linear { start, end } => start + (end - start) * z,
                InitialTemplate::Constant { value } => *value,
            };

            values.push(value);
        }

        values
    }
}

fn default_tol() -> f64 {
    1e-3
}

fn default_max_nodes() -> usize {
    1000
}

/// Convergence controls of a single `simulate` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Tolerance for the relative RMS residual of the collocation spline
    #[serde(default = "default_tol")]
    pub tol: f64,
    /// Maximum number of mesh nodes allowed during refinement
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    /// 0 silent, 1 termination report, 2 progress on every iteration
    #[serde(default)]
    pub verbose: u8,
    /// Tolerance for the boundary residuals, `tol` when absent
    #[serde(default)]
    pub bc_tol: Option<f64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tol: default_tol(),
            max_nodes: default_max_nodes(),
            verbose: 0,
            bc_tol: None,
        }
    }
}

impl SimulationSettings {
    pub fn new(tol: f64, max_nodes: usize, verbose: u8, bc_tol: Option<f64>) -> Self {
        Self {
            tol,
            max_nodes,
            verbose,
            bc_tol,
        }
    }

    pub fn validate(&self) -> Result<(), ReactorError> {
        if !(self.tol > 0.0) {
            return Err(ReactorError::InvalidConfiguration(format!(
                "tolerance must be positive, got {}",
                self.tol
            )));
        }
        if self.max_nodes < 2 {
            return Err(ReactorError::InvalidConfiguration(format!(
                "max_nodes must be at least 2, got {}",
                self.max_nodes
            )));
        }
        if let Some(bc_tol) = self.bc_tol {
            if !(bc_tol > 0.0) {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "bc_tol must be positive, got {}",
                    bc_tol
                )));
            }
        }
        Ok(())
    }
}

/// A scalar fixed at exactly one edge of the reactor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BorderValue {
    In(f64),
    Out(f64),
}

impl BorderValue {
    /// Parse a `{"in": value}` or `{"out": value}` map. Any other key, both keys or none
    /// is a configuration error.
    pub fn from_map(map: &HashMap<String, f64>, variable: &str) -> Result<Self, ReactorError> {
        if let Some(key) = map.keys().find(|k| *k != "in" && *k != "out") {
            return Err(ReactorError::InvalidConfiguration(format!(
                "{} border condition: unknown key '{}', expected 'in' or 'out'",
                variable, key
            )));
        }
        match (map.get("in"), map.get("out")) {
            (Some(value), None) => Ok(BorderValue::In(*value)),
            (None, Some(value)) => Ok(BorderValue::Out(*value)),
            (Some(_), Some(_)) => Err(ReactorError::InvalidConfiguration(format!(
                "{} balance error: only inlet or outlet border condition specification allowed",
                variable
            ))),
            (None, None) => Err(ReactorError::InvalidConfiguration(format!(
                "{} balance error: an inlet or outlet border condition is required",
                variable
            ))),
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            BorderValue::In(value) | BorderValue::Out(value) => *value,
        }
    }

    pub fn is_inlet(&self) -> bool {
        matches!(self, BorderValue::In(_))
    }

    /// (inlet, outlet) pair as consumed by `BorderConditions`
    pub fn pair(&self) -> (Option<f64>, Option<f64>) {
        match self {
            BorderValue::In(value) => (Some(*value), None),
            BorderValue::Out(value) => (None, Some(*value)),
        }
    }

    pub fn to_map(&self) -> HashMap<String, f64> {
        let key = if self.is_inlet() { "in" } else { "out" };
        HashMap::from([(key.to_string(), self.value())])
    }
}

/// Inlet and outlet specifications stacked in state-row order
#[derive(Debug, Clone, PartialEq)]
pub struct BorderConditions {
    pub inlet_conditions: Vec<Option<f64>>,
    pub outlet_conditions: Vec<Option<f64>>,
    /// rows constrained at z = 0
    pub in_index: Vec<usize>,
    /// rows constrained at z = L
    pub out_index: Vec<usize>,
}

impl BorderConditions {
    pub fn new(
        inlet_conditions: Vec<Option<f64>>,
        outlet_conditions: Vec<Option<f64>>,
    ) -> Result<Self, ReactorError> {
        if inlet_conditions.len() != outlet_conditions.len() {
            return Err(ReactorError::shape(
                "border conditions",
                inlet_conditions.len(),
                outlet_conditions.len(),
            ));
        }
        let in_index = inlet_conditions
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|_| i))
            .collect();
        let out_index = outlet_conditions
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|_| i))
            .collect();
        Ok(Self {
            inlet_conditions,
            outlet_conditions,
            in_index,
            out_index,
        })
    }

    /// Build from one (inlet, outlet) pair per state row
    pub fn from_pairs(pairs: Vec<(Option<f64>, Option<f64>)>) -> Result<Self, ReactorError> {
        let (inlet, outlet): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self::new(inlet, outlet)
    }

    /// number of state rows covered
    pub fn n_rows(&self) -> usize {
        self.inlet_conditions.len()
    }

    /// number of residual terms produced by `residuals`
    pub fn n_residuals(&self) -> usize {
        self.in_index.len() + self.out_index.len()
    }

    /// Boundary residuals: inlet terms from `ya` first, then outlet terms from `yb`
    pub fn residuals(&self, ya: &DVector<f64>, yb: &DVector<f64>) -> DVector<f64> {
        let inlet = self
            .inlet_conditions
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|value| ya[i] - value));
        let outlet = self
            .outlet_conditions
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|value| yb[i] - value));
        DVector::from_iterator(self.n_residuals(), inlet.chain(outlet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_templates() {
        let linear = InitialTemplate::Linear {
            start: 0.0,
            end: 2.0,
        }
        .generate(5);
        assert_eq!(linear.len(), 5);
        assert_relative_eq!(linear[0], 0.0);
        assert_relative_eq!(linear[2], 1.0);
        assert_relative_eq!(linear[4], 2.0);

        let constant = InitialTemplate::Constant { value: 3.5 }.generate(4);
        assert!(constant.iter().all(|v| *v == 3.5));
    }

    #[test]
    fn test_border_value_from_map() {
        let inlet = HashMap::from([("in".to_string(), 101325.0)]);
        let outlet = HashMap::from([("out".to_string(), 90000.0)]);
        assert_eq!(
            BorderValue::from_map(&inlet, "Pressure").unwrap(),
            BorderValue::In(101325.0)
        );
        assert_eq!(
            BorderValue::from_map(&outlet, "Pressure").unwrap().pair(),
            (None, Some(90000.0))
        );

        let both = HashMap::from([("in".to_string(), 1.0), ("out".to_string(), 2.0)]);
        assert!(matches!(
            BorderValue::from_map(&both, "Pressure"),
            Err(ReactorError::InvalidConfiguration(_))
        ));
        assert!(BorderValue::from_map(&HashMap::new(), "Pressure").is_err());
        let typo = HashMap::from([("inlet".to_string(), 1.0)]);
        assert!(BorderValue::from_map(&typo, "Pressure").is_err());
    }

    #[test]
    fn test_border_conditions_inlet_only_row() {
        let bc = BorderConditions::from_pairs(vec![(Some(1.0), None), (None, Some(5.0))]).unwrap();
        assert_eq!(bc.in_index, vec![0]);
        assert_eq!(bc.out_index, vec![1]);

        let ya = DVector::from_vec(vec![1.5, 100.0]);
        let yb = DVector::from_vec(vec![-100.0, 4.0]);
        let res = bc.residuals(&ya, &yb);
        // one term per row, inlet first
        assert_eq!(res.len(), 2);
        assert_relative_eq!(res[0], 0.5);
        assert_relative_eq!(res[1], -1.0);
    }

    #[test]
    fn test_border_conditions_row_with_both_edges() {
        let bc =
            BorderConditions::new(vec![Some(2.0), Some(7.0)], vec![Some(3.0), None]).unwrap();
        assert_eq!(bc.n_rows(), 2);
        assert_eq!(bc.n_residuals(), 3);
        let ya = DVector::from_vec(vec![2.5, 7.0]);
        let yb = DVector::from_vec(vec![4.0, 0.0]);
        let res = bc.residuals(&ya, &yb);
        assert_eq!(res.as_slice(), &[0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_border_conditions_length_mismatch() {
        let bc = BorderConditions::new(vec![Some(1.0)], vec![None, None]);
        assert!(matches!(bc, Err(ReactorError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_from_pairs_matches_new() {
        let pairs = vec![(Some(1.0), Some(2.0)), (None, None), (None, Some(4.0))];
        let bc = BorderConditions::from_pairs(pairs).unwrap();
        let direct = BorderConditions::new(
            vec![Some(1.0), None, None],
            vec![Some(2.0), None, Some(4.0)],
        )
        .unwrap();
        assert_eq!(bc, direct);
        assert_eq!(bc.in_index, vec![0]);
        assert_eq!(bc.out_index, vec![0, 2]);
        let res = bc.residuals(
            &DVector::from_vec(vec![1.0, 9.0, 9.0]),
            &DVector::from_vec(vec![3.0, 9.0, 1.0]),
        );
        assert_eq!(res.as_slice(), &[0.0, 1.0, -3.0]);
    }

    #[test]
    fn test_solver_status_codes() {
        assert_eq!(SolverStatus::from_code(0).unwrap(), SolverStatus::Converged);
        assert_eq!(
            SolverStatus::from_code(1).unwrap(),
            SolverStatus::MaxNodesExceeded
        );
        assert_eq!(
            SolverStatus::from_code(2).unwrap(),
            SolverStatus::SingularJacobian
        );
        assert_eq!(
            SolverStatus::from_code(3).unwrap(),
            SolverStatus::BcToleranceNotMet
        );
        assert!(matches!(
            SolverStatus::from_code(7),
            Err(ReactorError::Solver(_))
        ));
        assert!(SolverStatus::Converged.is_success());
        assert!(!SolverStatus::MaxNodesExceeded.is_success());
    }

    #[test]
    fn test_settings_defaults_from_json() {
        let settings: SimulationSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, SimulationSettings::default());
        let settings: SimulationSettings =
            serde_json::from_str(r#"{"tol": 1e-4, "bc_tol": 1e-3}"#).unwrap();
        assert_relative_eq!(settings.tol, 1e-4);
        assert_eq!(settings.max_nodes, 1000);
        assert_eq!(settings.bc_tol, Some(1e-3));
        assert!(SimulationSettings::new(-1.0, 10, 0, None).validate().is_err());
    }
}
