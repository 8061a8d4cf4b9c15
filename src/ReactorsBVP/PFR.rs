//! # Plug flow reactor
//!
//! Orchestrates the mass, energy and pressure balances into one boundary value problem and
//! hands it to the collocation solver of `RustedSciThe` (`BVP_sci_nalgebra::solve_bvp`).
//!
//! ## State layout
//!
//! The state array has one column per grid node and the rows
//!
//! | rows | variable | balance |
//! |------|----------|---------|
//! | `0..n` | molar flow of each substance (mixture order) | mass |
//! | `n` | temperature | energy |
//! | `n + 1` | refrigerant temperature | energy |
//! | `n + 2` | pressure | pressure |
//!
//! ## Lifecycle of `simulate`
//!
//! 1. `initial_profile_builder`: uniform grid of the configured size and the stacked seed
//! 2. `border_conditions_builder`: inlet and outlet vectors aligned with the rows
//! 3. the solver calls `evaluate_balances` on changing meshes and `border_conditions` on the
//!    edge states of a working copy of the reactor that shares its `Kinetics`. The solver
//!    callbacks are infallible, so the first balance error is kept aside and returned once
//!    the solver is done
//! 4. the final mesh and state are packed into a `PFRTable` with the solver status; the
//!    profile fields are refreshed on the final mesh
//!
//! The reactor owns its `Kinetics`, which owns the `Mixture`. Swapping either goes through
//! `with_mix` / `set_kinetics` and drops stored results.
use crate::Kinetics::User_kinetics::{KineticArgument, Kinetics, RateFunction};
use crate::ReactorsBVP::PFR_results::PFRTable;
use crate::ReactorsBVP::energy_balances::{EnergyBalance, EnergyBalanceModel};
use crate::ReactorsBVP::mass_balances::{MassBalance, MassBalanceModel};
use crate::ReactorsBVP::pressure_balances::{PressureBalance, PressureBalanceModel};
use crate::ReactorsBVP::reactor_BVP_utils::{
    BorderConditions, InitialTemplate, ReactorError, SimulationSettings, SolverStatus,
};
use crate::Thermodynamics::Mixture::Mixture;
use log::{debug, info, warn};
use RustedSciThe::numerical::BVP_sci::legacy::BVP_sci_nalgebra::{BVPResult, solve_bvp};
use nalgebra::{DMatrix, DVector};
use std::cell::RefCell;
use std::rc::Rc;

/// Capabilities shared by reactor models
pub trait ReactorBase {
    fn kinetics(&self) -> &Kinetics;

    fn mix(&self) -> &Mixture {
        self.kinetics().mix()
    }

    fn stoichiometry(&self) -> &DMatrix<f64> {
        self.kinetics().stoichiometry()
    }

    fn list_of_reactions(&self) -> &[RateFunction] {
        self.kinetics().list_of_reactions()
    }

    fn kinetic_argument(&self) -> KineticArgument {
        self.kinetics().kinetic_argument()
    }

    fn simulate_with(&mut self, settings: &SimulationSettings) -> Result<SolverStatus, ReactorError>;
}

#[derive(Debug)]
pub struct PFR {
    /// shared with the working copy handed to the solver during `simulate`
    kinetics: Rc<Kinetics>,
    reactor_length: f64,
    transversal_area: f64,
    /// number of nodes of the initial grid, restored on every simulate
    grid_size: usize,
    mass_balance: MassBalance,
    energy_balance: EnergyBalance,
    pressure_balance: PressureBalance,
    /// axial coordinate of the profiles below
    pub z: DVector<f64>,
    /// molar flows (substances × nodes)
    pub mass_profile: DMatrix<f64>,
    pub mole_fraction_profile: DMatrix<f64>,
    pub temperature_profile: DVector<f64>,
    pub refrigerant_temperature_profile: DVector<f64>,
    pub pressure_profile: DVector<f64>,
    /// rate of each reaction (reactions × nodes)
    pub r_rates_profile: DMatrix<f64>,
    /// net production rate of each substance (substances × nodes)
    pub substance_rates_profile: DMatrix<f64>,
    /// stacked seed handed to the solver
    pub initial_variables_profile: DMatrix<f64>,
    pub border_conditions: Option<BorderConditions>,
    pub ode_solution: Option<BVPResult>,
    pub simulation_df: Option<PFRTable>,
}

impl PFR {
    pub fn new(
        kinetics: Kinetics,
        reactor_length: f64,
        transversal_area: f64,
        grid_size: usize,
        mass_balance: MassBalance,
        energy_balance: EnergyBalance,
        pressure_balance: PressureBalance,
    ) -> Result<Self, ReactorError> {
        if !(reactor_length > 0.0) || !reactor_length.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "reactor length must be positive, got {}",
                reactor_length
            )));
        }
        if !(transversal_area > 0.0) || !transversal_area.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "transversal area must be positive, got {}",
                transversal_area
            )));
        }
        if grid_size < 2 {
            return Err(ReactorError::InvalidConfiguration(format!(
                "grid size must be at least 2, got {}",
                grid_size
            )));
        }
        let n_substances = kinetics.mix().len();
        let n_reactions = kinetics.n_reactions();
        let reactor = Self {
            kinetics: Rc::new(kinetics),
            reactor_length,
            transversal_area,
            grid_size,
            mass_balance,
            energy_balance,
            pressure_balance,
            z: DVector::zeros(0),
            mass_profile: DMatrix::zeros(n_substances, 0),
            mole_fraction_profile: DMatrix::zeros(n_substances, 0),
            temperature_profile: DVector::zeros(0),
            refrigerant_temperature_profile: DVector::zeros(0),
            pressure_profile: DVector::zeros(0),
            r_rates_profile: DMatrix::zeros(n_reactions, 0),
            substance_rates_profile: DMatrix::zeros(n_substances, 0),
            initial_variables_profile: DMatrix::zeros(n_substances + 3, 0),
            border_conditions: None,
            ode_solution: None,
            simulation_df: None,
        };
        // unknown substance names or missing border values surface here
        reactor.collect_border_pairs()?;
        Ok(reactor)
    }

    pub fn reactor_length(&self) -> f64 {
        self.reactor_length
    }

    pub fn transversal_area(&self) -> f64 {
        self.transversal_area
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn mass_balance(&self) -> &MassBalance {
        &self.mass_balance
    }

    pub fn energy_balance(&self) -> &EnergyBalance {
        &self.energy_balance
    }

    pub fn pressure_balance(&self) -> &PressureBalance {
        &self.pressure_balance
    }

    /// number of state rows: substances plus temperature, refrigerant temperature, pressure
    pub fn n_variables(&self) -> usize {
        self.mix().len() + 3
    }

    fn clear_results(&mut self) {
        self.border_conditions = None;
        self.ode_solution = None;
        self.simulation_df = None;
    }

    /// Rebuild the reactor around another mixture, keeping balances and geometry
    pub fn with_mix(self, mix: Mixture) -> Result<Self, ReactorError> {
        let kinetics = Rc::try_unwrap(self.kinetics)
            .map_err(|_| {
                ReactorError::InvalidConfiguration(
                    "kinetics are still shared with a running solver".to_string(),
                )
            })?
            .with_mix(mix)?;
        PFR::new(
            kinetics,
            self.reactor_length,
            self.transversal_area,
            self.grid_size,
            self.mass_balance,
            self.energy_balance,
            self.pressure_balance,
        )
    }

    /// Replace the kinetics (and with it the mixture). Stored results are dropped.
    pub fn set_kinetics(&mut self, kinetics: Kinetics) -> Result<(), ReactorError> {
        let previous = std::mem::replace(&mut self.kinetics, Rc::new(kinetics));
        if let Err(e) = self.collect_border_pairs() {
            self.kinetics = previous;
            return Err(e);
        }
        self.clear_results();
        Ok(())
    }

    /// Replace the three balances. Stored results are dropped.
    pub fn set_balances(
        &mut self,
        mass_balance: MassBalance,
        energy_balance: EnergyBalance,
        pressure_balance: PressureBalance,
    ) -> Result<(), ReactorError> {
        let previous = (
            std::mem::replace(&mut self.mass_balance, mass_balance),
            std::mem::replace(&mut self.energy_balance, energy_balance),
            std::mem::replace(&mut self.pressure_balance, pressure_balance),
        );
        if let Err(e) = self.collect_border_pairs() {
            (self.mass_balance, self.energy_balance, self.pressure_balance) = previous;
            return Err(e);
        }
        self.clear_results();
        Ok(())
    }

    /// Same geometry, balances, border conditions and profiles, same `Kinetics` instance
    fn working_copy(&self) -> Self {
        Self {
            kinetics: Rc::clone(&self.kinetics),
            reactor_length: self.reactor_length,
            transversal_area: self.transversal_area,
            grid_size: self.grid_size,
            mass_balance: self.mass_balance.clone(),
            energy_balance: self.energy_balance.clone(),
            pressure_balance: self.pressure_balance.clone(),
            z: self.z.clone(),
            mass_profile: self.mass_profile.clone(),
            mole_fraction_profile: self.mole_fraction_profile.clone(),
            temperature_profile: self.temperature_profile.clone(),
            refrigerant_temperature_profile: self.refrigerant_temperature_profile.clone(),
            pressure_profile: self.pressure_profile.clone(),
            r_rates_profile: self.r_rates_profile.clone(),
            substance_rates_profile: self.substance_rates_profile.clone(),
            initial_variables_profile: self.initial_variables_profile.clone(),
            border_conditions: self.border_conditions.clone(),
            ode_solution: None,
            simulation_df: None,
        }
    }

    ////////////////////////////////////STATE ASSEMBLY////////////////////////////////////////////

    /// Uniform grid and the stacked seed of all balances
    pub fn initial_profile_builder(&mut self) -> Result<(), ReactorError> {
        let n = self.grid_size;
        self.z = DVector::from_vec(
            InitialTemplate::Linear {
                start: 0.0,
                end: self.reactor_length,
            }
            .generate(n),
        );
        let n_substances = self.mix().len();
        let mass = self.mass_balance.initial_profile(self)?;
        let energy = self.energy_balance.initial_profile(self)?;
        let pressure = self.pressure_balance.initial_profile(self)?;
        if mass.shape() != (n_substances, n) {
            return Err(ReactorError::shape(
                "mass balance initial profile",
                n_substances * n,
                mass.nrows() * mass.ncols(),
            ));
        }
        if energy.shape() != (2, n) || pressure.len() != n {
            return Err(ReactorError::shape(
                "energy/pressure initial profile",
                3 * n,
                energy.nrows() * energy.ncols() + pressure.len(),
            ));
        }

        let mut variables = DMatrix::zeros(n_substances + 3, n);
        variables.rows_mut(0, n_substances).copy_from(&mass);
        variables.rows_mut(n_substances, 2).copy_from(&energy);
        variables.set_row(n_substances + 2, &pressure.transpose());
        self.initial_variables_profile = variables;
        debug!(
            "initial profile built: {} variables on {} nodes",
            n_substances + 3,
            n
        );
        Ok(())
    }

    fn collect_border_pairs(&self) -> Result<Vec<(Option<f64>, Option<f64>)>, ReactorError> {
        let mut pairs = self.mass_balance.border_conditions(self)?;
        pairs.extend(self.energy_balance.border_conditions(self)?);
        pairs.push(self.pressure_balance.border_conditions(self)?);
        if pairs.len() != self.n_variables() {
            return Err(ReactorError::shape(
                "border conditions",
                self.n_variables(),
                pairs.len(),
            ));
        }
        Ok(pairs)
    }

    /// Inlet and outlet vectors in row order, with the indices of the constrained rows
    pub fn border_conditions_builder(&mut self) -> Result<(), ReactorError> {
        let pairs = self.collect_border_pairs()?;
        let bc = BorderConditions::from_pairs(pairs)?;
        debug!(
            "border conditions: inlet rows {:?}, outlet rows {:?}",
            bc.in_index, bc.out_index
        );
        self.border_conditions = Some(bc);
        Ok(())
    }

    fn update_profiles(&mut self, z: &DVector<f64>, variables: &DMatrix<f64>) -> Result<(), ReactorError> {
        let n_substances = self.mix().len();
        if variables.nrows() != n_substances + 3 {
            return Err(ReactorError::shape(
                "state rows",
                n_substances + 3,
                variables.nrows(),
            ));
        }
        if variables.ncols() != z.len() {
            return Err(ReactorError::shape("state columns", z.len(), variables.ncols()));
        }
        self.z = z.clone();
        self.mass_profile = variables.rows(0, n_substances).into_owned();
        self.temperature_profile = variables.row(n_substances).transpose();
        self.refrigerant_temperature_profile = variables.row(n_substances + 1).transpose();
        self.pressure_profile = variables.row(n_substances + 2).transpose();
        self.mole_fraction_profile = self.mix().mole_fractions_profile(&self.mass_profile)?;
        let (substance_rates, r_rates) = self.kinetics.kinetic_eval_profile(
            &self.mass_profile,
            &self.temperature_profile,
            &self.pressure_profile,
        )?;
        self.substance_rates_profile = substance_rates;
        self.r_rates_profile = r_rates;
        Ok(())
    }

    /// Right-hand side of the BVP: gradients of every state row at every node of `z`
    pub fn evaluate_balances(
        &mut self,
        z: &DVector<f64>,
        variables: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, ReactorError> {
        self.update_profiles(z, variables)?;
        let n_substances = self.mix().len();
        let n = z.len();

        let mass_gradient = self.mass_balance.evaluate_balance(self)?;
        let energy_gradient = self.energy_balance.evaluate_balance(self)?;
        let pressure_gradient = self.pressure_balance.evaluate_balance(self)?;

        let mut gradients = DMatrix::zeros(n_substances + 3, n);
        gradients.rows_mut(0, n_substances).copy_from(&mass_gradient);
        gradients.rows_mut(n_substances, 2).copy_from(&energy_gradient);
        gradients.set_row(n_substances + 2, &pressure_gradient.transpose());
        Ok(gradients)
    }

    /// Boundary residuals, inlet terms first
    pub fn border_conditions(&self, ya: &DVector<f64>, yb: &DVector<f64>) -> DVector<f64> {
        match &self.border_conditions {
            Some(bc) => bc.residuals(ya, yb),
            None => DVector::zeros(0),
        }
    }

    ////////////////////////////////////SIMULATION////////////////////////////////////////////

    pub fn simulate(
        &mut self,
        tol: f64,
        max_nodes: usize,
        verbose: u8,
        bc_tol: Option<f64>,
    ) -> Result<SolverStatus, ReactorError> {
        self.simulate_with(&SimulationSettings::new(tol, max_nodes, verbose, bc_tol))
    }

    /// Solved table of the last `simulate`
    pub fn results(&self) -> Result<&PFRTable, ReactorError> {
        self.simulation_df
            .as_ref()
            .ok_or_else(|| ReactorError::MissingData("the reactor has not been simulated".to_string()))
    }

    pub fn status(&self) -> Option<SolverStatus> {
        self.simulation_df.as_ref().map(|table| table.status)
    }
}

impl ReactorBase for PFR {
    fn kinetics(&self) -> &Kinetics {
        &self.kinetics
    }

    fn simulate_with(&mut self, settings: &SimulationSettings) -> Result<SolverStatus, ReactorError> {
        settings.validate()?;
        self.clear_results();
        self.initial_profile_builder()?;
        self.border_conditions_builder()?;

        let x = self.z.clone();
        let y = self.initial_variables_profile.clone();
        let (result, failure) = {
            let working = Rc::new(RefCell::new(self.working_copy()));
            let failure: Rc<RefCell<Option<ReactorError>>> = Rc::new(RefCell::new(None));
            let fun = {
                let working = Rc::clone(&working);
                let failure = Rc::clone(&failure);
                move |z: &DVector<f64>, variables: &DMatrix<f64>, _p: &DVector<f64>| {
                    match working.borrow_mut().evaluate_balances(z, variables) {
                        Ok(gradients) => gradients,
                        Err(e) => {
                            failure.borrow_mut().get_or_insert(e);
                            DMatrix::from_element(variables.nrows(), variables.ncols(), f64::NAN)
                        }
                    }
                }
            };
            let bc = {
                let working = Rc::clone(&working);
                move |ya: &DVector<f64>, yb: &DVector<f64>, _p: &DVector<f64>| {
                    working.borrow().border_conditions(ya, yb)
                }
            };
            let result = solve_bvp(
                &fun,
                &bc,
                x,
                y,
                None,
                None,
                None,
                None,
                settings.tol,
                settings.max_nodes,
                settings.verbose,
                settings.bc_tol,
            );
            let failure = failure.borrow_mut().take();
            (result, failure)
        };
        if let Some(e) = failure {
            return Err(e);
        }
        let solution = result.map_err(ReactorError::Solver)?;
        let status = SolverStatus::from_code(solution.status)?;

        // profiles on the final mesh rather than on the last trial points of the solver
        self.evaluate_balances(&solution.x, &solution.y)?;
        let last = solution.y.ncols() - 1;
        let max_bc_residual = self
            .border_conditions(
                &solution.y.column(0).into_owned(),
                &solution.y.column(last).into_owned(),
            )
            .amax();
        let table = PFRTable::from_solution(&self.mix().names(), &solution, status, max_bc_residual);
        if status.is_success() {
            if settings.verbose >= 1 {
                info!(
                    "PFR simulation converged on {} nodes after {} iterations",
                    solution.x.len(),
                    solution.niter
                );
            }
        } else {
            warn!(
                "PFR simulation did not converge: {} (max relative residual {:.2e}, max boundary residual {:.2e})",
                solution.message, table.max_rms_residual, table.max_bc_residual
            );
        }
        self.ode_solution = Some(solution);
        self.simulation_df = Some(table);
        Ok(status)
    }
}
