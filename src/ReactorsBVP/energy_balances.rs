//! Energy balances of the PFR. Two state rows: the reactor temperature and the refrigerant
//! temperature.
//!
//! | model | dT/dz | dTr/dz |
//! |-------|-------|--------|
//! | `Isothermic` | 0 | 0 |
//! | `Adiabatic` | `A Σ_j r_j (-ΔH_j) / (Σ_i F_i · cp)` | 0 |
//! | `NoIsothermic` | `[A Σ_j r_j (-ΔH_j) + U Pw (Tr - T)] / (Σ_i F_i · cp)` | `± U Pw (T - Tr) / (Fr cp_r)` |
//!
//! `Pw = 2 √(π A)` is the wall perimeter of a tube with cross section `A`. The refrigerant
//! flows along the reactor (`+`) when its temperature is fixed at the inlet and against it
//! (`-`) when fixed at the outlet.
//! For the isothermic and adiabatic models the refrigerant row is inactive: its value is
//! pinned at the inlet and its gradient is zero.
use crate::ReactorsBVP::PFR::{PFR, ReactorBase};
use crate::ReactorsBVP::reactor_BVP_utils::{BorderValue, InitialTemplate, ReactorError};
use enum_dispatch::enum_dispatch;
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

#[enum_dispatch]
pub trait EnergyBalanceModel {
    /// seed of the temperature and refrigerant temperature rows (2 × grid nodes)
    fn initial_profile(&self, reactor: &PFR) -> Result<DMatrix<f64>, ReactorError>;
    /// (inlet, outlet) pairs of the temperature and refrigerant temperature rows
    fn border_conditions(
        &self,
        reactor: &PFR,
    ) -> Result<Vec<(Option<f64>, Option<f64>)>, ReactorError>;
    /// gradients of both rows (2 × nodes)
    fn evaluate_balance(&self, reactor: &PFR) -> Result<DMatrix<f64>, ReactorError>;
}

fn constant_rows(values: [f64; 2], n: usize) -> DMatrix<f64> {
    let mut rows = DMatrix::zeros(2, n);
    for (i, value) in values.into_iter().enumerate() {
        let row = InitialTemplate::Constant { value }.generate(n);
        for (j, v) in row.into_iter().enumerate() {
            rows[(i, j)] = v;
        }
    }
    rows
}

fn check_positive(name: &str, value: f64) -> Result<(), ReactorError> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(ReactorError::InvalidConfiguration(format!(
            "Energy balance error: {} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Σ_j r_j (-ΔH_j(T, P)) [W/m³] and Σ_i F_i · cp_mix [W/K] at every node
fn reaction_heat_and_heat_flow(reactor: &PFR) -> Result<(DVector<f64>, DVector<f64>), ReactorError> {
    let kinetics = reactor.kinetics();
    let mix = reactor.mix();
    let n_nodes = reactor.mass_profile.ncols();
    let mut heat = DVector::zeros(n_nodes);
    let mut heat_flow = DVector::zeros(n_nodes);
    for j in 0..n_nodes {
        let t = reactor.temperature_profile[j];
        let p = reactor.pressure_profile[j];
        let flows: DVector<f64> = reactor.mass_profile.column(j).into_owned();
        let dh = kinetics.reaction_enthalpies(t, p)?;
        heat[j] = -reactor.r_rates_profile.column(j).dot(&dh);
        heat_flow[j] = flows.sum() * mix.mix_heat_capacity(&flows, t, p)?;
    }
    Ok((heat, heat_flow))
}

/// Temperature fixed everywhere
#[derive(Debug, Clone, PartialEq)]
pub struct Isothermic {
    pub temperature: f64,
}

impl Isothermic {
    pub fn new(temperature: f64) -> Result<Self, ReactorError> {
        check_positive("temperature", temperature)?;
        Ok(Self { temperature })
    }
}

impl EnergyBalanceModel for Isothermic {
    fn initial_profile(&self, reactor: &PFR) -> Result<DMatrix<f64>, ReactorError> {
        Ok(constant_rows(
            [self.temperature, self.temperature],
            reactor.grid_size(),
        ))
    }

    fn border_conditions(
        &self,
        _reactor: &PFR,
    ) -> Result<Vec<(Option<f64>, Option<f64>)>, ReactorError> {
        Ok(vec![
            (Some(self.temperature), None),
            (Some(self.temperature), None),
        ])
    }

    fn evaluate_balance(&self, reactor: &PFR) -> Result<DMatrix<f64>, ReactorError> {
        Ok(DMatrix::zeros(2, reactor.mass_profile.ncols()))
    }
}

/// No heat exchange with the surroundings
#[derive(Debug, Clone, PartialEq)]
pub struct Adiabatic {
    pub temperature: BorderValue,
}

impl Adiabatic {
    pub fn new(temperature: BorderValue) -> Result<Self, ReactorError> {
        check_positive("temperature", temperature.value())?;
        Ok(Self { temperature })
    }
}

impl EnergyBalanceModel for Adiabatic {
    fn initial_profile(&self, reactor: &PFR) -> Result<DMatrix<f64>, ReactorError> {
        let t = self.temperature.value();
        Ok(constant_rows([t, t], reactor.grid_size()))
    }

    fn border_conditions(
        &self,
        _reactor: &PFR,
    ) -> Result<Vec<(Option<f64>, Option<f64>)>, ReactorError> {
        Ok(vec![
            self.temperature.pair(),
            (Some(self.temperature.value()), None),
        ])
    }

    fn evaluate_balance(&self, reactor: &PFR) -> Result<DMatrix<f64>, ReactorError> {
        let (heat, heat_flow) = reaction_heat_and_heat_flow(reactor)?;
        let area = reactor.transversal_area();
        let mut gradient = DMatrix::zeros(2, heat.len());
        for j in 0..heat.len() {
            gradient[(0, j)] = area * heat[j] / heat_flow[j];
        }
        Ok(gradient)
    }
}

/// Heat exchange with a refrigerant stream of constant flow and heat capacity
#[derive(Debug, Clone, PartialEq)]
pub struct NoIsothermic {
    pub temperature: BorderValue,
    pub refrigerant_temperature: BorderValue,
    /// W/(m²·K)
    pub heat_exchange_coefficient: f64,
    /// mol/s
    pub refrigerant_molar_flow: f64,
    /// J/(mol·K)
    pub refrigerant_heat_capacity: f64,
}

impl NoIsothermic {
    pub fn new(
        temperature: BorderValue,
        refrigerant_temperature: BorderValue,
        heat_exchange_coefficient: f64,
        refrigerant_molar_flow: f64,
        refrigerant_heat_capacity: f64,
    ) -> Result<Self, ReactorError> {
        check_positive("temperature", temperature.value())?;
        check_positive("refrigerant temperature", refrigerant_temperature.value())?;
        if !(heat_exchange_coefficient >= 0.0) || !heat_exchange_coefficient.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "Energy balance error: heat exchange coefficient must be non negative, got {}",
                heat_exchange_coefficient
            )));
        }
        check_positive("refrigerant molar flow", refrigerant_molar_flow)?;
        check_positive("refrigerant heat capacity", refrigerant_heat_capacity)?;
        Ok(Self {
            temperature,
            refrigerant_temperature,
            heat_exchange_coefficient,
            refrigerant_molar_flow,
            refrigerant_heat_capacity,
        })
    }

    pub fn is_co_current(&self) -> bool {
        self.refrigerant_temperature.is_inlet()
    }
}

impl EnergyBalanceModel for NoIsothermic {
    fn initial_profile(&self, reactor: &PFR) -> Result<DMatrix<f64>, ReactorError> {
        Ok(constant_rows(
            [
                self.temperature.value(),
                self.refrigerant_temperature.value(),
            ],
            reactor.grid_size(),
        ))
    }

    fn border_conditions(
        &self,
        _reactor: &PFR,
    ) -> Result<Vec<(Option<f64>, Option<f64>)>, ReactorError> {
        Ok(vec![
            self.temperature.pair(),
            self.refrigerant_temperature.pair(),
        ])
    }

    fn evaluate_balance(&self, reactor: &PFR) -> Result<DMatrix<f64>, ReactorError> {
        let (heat, heat_flow) = reaction_heat_and_heat_flow(reactor)?;
        let area = reactor.transversal_area();
        let u_pw = self.heat_exchange_coefficient * 2.0 * (PI * area).sqrt();
        let direction = if self.is_co_current() { 1.0 } else { -1.0 };
        let refrigerant_heat_flow = self.refrigerant_molar_flow * self.refrigerant_heat_capacity;

        let mut gradient = DMatrix::zeros(2, heat.len());
        for j in 0..heat.len() {
            let t = reactor.temperature_profile[j];
            let tr = reactor.refrigerant_temperature_profile[j];
            gradient[(0, j)] = (area * heat[j] + u_pw * (tr - t)) / heat_flow[j];
            gradient[(1, j)] = direction * u_pw * (t - tr) / refrigerant_heat_flow;
        }
        Ok(gradient)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(EnergyBalanceModel)]
pub enum EnergyBalance {
    Isothermic(Isothermic),
    Adiabatic(Adiabatic),
    NoIsothermic(NoIsothermic),
}
