//! Mass balances of the PFR. One state row per substance, in mixture order.
use crate::ReactorsBVP::PFR::{PFR, ReactorBase};
use crate::ReactorsBVP::reactor_BVP_utils::{InitialTemplate, ReactorError};
use enum_dispatch::enum_dispatch;
use nalgebra::DMatrix;
use std::collections::HashMap;

#[enum_dispatch]
pub trait MassBalanceModel {
    /// seed of the mass rows (substances × grid nodes)
    fn initial_profile(&self, reactor: &PFR) -> Result<DMatrix<f64>, ReactorError>;
    /// (inlet, outlet) pair for every substance row
    fn border_conditions(
        &self,
        reactor: &PFR,
    ) -> Result<Vec<(Option<f64>, Option<f64>)>, ReactorError>;
    /// gradient of the mass rows at the state currently held by the reactor
    fn evaluate_balance(&self, reactor: &PFR) -> Result<DMatrix<f64>, ReactorError>;
}

/// Molar flow formulation: dF_i/dz = A · Σ_j ν_ji r_j
///
/// Each substance needs exactly one of an inlet or an outlet molar flow [mol/s].
#[derive(Debug, Clone, PartialEq)]
pub struct MolarFlow {
    pub molar_flows_in: HashMap<String, f64>,
    pub molar_flows_out: HashMap<String, f64>,
}

impl MolarFlow {
    pub fn new(
        molar_flows_in: HashMap<String, f64>,
        molar_flows_out: HashMap<String, f64>,
    ) -> Result<Self, ReactorError> {
        if let Some(name) = molar_flows_in
            .keys()
            .find(|name| molar_flows_out.contains_key(*name))
        {
            return Err(ReactorError::InvalidConfiguration(format!(
                "Mass balance error: both inlet and outlet molar flow given for '{}'",
                name
            )));
        }
        if let Some((name, value)) = molar_flows_in
            .iter()
            .chain(molar_flows_out.iter())
            .find(|(_, v)| !v.is_finite())
        {
            return Err(ReactorError::InvalidConfiguration(format!(
                "Mass balance error: molar flow of '{}' is {}",
                name, value
            )));
        }
        Ok(Self {
            molar_flows_in,
            molar_flows_out,
        })
    }

    /// only inlet flows
    pub fn inlet(molar_flows_in: HashMap<String, f64>) -> Result<Self, ReactorError> {
        Self::new(molar_flows_in, HashMap::new())
    }

    fn pairs(&self, reactor: &PFR) -> Result<Vec<(Option<f64>, Option<f64>)>, ReactorError> {
        let names = reactor.mix().names();
        if let Some(unknown) = self
            .molar_flows_in
            .keys()
            .chain(self.molar_flows_out.keys())
            .find(|name| !names.contains(*name))
        {
            return Err(ReactorError::InvalidConfiguration(format!(
                "Mass balance error: '{}' is not a substance of the mixture",
                unknown
            )));
        }
        names
            .iter()
            .map(|name| {
                let pair = (
                    self.molar_flows_in.get(name).copied(),
                    self.molar_flows_out.get(name).copied(),
                );
                match pair {
                    (None, None) => Err(ReactorError::InvalidConfiguration(format!(
                        "Mass balance error: no inlet or outlet molar flow for '{}'",
                        name
                    ))),
                    _ => Ok(pair),
                }
            })
            .collect()
    }
}

impl MassBalanceModel for MolarFlow {
    fn initial_profile(&self, reactor: &PFR) -> Result<DMatrix<f64>, ReactorError> {
        let pairs = self.pairs(reactor)?;
        let n = reactor.grid_size();
        let mut profile = DMatrix::zeros(pairs.len(), n);
        for (i, (inlet, outlet)) in pairs.iter().enumerate() {
            let value = inlet.or(*outlet).unwrap_or(0.0);
            let row = InitialTemplate::Constant { value }.generate(n);
            for (j, v) in row.into_iter().enumerate() {
                profile[(i, j)] = v;
            }
        }
        Ok(profile)
    }

    fn border_conditions(
        &self,
        reactor: &PFR,
    ) -> Result<Vec<(Option<f64>, Option<f64>)>, ReactorError> {
        self.pairs(reactor)
    }

    fn evaluate_balance(&self, reactor: &PFR) -> Result<DMatrix<f64>, ReactorError> {
        Ok(&reactor.substance_rates_profile * reactor.transversal_area())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(MassBalanceModel)]
pub enum MassBalance {
    MolarFlow(MolarFlow),
}
