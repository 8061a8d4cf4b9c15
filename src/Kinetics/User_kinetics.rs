//! # Kinetics evaluator
//!
//! Couples user supplied rate functions to the local composition of a `Mixture`.
//!
//! - the stoichiometry matrix has one row per reaction and one column per substance (columns
//!   in mixture order)
//! - each rate function maps (composition, temperature) to the rate of one reaction
//! - the composition handed to rate functions is either the concentrations [mol/m³] or the
//!   partial pressures [Pa] of the mixture, chosen once at construction
//! - net production rate of each substance: `Sᵀ · r`
//!
//! The kinetics owns its mixture. Replacing the mixture goes through `with_mix`, which
//! rebuilds the object and recomputes the standard reaction enthalpies.
use crate::ReactorsBVP::reactor_BVP_utils::ReactorError;
use crate::Thermodynamics::Mixture::{Mixture, MixtureModel};
use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// rate of one reaction as a function of (composition, temperature)
pub type RateFunction = Box<dyn Fn(&DVector<f64>, f64) -> f64 + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KineticArgument {
    Concentration,
    PartialPressure,
}

impl FromStr for KineticArgument {
    type Err = ReactorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "concentration" => Ok(KineticArgument::Concentration),
            "partial_pressure" => Ok(KineticArgument::PartialPressure),
            other => Err(ReactorError::InvalidConfiguration(format!(
                "kinetic_argument must be 'concentration' or 'partial_pressure', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for KineticArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KineticArgument::Concentration => write!(f, "concentration"),
            KineticArgument::PartialPressure => write!(f, "partial_pressure"),
        }
    }
}

/// Stoichiometry as given by the user: one flat row for a single reaction, nested rows, or
/// a ready matrix
#[derive(Debug, Clone, PartialEq)]
pub enum Stoichiometry {
    Flat(Vec<f64>),
    Nested(Vec<Vec<f64>>),
    Matrix(DMatrix<f64>),
}

impl From<Vec<f64>> for Stoichiometry {
    fn from(v: Vec<f64>) -> Self {
        Stoichiometry::Flat(v)
    }
}

impl From<Vec<Vec<f64>>> for Stoichiometry {
    fn from(v: Vec<Vec<f64>>) -> Self {
        Stoichiometry::Nested(v)
    }
}

impl From<DMatrix<f64>> for Stoichiometry {
    fn from(m: DMatrix<f64>) -> Self {
        Stoichiometry::Matrix(m)
    }
}

impl Stoichiometry {
    /// (reactions × substances) matrix
    pub fn into_matrix(self) -> Result<DMatrix<f64>, ReactorError> {
        match self {
            Stoichiometry::Flat(row) => Ok(DMatrix::from_row_slice(1, row.len(), &row)),
            Stoichiometry::Nested(rows) => {
                let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
                if let Some(bad) = rows.iter().find(|r| r.len() != n_cols) {
                    return Err(ReactorError::InvalidConfiguration(format!(
                        "ragged stoichiometry: rows of length {} and {}",
                        n_cols,
                        bad.len()
                    )));
                }
                let flat: Vec<f64> = rows.into_iter().flatten().collect();
                let n_rows = if n_cols == 0 { 0 } else { flat.len() / n_cols };
                Ok(DMatrix::from_row_slice(n_rows, n_cols, &flat))
            }
            Stoichiometry::Matrix(m) => Ok(m),
        }
    }
}

pub struct Kinetics {
    list_of_reactions: Vec<RateFunction>,
    mix: Mixture,
    stoichiometry: DMatrix<f64>,
    kinetic_argument: KineticArgument,
    /// S · H_f at 298.15 K, absent when the mixture lacks formation enthalpies
    std_reaction_enthalpies: Option<DVector<f64>>,
}

impl fmt::Debug for Kinetics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kinetics")
            .field("n_reactions", &self.list_of_reactions.len())
            .field("mix", &self.mix)
            .field("stoichiometry", &self.stoichiometry)
            .field("kinetic_argument", &self.kinetic_argument)
            .field("std_reaction_enthalpies", &self.std_reaction_enthalpies)
            .finish()
    }
}

impl Kinetics {
    pub fn new(
        list_of_reactions: Vec<RateFunction>,
        mix: Mixture,
        stoichiometry: impl Into<Stoichiometry>,
        kinetic_argument: &str,
    ) -> Result<Self, ReactorError> {
        let kinetic_argument = KineticArgument::from_str(kinetic_argument)?;
        let stoichiometry = stoichiometry.into().into_matrix()?;
        Self::from_parts(list_of_reactions, mix, stoichiometry, kinetic_argument)
    }

    fn from_parts(
        list_of_reactions: Vec<RateFunction>,
        mix: Mixture,
        stoichiometry: DMatrix<f64>,
        kinetic_argument: KineticArgument,
    ) -> Result<Self, ReactorError> {
        if stoichiometry.ncols() != mix.len() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "stoichiometry has {} columns but the mixture has {} substances",
                stoichiometry.ncols(),
                mix.len()
            )));
        }
        if stoichiometry.nrows() != list_of_reactions.len() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "stoichiometry has {} reactions but {} rate functions were given",
                stoichiometry.nrows(),
                list_of_reactions.len()
            )));
        }
        let std_reaction_enthalpies = match mix.formation_enthalpies() {
            Ok(h) => Some(&stoichiometry * h),
            Err(e) => {
                debug!("standard reaction enthalpies unavailable: {}", e);
                None
            }
        };
        Ok(Self {
            list_of_reactions,
            mix,
            stoichiometry,
            kinetic_argument,
            std_reaction_enthalpies,
        })
    }

    /// Rebuild around another mixture; the derived enthalpies are recomputed
    pub fn with_mix(self, mix: Mixture) -> Result<Self, ReactorError> {
        Self::from_parts(
            self.list_of_reactions,
            mix,
            self.stoichiometry,
            self.kinetic_argument,
        )
    }

    pub fn mix(&self) -> &Mixture {
        &self.mix
    }

    pub fn stoichiometry(&self) -> &DMatrix<f64> {
        &self.stoichiometry
    }

    pub fn kinetic_argument(&self) -> KineticArgument {
        self.kinetic_argument
    }

    pub fn list_of_reactions(&self) -> &[RateFunction] {
        &self.list_of_reactions
    }

    pub fn n_reactions(&self) -> usize {
        self.list_of_reactions.len()
    }

    pub fn std_reaction_enthalpies(&self) -> Option<&DVector<f64>> {
        self.std_reaction_enthalpies.as_ref()
    }

    fn composition(
        &self,
        moles: &DVector<f64>,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        match self.kinetic_argument {
            KineticArgument::Concentration => self.mix.concentrations(moles, temperature, pressure),
            KineticArgument::PartialPressure => {
                self.mix.partial_pressures(moles, temperature, pressure)
            }
        }
    }

    /// (net rate per substance, rate per reaction) at one node
    pub fn kinetic_eval(
        &self,
        moles: &DVector<f64>,
        temperature: f64,
        pressure: f64,
    ) -> Result<(DVector<f64>, DVector<f64>), ReactorError> {
        let composition = self.composition(moles, temperature, pressure)?;
        let reaction_rates = DVector::from_iterator(
            self.list_of_reactions.len(),
            self.list_of_reactions
                .iter()
                .map(|rate| rate(&composition, temperature)),
        );
        let substance_rates = self.stoichiometry.tr_mul(&reaction_rates);
        Ok((substance_rates, reaction_rates))
    }

    /// Batch version of `kinetic_eval`: `moles` is (substances × nodes) with one temperature and
    /// one pressure per node. Returns (substances × nodes, reactions × nodes) in node order.
    pub fn kinetic_eval_profile(
        &self,
        moles: &DMatrix<f64>,
        temperature: &DVector<f64>,
        pressure: &DVector<f64>,
    ) -> Result<(DMatrix<f64>, DMatrix<f64>), ReactorError> {
        let n_nodes = moles.ncols();
        if moles.nrows() != self.mix.len() {
            return Err(ReactorError::shape(
                "kinetic_eval_profile",
                self.mix.len(),
                moles.nrows(),
            ));
        }
        if temperature.len() != n_nodes {
            return Err(ReactorError::shape(
                "kinetic_eval_profile (temperature)",
                n_nodes,
                temperature.len(),
            ));
        }
        if pressure.len() != n_nodes {
            return Err(ReactorError::shape(
                "kinetic_eval_profile (pressure)",
                n_nodes,
                pressure.len(),
            ));
        }
        let mut substance_rates = DMatrix::zeros(self.mix.len(), n_nodes);
        let mut reaction_rates = DMatrix::zeros(self.n_reactions(), n_nodes);
        for j in 0..n_nodes {
            let column: DVector<f64> = moles.column(j).into_owned();
            let (net, rates) = self.kinetic_eval(&column, temperature[j], pressure[j])?;
            substance_rates.set_column(j, &net);
            reaction_rates.set_column(j, &rates);
        }
        Ok((substance_rates, reaction_rates))
    }

    /// ΔH_j(T) = ΔH_j(298.15) + Σ_i ν_ji ∫ cp_i dT [J/mol], heat capacities of the mixture phase
    pub fn reaction_enthalpies(
        &self,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        let standard = match &self.std_reaction_enthalpies {
            Some(h) => h.clone(),
            None => &self.stoichiometry * self.mix.formation_enthalpies()?,
        };
        let correction = self.mix.formation_enthalpies_correction(temperature, pressure)?;
        Ok(standard + &self.stoichiometry * correction)
    }
}
