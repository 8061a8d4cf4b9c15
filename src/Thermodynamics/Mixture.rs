//! # Mixture models
//!
//! An ordered list of `Substance`s plus a phase model. The substance order defines the row
//! order of every composition-indexed array in the crate: composition vectors, stoichiometry
//! columns and the mass rows of the reactor state.
//!
//! Two models are provided behind the `MixtureModel` trait and dispatched statically through
//! the `Mixture` enum:
//!
//! | Model | molar volume | concentration | heat capacity |
//! |-------|--------------|---------------|---------------|
//! | `IdealGas` | `R·T/P` | `x_i·P/(R·T)` | `Σ x_i cp_gas,i` |
//! | `IdealSolution` | `Σ x_i v_liq,i` | `x_i / Σ x_j v_liq,j` | `Σ x_i cp_liq,i` |
//!
//! Single-node methods take a composition vector (moles or mole fractions, they are
//! normalized internally) and scalar temperature and pressure. The `*_profile` methods take a
//! composition matrix with one row per substance and one column per grid node together with
//! one temperature and one pressure per node, and return one output per node in node order.

use crate::ReactorsBVP::reactor_BVP_utils::ReactorError;
use crate::Thermodynamics::Substance::Substance;
use enum_dispatch::enum_dispatch;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// ideal gas constant J/(mol·K)
pub const R: f64 = 8.31446261815324;
/// reference temperature of formation enthalpies [K]
pub const T_REF: f64 = 298.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Gas,
    Liquid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViscosityMixingRule {
    /// μ = Σ x_i μ_i
    Linear,
    /// ln μ = Σ x_i ln μ_i
    GrunbergNissan,
    /// μ = Σ x_i μ_i √M_i / Σ x_i √M_i
    HerningZipperer,
}

impl FromStr for ViscosityMixingRule {
    type Err = ReactorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(ViscosityMixingRule::Linear),
            "grunberg_nissan" => Ok(ViscosityMixingRule::GrunbergNissan),
            "herning_zipperer" => Ok(ViscosityMixingRule::HerningZipperer),
            other => Err(ReactorError::InvalidConfiguration(format!(
                "unknown viscosity mixing rule '{}', options: linear, grunberg_nissan, herning_zipperer",
                other
            ))),
        }
    }
}

/// Per-phase behaviour of a mixture
#[enum_dispatch]
pub trait MixtureModel {
    fn substances(&self) -> &[Substance];
    fn phase(&self) -> Phase;
    fn viscosity_mixing_rule(&self) -> ViscosityMixingRule;
    /// molar volume of the mixture [m³/mol]
    fn volume(&self, moles: &DVector<f64>, temperature: f64, pressure: f64)
    -> Result<f64, ReactorError>;
    /// mol/m³
    fn concentrations(
        &self,
        moles: &DVector<f64>,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError>;
    /// pure component heat capacities of the phase [J/mol/K]
    fn pure_heat_capacities(&self, temperature: f64, pressure: f64)
    -> Result<DVector<f64>, ReactorError>;
    /// pure component viscosities of the phase [Pa·s]
    fn pure_viscosities(&self, temperature: f64, pressure: f64) -> Result<DVector<f64>, ReactorError>;
    /// formation enthalpies at 298.15 K in the reference state of the phase [J/mol]
    fn formation_enthalpies(&self) -> Result<DVector<f64>, ReactorError>;
    /// ∫ cp dT from 298.15 K to `temperature` for each substance [J/mol]
    fn formation_enthalpies_correction(
        &self,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError>;
}

fn validate_substances(substances: &[Substance]) -> Result<(), ReactorError> {
    if substances.is_empty() {
        return Err(ReactorError::InvalidConfiguration(
            "a mixture needs at least one substance".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for substance in substances {
        if !seen.insert(substance.name.as_str()) {
            return Err(ReactorError::InvalidConfiguration(format!(
                "substance '{}' appears twice in the mixture",
                substance.name
            )));
        }
    }
    Ok(())
}

fn check_len(context: &str, expected: usize, v: &DVector<f64>) -> Result<(), ReactorError> {
    if v.len() != expected {
        return Err(ReactorError::shape(context, expected, v.len()));
    }
    Ok(())
}

/// Normalize a composition to mole fractions
pub fn normalize(moles: &DVector<f64>) -> DVector<f64> {
    let total = moles.sum();
    moles / total
}

#[derive(Debug)]
pub struct IdealGas {
    substances: Vec<Substance>,
    viscosity_mixing_rule: ViscosityMixingRule,
}

impl IdealGas {
    pub fn new(substances: Vec<Substance>) -> Result<Self, ReactorError> {
        validate_substances(&substances)?;
        Ok(Self {
            substances,
            viscosity_mixing_rule: ViscosityMixingRule::HerningZipperer,
        })
    }

    pub fn with_viscosity_mixing_rule(mut self, rule: ViscosityMixingRule) -> Self {
        self.viscosity_mixing_rule = rule;
        self
    }
}

impl MixtureModel for IdealGas {
    fn substances(&self) -> &[Substance] {
        &self.substances
    }

    fn phase(&self) -> Phase {
        Phase::Gas
    }

    fn viscosity_mixing_rule(&self) -> ViscosityMixingRule {
        self.viscosity_mixing_rule
    }

    fn volume(
        &self,
        moles: &DVector<f64>,
        temperature: f64,
        pressure: f64,
    ) -> Result<f64, ReactorError> {
        check_len("IdealGas::volume", self.substances.len(), moles)?;
        Ok(R * temperature / pressure)
    }

    fn concentrations(
        &self,
        moles: &DVector<f64>,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        check_len("IdealGas::concentrations", self.substances.len(), moles)?;
        Ok(normalize(moles) * (pressure / (R * temperature)))
    }

    fn pure_heat_capacities(
        &self,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        let cps = self
            .substances
            .iter()
            .map(|s| s.heat_capacity_gas(temperature, pressure))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(cps))
    }

    fn pure_viscosities(
        &self,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        let mus = self
            .substances
            .iter()
            .map(|s| s.viscosity_gas(temperature, pressure))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(mus))
    }

    fn formation_enthalpies(&self) -> Result<DVector<f64>, ReactorError> {
        let h = self
            .substances
            .iter()
            .map(|s| s.formation_enthalpy_ig())
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(h))
    }

    fn formation_enthalpies_correction(
        &self,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        let corrections = self
            .substances
            .iter()
            .map(|s| s.heat_capacity_gas_dt_integral(T_REF, temperature, pressure))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(corrections))
    }
}

#[derive(Debug)]
pub struct IdealSolution {
    substances: Vec<Substance>,
    viscosity_mixing_rule: ViscosityMixingRule,
}

impl IdealSolution {
    pub fn new(substances: Vec<Substance>) -> Result<Self, ReactorError> {
        validate_substances(&substances)?;
        Ok(Self {
            substances,
            viscosity_mixing_rule: ViscosityMixingRule::GrunbergNissan,
        })
    }

    pub fn with_viscosity_mixing_rule(mut self, rule: ViscosityMixingRule) -> Self {
        self.viscosity_mixing_rule = rule;
        self
    }

    fn pure_volumes(&self, temperature: f64, pressure: f64) -> Result<DVector<f64>, ReactorError> {
        let volumes = self
            .substances
            .iter()
            .map(|s| s.volume_liquid(temperature, pressure))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(volumes))
    }
}

impl MixtureModel for IdealSolution {
    fn substances(&self) -> &[Substance] {
        &self.substances
    }

    fn phase(&self) -> Phase {
        Phase::Liquid
    }

    fn viscosity_mixing_rule(&self) -> ViscosityMixingRule {
        self.viscosity_mixing_rule
    }

    fn volume(
        &self,
        moles: &DVector<f64>,
        temperature: f64,
        pressure: f64,
    ) -> Result<f64, ReactorError> {
        check_len("IdealSolution::volume", self.substances.len(), moles)?;
        let x = normalize(moles);
        Ok(x.dot(&self.pure_volumes(temperature, pressure)?))
    }

    fn concentrations(
        &self,
        moles: &DVector<f64>,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        check_len("IdealSolution::concentrations", self.substances.len(), moles)?;
        let x = normalize(moles);
        let total_molar_volume = x.dot(&self.pure_volumes(temperature, pressure)?);
        Ok(x / total_molar_volume)
    }

    fn pure_heat_capacities(
        &self,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        let cps = self
            .substances
            .iter()
            .map(|s| s.heat_capacity_liquid(temperature, pressure))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(cps))
    }

    fn pure_viscosities(
        &self,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        let mus = self
            .substances
            .iter()
            .map(|s| s.viscosity_liquid(temperature, pressure))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(mus))
    }

    fn formation_enthalpies(&self) -> Result<DVector<f64>, ReactorError> {
        let h = self
            .substances
            .iter()
            .map(|s| s.formation_enthalpy())
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(h))
    }

    fn formation_enthalpies_correction(
        &self,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        let corrections = self
            .substances
            .iter()
            .map(|s| s.heat_capacity_liquid_dt_integral(T_REF, temperature, pressure))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(corrections))
    }
}

#[derive(Debug)]
#[enum_dispatch(MixtureModel)]
pub enum Mixture {
    IdealGas(IdealGas),
    IdealSolution(IdealSolution),
}

impl Mixture {
    pub fn ideal_gas(substances: Vec<Substance>) -> Result<Self, ReactorError> {
        Ok(Mixture::IdealGas(IdealGas::new(substances)?))
    }

    pub fn ideal_solution(substances: Vec<Substance>) -> Result<Self, ReactorError> {
        Ok(Mixture::IdealSolution(IdealSolution::new(substances)?))
    }

    pub fn len(&self) -> usize {
        self.substances().len()
    }

    pub fn is_empty(&self) -> bool {
        self.substances().is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.substances().iter().map(|s| s.name.clone()).collect()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.substances().iter().position(|s| s.name == name)
    }

    fn check(&self, context: &str, v: &DVector<f64>) -> Result<(), ReactorError> {
        check_len(context, self.len(), v)
    }

    pub fn mole_fractions(&self, moles: &DVector<f64>) -> Result<DVector<f64>, ReactorError> {
        self.check("mole_fractions", moles)?;
        Ok(normalize(moles))
    }

    /// Pa
    pub fn partial_pressures(
        &self,
        moles: &DVector<f64>,
        _temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        Ok(self.mole_fractions(moles)? * pressure)
    }

    /// ideal gas law p_i / (R·T)
    pub fn partial_pressures_to_concentrations(
        &self,
        partial_pressures: &DVector<f64>,
        temperature: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        self.check("partial_pressures_to_concentrations", partial_pressures)?;
        Ok(partial_pressures / (R * temperature))
    }

    /// J/mol/K
    pub fn mix_heat_capacity(
        &self,
        moles: &DVector<f64>,
        temperature: f64,
        pressure: f64,
    ) -> Result<f64, ReactorError> {
        let x = self.mole_fractions(moles)?;
        Ok(x.dot(&self.pure_heat_capacities(temperature, pressure)?))
    }

    pub fn molecular_weights(&self) -> Result<DVector<f64>, ReactorError> {
        let mw = self
            .substances()
            .iter()
            .map(|s| s.molecular_weight())
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(mw))
    }

    /// g/mol
    pub fn mix_molecular_weight(&self, moles: &DVector<f64>) -> Result<f64, ReactorError> {
        let x = self.mole_fractions(moles)?;
        Ok(x.dot(&self.molecular_weights()?))
    }

    /// kg/m³
    pub fn mass_density(
        &self,
        moles: &DVector<f64>,
        temperature: f64,
        pressure: f64,
    ) -> Result<f64, ReactorError> {
        let mw = self.mix_molecular_weight(moles)?;
        let v = self.volume(moles, temperature, pressure)?;
        Ok(mw / 1000.0 / v)
    }

    /// Pa·s, combined with the mixture's viscosity mixing rule
    pub fn mix_viscosity(
        &self,
        moles: &DVector<f64>,
        temperature: f64,
        pressure: f64,
    ) -> Result<f64, ReactorError> {
        let x = self.mole_fractions(moles)?;
        let mu = self.pure_viscosities(temperature, pressure)?;
        let mix_mu = match self.viscosity_mixing_rule() {
            ViscosityMixingRule::Linear => x.dot(&mu),
            ViscosityMixingRule::GrunbergNissan => x.dot(&mu.map(f64::ln)).exp(),
            ViscosityMixingRule::HerningZipperer => {
                let sqrt_mw = self.molecular_weights()?.map(f64::sqrt);
                let weights = x.component_mul(&sqrt_mw);
                weights.dot(&mu) / weights.sum()
            }
        };
        Ok(mix_mu)
    }

    /// formation enthalpy of each substance corrected to `temperature` [J/mol]
    pub fn pure_heat_capacities_integral(
        &self,
        temperature: f64,
        pressure: f64,
    ) -> Result<DVector<f64>, ReactorError> {
        Ok(self.formation_enthalpies()? + self.formation_enthalpies_correction(temperature, pressure)?)
    }

    ////////////////////////////////////BATCH////////////////////////////////////////////

    fn check_profile(
        &self,
        context: &str,
        moles: &DMatrix<f64>,
        temperature: &DVector<f64>,
        pressure: &DVector<f64>,
    ) -> Result<(), ReactorError> {
        if moles.nrows() != self.len() {
            return Err(ReactorError::shape(context, self.len(), moles.nrows()));
        }
        let n_nodes = moles.ncols();
        if temperature.len() != n_nodes {
            return Err(ReactorError::shape(
                &format!("{} (temperature)", context),
                n_nodes,
                temperature.len(),
            ));
        }
        if pressure.len() != n_nodes {
            return Err(ReactorError::shape(
                &format!("{} (pressure)", context),
                n_nodes,
                pressure.len(),
            ));
        }
        Ok(())
    }

    fn map_nodes_vec<F>(
        &self,
        context: &str,
        moles: &DMatrix<f64>,
        temperature: &DVector<f64>,
        pressure: &DVector<f64>,
        f: F,
    ) -> Result<DMatrix<f64>, ReactorError>
    where
        F: Fn(&DVector<f64>, f64, f64) -> Result<DVector<f64>, ReactorError>,
    {
        self.check_profile(context, moles, temperature, pressure)?;
        let mut out = DMatrix::zeros(moles.nrows(), moles.ncols());
        for j in 0..moles.ncols() {
            let column: DVector<f64> = moles.column(j).into_owned();
            out.set_column(j, &f(&column, temperature[j], pressure[j])?);
        }
        Ok(out)
    }

    fn map_nodes_scalar<F>(
        &self,
        context: &str,
        moles: &DMatrix<f64>,
        temperature: &DVector<f64>,
        pressure: &DVector<f64>,
        f: F,
    ) -> Result<DVector<f64>, ReactorError>
    where
        F: Fn(&DVector<f64>, f64, f64) -> Result<f64, ReactorError>,
    {
        self.check_profile(context, moles, temperature, pressure)?;
        let mut out = DVector::zeros(moles.ncols());
        for j in 0..moles.ncols() {
            let column: DVector<f64> = moles.column(j).into_owned();
            out[j] = f(&column, temperature[j], pressure[j])?;
        }
        Ok(out)
    }

    /// mole fractions of every column of a (substances × nodes) matrix
    pub fn mole_fractions_profile(&self, moles: &DMatrix<f64>) -> Result<DMatrix<f64>, ReactorError> {
        if moles.nrows() != self.len() {
            return Err(ReactorError::shape(
                "mole_fractions_profile",
                self.len(),
                moles.nrows(),
            ));
        }
        let mut out = moles.clone();
        for mut column in out.column_iter_mut() {
            let total = column.sum();
            column /= total;
        }
        Ok(out)
    }

    pub fn concentrations_profile(
        &self,
        moles: &DMatrix<f64>,
        temperature: &DVector<f64>,
        pressure: &DVector<f64>,
    ) -> Result<DMatrix<f64>, ReactorError> {
        self.map_nodes_vec("concentrations_profile", moles, temperature, pressure, |m, t, p| {
            self.concentrations(m, t, p)
        })
    }

    pub fn partial_pressures_profile(
        &self,
        moles: &DMatrix<f64>,
        temperature: &DVector<f64>,
        pressure: &DVector<f64>,
    ) -> Result<DMatrix<f64>, ReactorError> {
        self.map_nodes_vec(
            "partial_pressures_profile",
            moles,
            temperature,
            pressure,
            |m, t, p| self.partial_pressures(m, t, p),
        )
    }

    pub fn volume_profile(
        &self,
        moles: &DMatrix<f64>,
        temperature: &DVector<f64>,
        pressure: &DVector<f64>,
    ) -> Result<DVector<f64>, ReactorError> {
        self.map_nodes_scalar("volume_profile", moles, temperature, pressure, |m, t, p| {
            self.volume(m, t, p)
        })
    }

    pub fn mix_heat_capacity_profile(
        &self,
        moles: &DMatrix<f64>,
        temperature: &DVector<f64>,
        pressure: &DVector<f64>,
    ) -> Result<DVector<f64>, ReactorError> {
        self.map_nodes_scalar(
            "mix_heat_capacity_profile",
            moles,
            temperature,
            pressure,
            |m, t, p| self.mix_heat_capacity(m, t, p),
        )
    }

    pub fn mass_density_profile(
        &self,
        moles: &DMatrix<f64>,
        temperature: &DVector<f64>,
        pressure: &DVector<f64>,
    ) -> Result<DVector<f64>, ReactorError> {
        self.map_nodes_scalar("mass_density_profile", moles, temperature, pressure, |m, t, p| {
            self.mass_density(m, t, p)
        })
    }

    pub fn mix_viscosity_profile(
        &self,
        moles: &DMatrix<f64>,
        temperature: &DVector<f64>,
        pressure: &DVector<f64>,
    ) -> Result<DVector<f64>, ReactorError> {
        self.map_nodes_scalar(
            "mix_viscosity_profile",
            moles,
            temperature,
            pressure,
            |m, t, p| self.mix_viscosity(m, t, p),
        )
    }
}

impl fmt::Display for Mixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "The {:?} mixture contains the following {} components:",
            self.phase(),
            self.len()
        )?;
        for substance in self.substances() {
            writeln!(f, "{}", substance.name)?;
        }
        Ok(())
    }
}
