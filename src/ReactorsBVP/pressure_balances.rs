//! Pressure balances of the PFR. One state row: the pressure [Pa].
use crate::ReactorsBVP::PFR::{PFR, ReactorBase};
use crate::ReactorsBVP::reactor_BVP_utils::{BorderValue, InitialTemplate, ReactorError};
use enum_dispatch::enum_dispatch;
use nalgebra::DVector;
use std::collections::HashMap;

#[enum_dispatch]
pub trait PressureBalanceModel {
    /// seed of the pressure row
    fn initial_profile(&self, reactor: &PFR) -> Result<DVector<f64>, ReactorError>;
    fn border_conditions(&self, reactor: &PFR) -> Result<(Option<f64>, Option<f64>), ReactorError>;
    /// dP/dz at every node
    fn evaluate_balance(&self, reactor: &PFR) -> Result<DVector<f64>, ReactorError>;
}

/// Constant pressure along the reactor
#[derive(Debug, Clone, PartialEq)]
pub struct Isobaric {
    pub pressure: f64,
}

impl Isobaric {
    pub fn new(pressure: f64) -> Result<Self, ReactorError> {
        if !(pressure > 0.0) || !pressure.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "Pressure balance error: pressure must be positive, got {}",
                pressure
            )));
        }
        Ok(Self { pressure })
    }
}

impl PressureBalanceModel for Isobaric {
    fn initial_profile(&self, reactor: &PFR) -> Result<DVector<f64>, ReactorError> {
        Ok(DVector::from_vec(
            InitialTemplate::Constant {
                value: self.pressure,
            }
            .generate(reactor.grid_size()),
        ))
    }

    fn border_conditions(&self, _reactor: &PFR) -> Result<(Option<f64>, Option<f64>), ReactorError> {
        Ok((Some(self.pressure), None))
    }

    fn evaluate_balance(&self, reactor: &PFR) -> Result<DVector<f64>, ReactorError> {
        Ok(DVector::zeros(reactor.mass_profile.ncols()))
    }
}

/// Packed bed pressure drop
///
/// `dP/dz = -(u/dp)·((1-φ)/φ³)·(150(1-φ)μ/dp + 1.75·u·ρ)` with the superficial velocity
/// `u = Σ F_i · M / 1000 / A / ρ` evaluated at every node.
#[derive(Debug, Clone, PartialEq)]
pub struct Ergun {
    pub pressure: BorderValue,
    /// void fraction of the bed
    pub porosity: f64,
    /// m
    pub particle_diameter: f64,
}

impl Ergun {
    /// `pressure` is `{"in": value}` or `{"out": value}`; giving both is an error
    pub fn new(
        pressure: &HashMap<String, f64>,
        porosity: f64,
        particle_diameter: f64,
    ) -> Result<Self, ReactorError> {
        let pressure = BorderValue::from_map(pressure, "Pressure")?;
        Self::from_border(pressure, porosity, particle_diameter)
    }

    pub fn from_border(
        pressure: BorderValue,
        porosity: f64,
        particle_diameter: f64,
    ) -> Result<Self, ReactorError> {
        if !(pressure.value() > 0.0) {
            return Err(ReactorError::InvalidConfiguration(format!(
                "Pressure balance error: pressure must be positive, got {}",
                pressure.value()
            )));
        }
        if !(porosity > 0.0 && porosity < 1.0) {
            return Err(ReactorError::InvalidConfiguration(format!(
                "Pressure balance error: porosity must lie in (0, 1), got {}",
                porosity
            )));
        }
        if !(particle_diameter > 0.0) || !particle_diameter.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "Pressure balance error: particle diameter must be positive, got {}",
                particle_diameter
            )));
        }
        Ok(Self {
            pressure,
            porosity,
            particle_diameter,
        })
    }
}

impl PressureBalanceModel for Ergun {
    fn initial_profile(&self, reactor: &PFR) -> Result<DVector<f64>, ReactorError> {
        Ok(DVector::from_vec(
            InitialTemplate::Constant {
                value: self.pressure.value(),
            }
            .generate(reactor.grid_size()),
        ))
    }

    fn border_conditions(&self, _reactor: &PFR) -> Result<(Option<f64>, Option<f64>), ReactorError> {
        Ok(self.pressure.pair())
    }

    fn evaluate_balance(&self, reactor: &PFR) -> Result<DVector<f64>, ReactorError> {
        let mix = reactor.mix();
        let phi = self.porosity;
        let dp = self.particle_diameter;
        let area = reactor.transversal_area();
        let n_nodes = reactor.mass_profile.ncols();
        let mut gradient = DVector::zeros(n_nodes);
        for j in 0..n_nodes {
            let t = reactor.temperature_profile[j];
            let p = reactor.pressure_profile[j];
            let flows: DVector<f64> = reactor.mass_profile.column(j).into_owned();
            let rho = mix.mass_density(&flows, t, p)?;
            let mu = mix.mix_viscosity(&flows, t, p)?;
            let mass_flux = flows.sum() * mix.mix_molecular_weight(&flows)? / 1000.0 / area;
            let u = mass_flux / rho;
            gradient[j] = -u / dp * (1.0 - phi) / phi.powi(3)
                * (150.0 * (1.0 - phi) * mu / dp + 1.75 * u * rho);
        }
        Ok(gradient)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(PressureBalanceModel)]
pub enum PressureBalance {
    Isobaric(Isobaric),
    Ergun(Ergun),
}
