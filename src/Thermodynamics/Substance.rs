//! # Substance
//!
//! A named chemical species and its pure-component property correlations. Correlations are
//! supplied by the user as closures of temperature [K] and pressure [Pa]; the definite
//! heat-capacity integrals take (T1, T2, P). Only molecular weight and the formation
//! enthalpies are plain numbers.
//!
//! Every property is optional. Asking for a property that was never set yields
//! `ReactorError::MissingProperty`, so a mixture only needs the correlations that its phase
//! and the chosen balances actually use.
//!
//! ```
//! use ReactorD::Thermodynamics::Substance::Substance;
//! let water = Substance::new("water")
//!     .with_molecular_weight(18.015)
//!     .with_formation_enthalpy(-285_830.0)
//!     .with_volume_liquid(|_t, _p| 1.8e-5)
//!     .with_heat_capacity_liquid(|_t, _p| 75.3);
//! assert_eq!(water.heat_capacity_liquid(298.15, 101325.0).unwrap(), 75.3);
//! ```

use crate::ReactorsBVP::reactor_BVP_utils::ReactorError;
use std::fmt;

/// property of (temperature, pressure)
pub type PropertyFn = Box<dyn Fn(f64, f64) -> f64 + 'static>;
/// definite integral over temperature of (t1, t2, pressure)
pub type IntegralFn = Box<dyn Fn(f64, f64, f64) -> f64 + 'static>;

/// Gauss-Legendre nodes and weights on [-1, 1], 5 points
const GL_NODES: [f64; 5] = [
    0.0,
    -0.538_469_310_105_683_1,
    0.538_469_310_105_683_1,
    -0.906_179_845_938_664,
    0.906_179_845_938_664,
];
const GL_WEIGHTS: [f64; 5] = [
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
    0.236_926_885_056_189_1,
];
/// temperature span of one quadrature panel [K]
const PANEL_WIDTH: f64 = 50.0;

/// Composite Gauss-Legendre quadrature of `f(t, pressure)` over [t1, t2]
pub fn integrate_over_temperature(f: &dyn Fn(f64, f64) -> f64, t1: f64, t2: f64, pressure: f64) -> f64 {
    if t1 == t2 {
        return 0.0;
    }
    let n_panels = ((t2 - t1).abs() / PANEL_WIDTH).ceil().max(1.0) as usize;
    let width = (t2 - t1) / n_panels as f64;
    let mut integral = 0.0;
    for panel in 0..n_panels {
        let a = t1 + panel as f64 * width;
        let half = 0.5 * width;
        let mid = a + half;
        let sum: f64 = GL_NODES
            .iter()
            .zip(GL_WEIGHTS.iter())
            .map(|(x, w)| w * f(mid + half * x, pressure))
            .sum();
        integral += half * sum;
    }
    integral
}

pub struct Substance {
    pub name: String,
    /// g/mol
    pub molecular_weight: Option<f64>,
    /// standard formation enthalpy at 298.15 K [J/mol]
    pub formation_enthalpy: Option<f64>,
    /// ideal gas formation enthalpy at 298.15 K [J/mol]
    pub formation_enthalpy_ig: Option<f64>,
    volume_liquid: Option<PropertyFn>,
    heat_capacity_liquid: Option<PropertyFn>,
    heat_capacity_gas: Option<PropertyFn>,
    viscosity_liquid: Option<PropertyFn>,
    viscosity_gas: Option<PropertyFn>,
    heat_capacity_liquid_dt_integral: Option<IntegralFn>,
    heat_capacity_gas_dt_integral: Option<IntegralFn>,
}

impl fmt::Debug for Substance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substance")
            .field("name", &self.name)
            .field("molecular_weight", &self.molecular_weight)
            .field("formation_enthalpy", &self.formation_enthalpy)
            .field("formation_enthalpy_ig", &self.formation_enthalpy_ig)
            .field("volume_liquid", &self.volume_liquid.is_some())
            .field("heat_capacity_liquid", &self.heat_capacity_liquid.is_some())
            .field("heat_capacity_gas", &self.heat_capacity_gas.is_some())
            .field("viscosity_liquid", &self.viscosity_liquid.is_some())
            .field("viscosity_gas", &self.viscosity_gas.is_some())
            .finish()
    }
}

impl Substance {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            molecular_weight: None,
            formation_enthalpy: None,
            formation_enthalpy_ig: None,
            volume_liquid: None,
            heat_capacity_liquid: None,
            heat_capacity_gas: None,
            viscosity_liquid: None,
            viscosity_gas: None,
            heat_capacity_liquid_dt_integral: None,
            heat_capacity_gas_dt_integral: None,
        }
    }

    ////////////////////////////////////BUILDER////////////////////////////////////////////

    pub fn with_molecular_weight(mut self, molecular_weight: f64) -> Self {
        self.molecular_weight = Some(molecular_weight);
        self
    }

    pub fn with_formation_enthalpy(mut self, enthalpy: f64) -> Self {
        self.formation_enthalpy = Some(enthalpy);
        self
    }

    pub fn with_formation_enthalpy_ig(mut self, enthalpy: f64) -> Self {
        self.formation_enthalpy_ig = Some(enthalpy);
        self
    }

    pub fn with_volume_liquid(mut self, f: impl Fn(f64, f64) -> f64 + 'static) -> Self {
        self.volume_liquid = Some(Box::new(f));
        self
    }

    pub fn with_heat_capacity_liquid(mut self, f: impl Fn(f64, f64) -> f64 + 'static) -> Self {
        self.heat_capacity_liquid = Some(Box::new(f));
        self
    }

    pub fn with_heat_capacity_gas(mut self, f: impl Fn(f64, f64) -> f64 + 'static) -> Self {
        self.heat_capacity_gas = Some(Box::new(f));
        self
    }

    pub fn with_viscosity_liquid(mut self, f: impl Fn(f64, f64) -> f64 + 'static) -> Self {
        self.viscosity_liquid = Some(Box::new(f));
        self
    }

    pub fn with_viscosity_gas(mut self, f: impl Fn(f64, f64) -> f64 + 'static) -> Self {
        self.viscosity_gas = Some(Box::new(f));
        self
    }

    /// closed form of ∫ cp_liquid dT between (t1, t2) at pressure p
    pub fn with_heat_capacity_liquid_dt_integral(
        mut self,
        f: impl Fn(f64, f64, f64) -> f64 + 'static,
    ) -> Self {
        self.heat_capacity_liquid_dt_integral = Some(Box::new(f));
        self
    }

    /// closed form of ∫ cp_gas dT between (t1, t2) at pressure p
    pub fn with_heat_capacity_gas_dt_integral(
        mut self,
        f: impl Fn(f64, f64, f64) -> f64 + 'static,
    ) -> Self {
        self.heat_capacity_gas_dt_integral = Some(Box::new(f));
        self
    }

    ////////////////////////////////////PROPERTIES////////////////////////////////////////////

    fn missing(&self, property: &str) -> ReactorError {
        ReactorError::MissingProperty {
            substance: self.name.clone(),
            property: property.to_string(),
        }
    }

    fn eval(
        &self,
        f: &Option<PropertyFn>,
        property: &str,
        temperature: f64,
        pressure: f64,
    ) -> Result<f64, ReactorError> {
        f.as_ref()
            .map(|f| f(temperature, pressure))
            .ok_or_else(|| self.missing(property))
    }

    pub fn molecular_weight(&self) -> Result<f64, ReactorError> {
        self.molecular_weight
            .ok_or_else(|| self.missing("molecular_weight"))
    }

    pub fn formation_enthalpy(&self) -> Result<f64, ReactorError> {
        self.formation_enthalpy
            .ok_or_else(|| self.missing("formation_enthalpy"))
    }

    pub fn formation_enthalpy_ig(&self) -> Result<f64, ReactorError> {
        self.formation_enthalpy_ig
            .ok_or_else(|| self.missing("formation_enthalpy_ig"))
    }

    /// molar volume of the pure liquid [m³/mol]
    pub fn volume_liquid(&self, temperature: f64, pressure: f64) -> Result<f64, ReactorError> {
        self.eval(&self.volume_liquid, "volume_liquid", temperature, pressure)
    }

    /// J/mol/K
    pub fn heat_capacity_liquid(&self, temperature: f64, pressure: f64) -> Result<f64, ReactorError> {
        self.eval(
            &self.heat_capacity_liquid,
            "heat_capacity_liquid",
            temperature,
            pressure,
        )
    }

    /// J/mol/K
    pub fn heat_capacity_gas(&self, temperature: f64, pressure: f64) -> Result<f64, ReactorError> {
        self.eval(
            &self.heat_capacity_gas,
            "heat_capacity_gas",
            temperature,
            pressure,
        )
    }

    /// Pa·s
    pub fn viscosity_liquid(&self, temperature: f64, pressure: f64) -> Result<f64, ReactorError> {
        self.eval(&self.viscosity_liquid, "viscosity_liquid", temperature, pressure)
    }

    /// Pa·s
    pub fn viscosity_gas(&self, temperature: f64, pressure: f64) -> Result<f64, ReactorError> {
        self.eval(&self.viscosity_gas, "viscosity_gas", temperature, pressure)
    }

    /// ∫ cp_liquid dT from t1 to t2 [J/mol]. Uses the closed form when one was supplied,
    /// quadrature of `heat_capacity_liquid` otherwise.
    pub fn heat_capacity_liquid_dt_integral(
        &self,
        t1: f64,
        t2: f64,
        pressure: f64,
    ) -> Result<f64, ReactorError> {
        if t1 == t2 {
            return Ok(0.0);
        }
        if let Some(integral) = &self.heat_capacity_liquid_dt_integral {
            return Ok(integral(t1, t2, pressure));
        }
        let cp = self
            .heat_capacity_liquid
            .as_ref()
            .ok_or_else(|| self.missing("heat_capacity_liquid"))?;
        Ok(integrate_over_temperature(cp.as_ref(), t1, t2, pressure))
    }

    /// ∫ cp_gas dT from t1 to t2 [J/mol]
    pub fn heat_capacity_gas_dt_integral(
        &self,
        t1: f64,
        t2: f64,
        pressure: f64,
    ) -> Result<f64, ReactorError> {
        if t1 == t2 {
            return Ok(0.0);
        }
        if let Some(integral) = &self.heat_capacity_gas_dt_integral {
            return Ok(integral(t1, t2, pressure));
        }
        let cp = self
            .heat_capacity_gas
            .as_ref()
            .ok_or_else(|| self.missing("heat_capacity_gas"))?;
        Ok(integrate_over_temperature(cp.as_ref(), t1, t2, pressure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_missing_property() {
        let a = Substance::new("A");
        match a.heat_capacity_gas(300.0, 1e5) {
            Err(ReactorError::MissingProperty {
                substance,
                property,
            }) => {
                assert_eq!(substance, "A");
                assert_eq!(property, "heat_capacity_gas");
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(a.molecular_weight().is_err());
    }

    #[test]
    fn test_quadrature_polynomial_cp() {
        // cp = a + b T + c T^2, exact for the 5 point rule
        let (a, b, c) = (29.0, 1e-2, -3e-6);
        let sub = Substance::new("N2").with_heat_capacity_gas(move |t, _p| a + b * t + c * t * t);
        let (t1, t2) = (298.15, 1000.0);
        let exact = a * (t2 - t1) + b / 2.0 * (t2 * t2 - t1 * t1) + c / 3.0 * (t2.powi(3) - t1.powi(3));
        let integral = sub.heat_capacity_gas_dt_integral(t1, t2, 101325.0).unwrap();
        assert_relative_eq!(integral, exact, max_relative = 1e-12);
        // reversed limits change sign
        let reversed = sub.heat_capacity_gas_dt_integral(t2, t1, 101325.0).unwrap();
        assert_relative_eq!(reversed, -exact, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_width_integral_is_exact_zero() {
        let sub = Substance::new("B").with_heat_capacity_liquid(|t, _p| 50.0 + 0.3 * t.sin());
        assert_eq!(
            sub.heat_capacity_liquid_dt_integral(298.15, 298.15, 101325.0).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_closed_form_integral_preferred() {
        let sub = Substance::new("C")
            .with_heat_capacity_liquid(|_t, _p| 1.0)
            .with_heat_capacity_liquid_dt_integral(|t1, t2, _p| 2.0 * (t2 - t1));
        assert_relative_eq!(
            sub.heat_capacity_liquid_dt_integral(300.0, 310.0, 1e5).unwrap(),
            20.0
        );
    }
}
