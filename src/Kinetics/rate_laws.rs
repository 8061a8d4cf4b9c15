//! Common rate laws packed as `RateFunction` closures.
//!
//! A rate function receives the composition vector selected by the kinetic argument
//! (concentrations or partial pressures, in mixture order) and the temperature.
use crate::Kinetics::User_kinetics::RateFunction;
use crate::ReactorsBVP::reactor_BVP_utils::ReactorError;
use crate::Thermodynamics::Mixture::R;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/////////////////////////ELEMENTARTY KINETICS///////////////////////////////////////////////////////////////
// kinetic constant in the simplest Arrhenius form  A*Temp.powf(n)*exp(-E/(Temp*R))
#[allow(non_snake_case)]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ElementaryStruct {
    /// [A, n, E], E in J/mol
    pub Arrenius: Vec<f64>,
}

#[allow(non_snake_case)]
impl ElementaryStruct {
    pub fn new(Arrenius: Vec<f64>) -> Result<Self, ReactorError> {
        if Arrenius.len() != 3 {
            return Err(ReactorError::InvalidConfiguration(format!(
                "Arrhenius parameters must be [A, n, E], got {} values",
                Arrenius.len()
            )));
        }
        Ok(Self { Arrenius })
    }

    pub fn K_const(&self, Temp: f64) -> f64 {
        let A = self.Arrenius[0];
        let n = self.Arrenius[1];
        let E = self.Arrenius[2];
        A * Temp.powf(n) * f64::exp(-E / (Temp * R))
    }
}

/// r = k
pub fn constant_rate(k: f64) -> RateFunction {
    Box::new(move |_composition: &DVector<f64>, _temperature: f64| k)
}

/// r = k(T) · Π c_i^{order_i}; substances with zero order are skipped
pub fn power_law_rate(
    arrhenius: ElementaryStruct,
    orders: Vec<f64>,
) -> Result<RateFunction, ReactorError> {
    if orders.iter().any(|o| !o.is_finite()) {
        return Err(ReactorError::InvalidConfiguration(
            "reaction orders must be finite".to_string(),
        ));
    }
    let active: Vec<(usize, f64)> = orders
        .into_iter()
        .enumerate()
        .filter(|(_, order)| *order != 0.0)
        .collect();
    Ok(Box::new(move |composition: &DVector<f64>, temperature: f64| {
        let k = arrhenius.K_const(temperature);
        active
            .iter()
            .fold(k, |acc, (i, order)| acc * composition[*i].powf(*order))
    }))
}
