//! # Task Parser for Reactor BVP Module
//!
//! JSON front end of the PFR: geometry, the three balances and the solver settings are read
//! from a document and turned into a ready-to-simulate `PFR`. Substances and rate functions
//! are closures, so the `Kinetics` is always supplied in code and handed to `build`.
//!
//! ## Document layout
//!
//! ```json
//! {
//!   "reactor_length": 0.099,
//!   "transversal_area": 1.0,
//!   "grid_size": 100,
//!   "mass_balance": {"type": "molar_flow", "molar_flows_in": {"A": 0.0014}, "molar_flows_out": {"B": 0.0012}},
//!   "energy_balance": {"type": "isothermic", "temperature": 298.15},
//!   "pressure_balance": {"type": "isobaric", "pressure": 101325.0},
//!   "settings": {"tol": 1e-4, "max_nodes": 1000, "verbose": 0, "bc_tol": 1e-3}
//! }
//! ```
//!
//! Balance sections are tagged by `"type"`:
//! - mass: `molar_flow`
//! - energy: `isothermic`, `adiabatic`, `no_isothermic`
//! - pressure: `isobaric`, `ergun`
//!
//! Scalars fixed at one edge of the reactor (temperatures of the adiabatic and non isothermic
//! balances, the Ergun pressure) are written as `{"in": value}` or `{"out": value}`.
//! Giving both keys is rejected by `build`, not by the JSON reader.
//!
//! ## Main Methods
//!
//! - **`PFRConfig::from_json_str()`** / **`PFRConfig::from_file()`**: read the document
//! - **`PFRConfig::build()`**: validate and assemble the reactor
//! - **`PFRConfig::solve()`**: build and simulate with the stored settings
//! - **`solve_from_file()`**: one-shot file → reactor → simulation
//! - **`create_template()`**: write a filled-in document to start from

use crate::Kinetics::User_kinetics::Kinetics;
use crate::ReactorsBVP::PFR::{PFR, ReactorBase};
use crate::ReactorsBVP::energy_balances::{Adiabatic, EnergyBalance, Isothermic, NoIsothermic};
use crate::ReactorsBVP::mass_balances::{MassBalance, MolarFlow};
use crate::ReactorsBVP::pressure_balances::{Ergun, Isobaric, PressureBalance};
use crate::ReactorsBVP::reactor_BVP_utils::{BorderValue, ReactorError, SimulationSettings};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MassBalanceConfig {
    MolarFlow {
        #[serde(default)]
        molar_flows_in: HashMap<String, f64>,
        #[serde(default)]
        molar_flows_out: HashMap<String, f64>,
    },
}

impl MassBalanceConfig {
    pub fn build(&self) -> Result<MassBalance, ReactorError> {
        match self {
            MassBalanceConfig::MolarFlow {
                molar_flows_in,
                molar_flows_out,
            } => Ok(MolarFlow::new(molar_flows_in.clone(), molar_flows_out.clone())?.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnergyBalanceConfig {
    Isothermic {
        temperature: f64,
    },
    Adiabatic {
        temperature: HashMap<String, f64>,
    },
    NoIsothermic {
        temperature: HashMap<String, f64>,
        refrigerant_temperature: HashMap<String, f64>,
        heat_exchange_coefficient: f64,
        refrigerant_molar_flow: f64,
        refrigerant_heat_capacity: f64,
    },
}

impl EnergyBalanceConfig {
    pub fn build(&self) -> Result<EnergyBalance, ReactorError> {
        let balance: EnergyBalance = match self {
            EnergyBalanceConfig::Isothermic { temperature } => Isothermic::new(*temperature)?.into(),
            EnergyBalanceConfig::Adiabatic { temperature } => {
                Adiabatic::new(BorderValue::from_map(temperature, "Temperature")?)?.into()
            }
            EnergyBalanceConfig::NoIsothermic {
                temperature,
                refrigerant_temperature,
                heat_exchange_coefficient,
                refrigerant_molar_flow,
                refrigerant_heat_capacity,
            } => NoIsothermic::new(
                BorderValue::from_map(temperature, "Temperature")?,
                BorderValue::from_map(refrigerant_temperature, "Refrigerant temperature")?,
                *heat_exchange_coefficient,
                *refrigerant_molar_flow,
                *refrigerant_heat_capacity,
            )?
            .into(),
        };
        Ok(balance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PressureBalanceConfig {
    Isobaric {
        pressure: f64,
    },
    Ergun {
        pressure: HashMap<String, f64>,
        porosity: f64,
        particle_diameter: f64,
    },
}

impl PressureBalanceConfig {
    pub fn build(&self) -> Result<PressureBalance, ReactorError> {
        let balance: PressureBalance = match self {
            PressureBalanceConfig::Isobaric { pressure } => Isobaric::new(*pressure)?.into(),
            PressureBalanceConfig::Ergun {
                pressure,
                porosity,
                particle_diameter,
            } => Ergun::new(pressure, *porosity, *particle_diameter)?.into(),
        };
        Ok(balance)
    }
}

/// Everything a PFR needs apart from its chemistry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PFRConfig {
    /// m
    pub reactor_length: f64,
    /// m²
    pub transversal_area: f64,
    pub grid_size: usize,
    pub mass_balance: MassBalanceConfig,
    pub energy_balance: EnergyBalanceConfig,
    pub pressure_balance: PressureBalanceConfig,
    #[serde(default)]
    pub settings: SimulationSettings,
}

impl PFRConfig {
    pub fn from_json_str(content: &str) -> Result<Self, ReactorError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReactorError> {
        let content = fs::read_to_string(path.as_ref())?;
        info!("reactor configuration read from {}", path.as_ref().display());
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> Result<String, ReactorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Assemble the reactor around `kinetics`. Every balance is validated here.
    pub fn build(&self, kinetics: Kinetics) -> Result<PFR, ReactorError> {
        self.settings.validate()?;
        PFR::new(
            kinetics,
            self.reactor_length,
            self.transversal_area,
            self.grid_size,
            self.mass_balance.build()?,
            self.energy_balance.build()?,
            self.pressure_balance.build()?,
        )
    }

    /// Build and simulate with the stored settings. The reactor is returned whatever the
    /// solver status; check `results()` for convergence.
    pub fn solve(&self, kinetics: Kinetics) -> Result<PFR, ReactorError> {
        let mut reactor = self.build(kinetics)?;
        reactor.simulate_with(&self.settings)?;
        Ok(reactor)
    }
}

/// One-shot method: file → configuration → simulated reactor
pub fn solve_from_file<P: AsRef<Path>>(path: P, kinetics: Kinetics) -> Result<PFR, ReactorError> {
    PFRConfig::from_file(path)?.solve(kinetics)
}

/// Write a template configuration for a two substance liquid reactor with one inlet and one
/// outlet flow
pub fn create_template<P: AsRef<Path>>(path: P) -> Result<(), ReactorError> {
    let template = PFRConfig {
        reactor_length: 0.099,
        transversal_area: 1.0,
        grid_size: 100,
        mass_balance: MassBalanceConfig::MolarFlow {
            molar_flows_in: HashMap::from([("A".to_string(), 5.0 / 3600.0)]),
            molar_flows_out: HashMap::from([("B".to_string(), 0.00123)]),
        },
        energy_balance: EnergyBalanceConfig::Isothermic {
            temperature: 298.15,
        },
        pressure_balance: PressureBalanceConfig::Isobaric { pressure: 101325.0 },
        settings: SimulationSettings::new(1e-4, 1000, 0, Some(1e-3)),
    };
    fs::write(path.as_ref(), template.to_json_string()?)?;
    info!("Template created: {}", path.as_ref().display());
    Ok(())
}

////////////////////////////////////////////////////TESTS///////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::rate_laws::constant_rate;
    use crate::ReactorsBVP::energy_balances::EnergyBalanceModel;
    use crate::ReactorsBVP::mass_balances::MassBalanceModel;
    use crate::Thermodynamics::Mixture::Mixture;
    use crate::Thermodynamics::Substance::Substance;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    const TASK_CONTENT: &str = r#"
    {
        "reactor_length": 0.099,
        "transversal_area": 1.0,
        "grid_size": 20,
        "mass_balance": {
            "type": "molar_flow",
            "molar_flows_in": {"A": 0.001388888888888889, "B": 0.0}
        },
        "energy_balance": {"type": "isothermic", "temperature": 298.15},
        "pressure_balance": {"type": "isobaric", "pressure": 101325.0},
        "settings": {"tol": 1e-4, "max_nodes": 500}
    }
    "#;

    fn liquid_kinetics() -> Kinetics {
        let molar_volume = 1.0 / (5.0 / 3600.0 / (10.0 * 0.001 / 60.0));
        let substances = vec![
            Substance::new("A")
                .with_volume_liquid(move |_, _| molar_volume)
                .with_heat_capacity_liquid(|_, _| 75.0)
                .with_formation_enthalpy(0.0),
            Substance::new("B")
                .with_volume_liquid(move |_, _| molar_volume)
                .with_heat_capacity_liquid(|_, _| 75.0)
                .with_formation_enthalpy(0.0),
        ];
        let mix = Mixture::ideal_solution(substances).unwrap();
        Kinetics::new(
            vec![constant_rate(0.05 / 3600.0 / 0.001)],
            mix,
            vec![-1.0, 1.0],
            "concentration",
        )
        .unwrap()
    }

    #[test]
    fn test_parse_task_content() {
        let config = PFRConfig::from_json_str(TASK_CONTENT).unwrap();
        assert_eq!(config.grid_size, 20);
        assert_relative_eq!(config.reactor_length, 0.099);
        assert_relative_eq!(config.settings.tol, 1e-4);
        assert_eq!(config.settings.max_nodes, 500);
        assert_eq!(config.settings.verbose, 0);
        assert_eq!(config.settings.bc_tol, None);
        assert_eq!(
            config.energy_balance,
            EnergyBalanceConfig::Isothermic {
                temperature: 298.15
            }
        );
        match &config.mass_balance {
            MassBalanceConfig::MolarFlow {
                molar_flows_in,
                molar_flows_out,
            } => {
                assert_eq!(molar_flows_in.len(), 2);
                assert!(molar_flows_out.is_empty());
            }
        }
    }

    #[test]
    fn test_settings_default_when_absent() {
        let content = r#"{
            "reactor_length": 1.0,
            "transversal_area": 0.5,
            "grid_size": 5,
            "mass_balance": {"type": "molar_flow", "molar_flows_in": {"A": 1.0}},
            "energy_balance": {"type": "isothermic", "temperature": 300.0},
            "pressure_balance": {"type": "isobaric", "pressure": 1e5}
        }"#;
        let config = PFRConfig::from_json_str(content).unwrap();
        assert_eq!(config.settings, SimulationSettings::default());
    }

    #[test]
    fn test_tagged_balances() {
        let energy: EnergyBalanceConfig = serde_json::from_str(
            r#"{"type": "no_isothermic", "temperature": {"in": 600.0},
                "refrigerant_temperature": {"out": 300.0}, "heat_exchange_coefficient": 50.0,
                "refrigerant_molar_flow": 2.0, "refrigerant_heat_capacity": 75.0}"#,
        )
        .unwrap();
        match energy.build().unwrap() {
            EnergyBalance::NoIsothermic(balance) => {
                assert_eq!(balance.temperature, BorderValue::In(600.0));
                assert!(!balance.is_co_current());
            }
            other => panic!("unexpected energy balance {:?}", other),
        }

        let pressure: PressureBalanceConfig = serde_json::from_str(
            r#"{"type": "ergun", "pressure": {"out": 2e5}, "porosity": 0.4, "particle_diameter": 0.003}"#,
        )
        .unwrap();
        match pressure.build().unwrap() {
            PressureBalance::Ergun(balance) => {
                assert_eq!(balance.pressure, BorderValue::Out(2e5));
                assert_relative_eq!(balance.porosity, 0.4);
            }
            other => panic!("unexpected pressure balance {:?}", other),
        }
    }

    #[test]
    fn test_unknown_balance_type_is_rejected() {
        let result: Result<EnergyBalanceConfig, _> =
            serde_json::from_str(r#"{"type": "polytropic", "temperature": 300.0}"#);
        assert!(result.is_err());
        let bad = TASK_CONTENT.replace("isobaric", "isochoric");
        assert!(matches!(
            PFRConfig::from_json_str(&bad),
            Err(ReactorError::Json(_))
        ));
    }

    #[test]
    fn test_both_edges_rejected_at_build() {
        let pressure = PressureBalanceConfig::Ergun {
            pressure: HashMap::from([("in".to_string(), 2e5), ("out".to_string(), 1e5)]),
            porosity: 0.4,
            particle_diameter: 0.003,
        };
        assert!(matches!(
            pressure.build(),
            Err(ReactorError::InvalidConfiguration(_))
        ));

        let energy = EnergyBalanceConfig::Adiabatic {
            temperature: HashMap::new(),
        };
        assert!(matches!(
            energy.build(),
            Err(ReactorError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_build_reactor() {
        let config = PFRConfig::from_json_str(TASK_CONTENT).unwrap();
        let reactor = config.build(liquid_kinetics()).unwrap();
        assert_eq!(reactor.grid_size(), 20);
        assert_relative_eq!(reactor.transversal_area(), 1.0);
        assert_eq!(
            reactor.mass_balance().border_conditions(&reactor).unwrap(),
            vec![(Some(5.0 / 3600.0), None), (Some(0.0), None)]
        );
        assert_eq!(
            reactor.energy_balance().border_conditions(&reactor).unwrap(),
            vec![(Some(298.15), None), (Some(298.15), None)]
        );
    }

    #[test]
    fn test_build_rejects_unknown_substance() {
        let content = TASK_CONTENT.replace("\"B\"", "\"C\"");
        let config = PFRConfig::from_json_str(&content).unwrap();
        assert!(matches!(
            config.build(liquid_kinetics()),
            Err(ReactorError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_build_rejects_bad_geometry() {
        let mut config = PFRConfig::from_json_str(TASK_CONTENT).unwrap();
        config.grid_size = 1;
        assert!(config.build(liquid_kinetics()).is_err());
        config.grid_size = 10;
        config.transversal_area = 0.0;
        assert!(config.build(liquid_kinetics()).is_err());
    }

    #[test]
    fn test_solve_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TASK_CONTENT.as_bytes()).unwrap();
        let reactor = solve_from_file(file.path(), liquid_kinetics()).unwrap();
        let table = reactor.results().unwrap().ensure_converged().unwrap();

        let fa_in = 5.0 / 3600.0;
        let fv = 10.0 * 0.001 / 60.0;
        let k = 0.05 / 3600.0 / 0.001;
        let z = table.z();
        let fa = table.column("A").unwrap();
        for (zi, fai) in z.iter().zip(fa.iter()) {
            assert_relative_eq!(*fai, fa_in - zi * k, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = PFRConfig::from_file(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ReactorError::Io(_))));
    }

    #[test]
    fn test_template_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("template.json");
        create_template(&path).unwrap();
        let config = PFRConfig::from_file(&path).unwrap();
        assert_eq!(config.grid_size, 100);
        assert_eq!(config.settings.bc_tol, Some(1e-3));
        assert!(config.build(liquid_kinetics()).is_ok());
    }
}
