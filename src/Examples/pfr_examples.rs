use crate::Kinetics::User_kinetics::Kinetics;
use crate::Kinetics::rate_laws::{ElementaryStruct, constant_rate, power_law_rate};
use crate::ReactorsBVP::PFR::{PFR, ReactorBase};
use crate::ReactorsBVP::energy_balances::{Adiabatic, Isothermic, NoIsothermic};
use crate::ReactorsBVP::mass_balances::MolarFlow;
use crate::ReactorsBVP::pressure_balances::{Ergun, Isobaric};
use crate::ReactorsBVP::reactor_BVP_utils::{BorderValue, ReactorError, SimulationSettings};
use crate::ReactorsBVP::task_parser_reactor_BVP::PFRConfig;
use crate::Thermodynamics::Mixture::Mixture;
use crate::Thermodynamics::Substance::Substance;
use log::info;
use std::collections::HashMap;

fn flows(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub fn pfr_examples(task: usize) -> Result<(), ReactorError> {
    match task {
        0 => {
            // Fogler: liquid phase A -> B, zero order, inlet A and outlet B fixed
            let fa_in = 5.0 / 3600.0; // mol/s
            let fv = 10.0 * 0.001 / 60.0; // m³/s
            let k = 0.05 / 3600.0 / 0.001; // mol/(m³·s)
            let length = 0.099;
            let molar_volume = fv / fa_in;
            let liquid = move |name: &str| {
                Substance::new(name)
                    .with_volume_liquid(move |_, _| molar_volume)
                    .with_heat_capacity_liquid(|_, _| 75.0)
                    .with_formation_enthalpy(0.0)
            };
            let mix = Mixture::ideal_solution(vec![liquid("A"), liquid("B")])?;
            let kinetics = Kinetics::new(vec![constant_rate(k)], mix, vec![-1.0, 1.0], "concentration")?;
            let mut reactor = PFR::new(
                kinetics,
                length,
                1.0,
                100,
                MolarFlow::new(flows(&[("A", fa_in)]), flows(&[("B", k * length)]))?.into(),
                Isothermic::new(298.15)?.into(),
                Isobaric::new(101325.0)?.into(),
            )?;
            reactor.simulate(1e-4, 1000, 1, Some(1e-3))?;
            let table = reactor.results()?.ensure_converged()?;
            let fa = table.column("A")?;
            info!(
                "outlet concentration of A: {:.4} mol/m³ (analytic {:.4})",
                fa[fa.len() - 1] / fv,
                (fa_in - k * length) / fv
            );
            table.pretty_print();
        }
        1 => {
            // adiabatic liquid reactor, first order exothermic A -> B
            let substances = vec![
                Substance::new("A")
                    .with_volume_liquid(|_, _| 1e-4)
                    .with_heat_capacity_liquid(|_, _| 150.0)
                    .with_formation_enthalpy(0.0),
                Substance::new("B")
                    .with_volume_liquid(|_, _| 1e-4)
                    .with_heat_capacity_liquid(|_, _| 150.0)
                    .with_formation_enthalpy(-10_000.0),
            ];
            let mix = Mixture::ideal_solution(substances)?;
            let rate = power_law_rate(
                ElementaryStruct::new(vec![15.0, 0.0, 20_000.0])?,
                vec![1.0, 0.0],
            )?;
            let kinetics = Kinetics::new(vec![rate], mix, vec![-1.0, 1.0], "concentration")?;
            let mut reactor = PFR::new(
                kinetics,
                1.0,
                0.01,
                20,
                MolarFlow::inlet(flows(&[("A", 1.0), ("B", 0.0)]))?.into(),
                Adiabatic::new(BorderValue::In(300.0))?.into(),
                Isobaric::new(101325.0)?.into(),
            )?;
            reactor.simulate_with(&SimulationSettings::new(1e-6, 2000, 2, None))?;
            let table = reactor.results()?;
            let t = table.column("temperature")?;
            info!("adiabatic temperature rise: {:.2} K", t[t.len() - 1] - t[0]);
            table.pretty_print();
        }
        2 => {
            // nitrogen through a packed bed, outlet pressure fixed, counter-current cooling
            let n2 = Substance::new("N2")
                .with_molecular_weight(28.0)
                .with_heat_capacity_gas(|_, _| 29.1)
                .with_viscosity_gas(|_, _| 1.8e-5)
                .with_formation_enthalpy_ig(0.0);
            let mix = Mixture::ideal_gas(vec![n2])?;
            let kinetics = Kinetics::new(vec![constant_rate(0.0)], mix, vec![0.0], "concentration")?;
            let mut reactor = PFR::new(
                kinetics,
                1.0,
                0.01,
                20,
                MolarFlow::inlet(flows(&[("N2", 1.0)]))?.into(),
                NoIsothermic::new(
                    BorderValue::In(450.0),
                    BorderValue::Out(300.0),
                    100.0,
                    2.0,
                    75.0,
                )?
                .into(),
                Ergun::new(&flows(&[("out", 1.5e5)]), 0.4, 0.003)?.into(),
            )?;
            reactor.simulate(1e-5, 1000, 1, Some(1e-6))?;
            let table = reactor.results()?;
            let p = table.column("pressure")?;
            info!("pressure drop over the bed: {:.1} Pa", p[0] - p[p.len() - 1]);
            table.pretty_print();
        }
        3 => {
            // the Fogler case read from a JSON document
            let content = r#"{
                "reactor_length": 0.099,
                "transversal_area": 1.0,
                "grid_size": 50,
                "mass_balance": {"type": "molar_flow", "molar_flows_in": {"A": 0.001388888888888889, "B": 0.0}},
                "energy_balance": {"type": "isothermic", "temperature": 298.15},
                "pressure_balance": {"type": "isobaric", "pressure": 101325.0},
                "settings": {"tol": 1e-4, "verbose": 1}
            }"#;
            let molar_volume = (10.0 * 0.001 / 60.0) / (5.0 / 3600.0);
            let liquid = move |name: &str| {
                Substance::new(name)
                    .with_volume_liquid(move |_, _| molar_volume)
                    .with_heat_capacity_liquid(|_, _| 75.0)
                    .with_formation_enthalpy(0.0)
            };
            let mix = Mixture::ideal_solution(vec![liquid("A"), liquid("B")])?;
            let kinetics = Kinetics::new(
                vec![constant_rate(0.05 / 3600.0 / 0.001)],
                mix,
                vec![-1.0, 1.0],
                "concentration",
            )?;
            let reactor = PFRConfig::from_json_str(content)?.solve(kinetics)?;
            info!("kinetic argument: {}", reactor.kinetic_argument());
            reactor.results()?.pretty_print();
        }
        _ => {
            info!("no example with number {}", task);
        }
    }
    Ok(())
}
