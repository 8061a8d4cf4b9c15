#[cfg(test)]
mod tests {
    use crate::Kinetics::User_kinetics::{KineticArgument, Kinetics, RateFunction};
    use crate::Kinetics::rate_laws::{ElementaryStruct, constant_rate, power_law_rate};
    use crate::ReactorsBVP::reactor_BVP_utils::ReactorError;
    use crate::Thermodynamics::Mixture::{Mixture, R};
    use crate::Thermodynamics::Substance::Substance;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    /// N2 + 3 H2 -> 2 NH3 as an ideal gas with constant heat capacities
    fn ammonia_gas() -> Mixture {
        let n2 = Substance::new("N2")
            .with_molecular_weight(28.0134)
            .with_formation_enthalpy_ig(0.0)
            .with_heat_capacity_gas(|_t, _p| 29.1);
        let h2 = Substance::new("H2")
            .with_molecular_weight(2.01588)
            .with_formation_enthalpy_ig(0.0)
            .with_heat_capacity_gas(|_t, _p| 28.8);
        let nh3 = Substance::new("NH3")
            .with_molecular_weight(17.03052)
            .with_formation_enthalpy_ig(-45_900.0)
            .with_heat_capacity_gas(|_t, _p| 35.1);
        Mixture::ideal_gas(vec![n2, h2, nh3]).unwrap()
    }

    fn ammonia_rate() -> RateFunction {
        let el = ElementaryStruct::new(vec![1e-3, 0.0, 20_000.0]).unwrap();
        power_law_rate(el, vec![1.0, 1.5, 0.0]).unwrap()
    }

    #[test]
    fn test_invalid_kinetic_argument() {
        let result = Kinetics::new(
            vec![ammonia_rate()],
            ammonia_gas(),
            vec![-1.0, -3.0, 2.0],
            "molality",
        );
        assert!(matches!(result, Err(ReactorError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_kinetic_argument_is_case_insensitive() {
        let kinetics = Kinetics::new(
            vec![ammonia_rate()],
            ammonia_gas(),
            vec![-1.0, -3.0, 2.0],
            "Partial_Pressure",
        )
        .unwrap();
        assert_eq!(kinetics.kinetic_argument(), KineticArgument::PartialPressure);
    }

    #[test]
    fn test_stoichiometry_column_mismatch() {
        let result = Kinetics::new(
            vec![ammonia_rate()],
            ammonia_gas(),
            vec![-1.0, 2.0],
            "concentration",
        );
        assert!(matches!(result, Err(ReactorError::InvalidConfiguration(_))));
        let ragged = Kinetics::new(
            vec![ammonia_rate(), ammonia_rate()],
            ammonia_gas(),
            vec![vec![-1.0, -3.0, 2.0], vec![1.0, 3.0]],
            "concentration",
        );
        assert!(ragged.is_err());
    }

    #[test]
    fn test_rate_function_count_mismatch() {
        let result = Kinetics::new(
            vec![ammonia_rate(), ammonia_rate()],
            ammonia_gas(),
            vec![-1.0, -3.0, 2.0],
            "concentration",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_flat_and_nested_stoichiometry_agree() {
        let flat = Kinetics::new(
            vec![ammonia_rate()],
            ammonia_gas(),
            vec![-1.0, -3.0, 2.0],
            "concentration",
        )
        .unwrap();
        let nested = Kinetics::new(
            vec![ammonia_rate()],
            ammonia_gas(),
            vec![vec![-1.0, -3.0, 2.0]],
            "concentration",
        )
        .unwrap();
        let matrix = Kinetics::new(
            vec![ammonia_rate()],
            ammonia_gas(),
            DMatrix::from_row_slice(1, 3, &[-1.0, -3.0, 2.0]),
            "concentration",
        )
        .unwrap();
        assert_eq!(flat.stoichiometry().shape(), (1, 3));
        let moles = DVector::from_vec(vec![1.0, 3.0, 0.2]);
        let a = flat.kinetic_eval(&moles, 700.0, 2e7).unwrap();
        let b = nested.kinetic_eval(&moles, 700.0, 2e7).unwrap();
        let c = matrix.kinetic_eval(&moles, 700.0, 2e7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_kinetic_eval_conserves_mass() {
        let kinetics = Kinetics::new(
            vec![ammonia_rate(), constant_rate(0.3)],
            ammonia_gas(),
            vec![vec![-1.0, -3.0, 2.0], vec![1.0, 3.0, -2.0]],
            "concentration",
        )
        .unwrap();
        let mw = kinetics.mix().molecular_weights().unwrap();
        let moles = DVector::from_vec(vec![0.25, 0.7, 0.05]);
        let (net, rates) = kinetics.kinetic_eval(&moles, 650.0, 1.5e7).unwrap();
        assert_eq!(rates.len(), 2);
        let mass_rate = net.dot(&mw);
        assert!(mass_rate.abs() < 1e-9 * rates.abs().max() * mw.max());
    }

    #[test]
    fn test_kinetic_eval_uses_selected_composition() {
        // rate equal to the composition of the first substance
        let first: RateFunction = Box::new(|c: &DVector<f64>, _t: f64| c[0]);
        let first_pp: RateFunction = Box::new(|c: &DVector<f64>, _t: f64| c[0]);
        let conc = Kinetics::new(vec![first], ammonia_gas(), vec![-1.0, 0.0, 1.0], "concentration")
            .unwrap();
        let pp = Kinetics::new(
            vec![first_pp],
            ammonia_gas(),
            vec![-1.0, 0.0, 1.0],
            "partial_pressure",
        )
        .unwrap();
        let moles = DVector::from_vec(vec![1.0, 1.0, 2.0]);
        let (t, p) = (500.0, 1e5);
        let (net_c, r_c) = conc.kinetic_eval(&moles, t, p).unwrap();
        let (_, r_p) = pp.kinetic_eval(&moles, t, p).unwrap();
        assert_relative_eq!(r_c[0], 0.25 * p / (R * t), max_relative = 1e-12);
        assert_relative_eq!(r_p[0], 0.25 * p, max_relative = 1e-12);
        assert_relative_eq!(net_c[0], -r_c[0]);
        assert_relative_eq!(net_c[1], 0.0);
        assert_relative_eq!(net_c[2], r_c[0]);
    }

    #[test]
    fn test_kinetic_eval_profile_preserves_node_order() {
        let kinetics = Kinetics::new(
            vec![ammonia_rate()],
            ammonia_gas(),
            vec![-1.0, -3.0, 2.0],
            "concentration",
        )
        .unwrap();
        let moles = DMatrix::from_row_slice(3, 3, &[
            1.0, 0.5, 0.2, //
            3.0, 2.0, 0.9, //
            0.0, 0.8, 1.9,
        ]);
        let t = DVector::from_vec(vec![600.0, 650.0, 700.0]);
        let p = DVector::from_vec(vec![1e7, 1.1e7, 1.2e7]);
        let (net, rates) = kinetics.kinetic_eval_profile(&moles, &t, &p).unwrap();
        assert_eq!(net.shape(), (3, 3));
        assert_eq!(rates.shape(), (1, 3));
        for j in 0..3 {
            let column: DVector<f64> = moles.column(j).into_owned();
            let (single_net, single_rates) = kinetics.kinetic_eval(&column, t[j], p[j]).unwrap();
            assert_eq!(net.column(j).into_owned(), single_net);
            assert_eq!(rates.column(j).into_owned(), single_rates);
        }
        let bad_t = DVector::from_vec(vec![600.0, 650.0]);
        assert!(kinetics.kinetic_eval_profile(&moles, &bad_t, &p).is_err());
    }

    #[test]
    fn test_reaction_enthalpies_at_reference_are_standard() {
        let kinetics = Kinetics::new(
            vec![ammonia_rate()],
            ammonia_gas(),
            vec![-1.0, -3.0, 2.0],
            "concentration",
        )
        .unwrap();
        let standard = kinetics.std_reaction_enthalpies().unwrap().clone();
        assert_relative_eq!(standard[0], -91_800.0);
        let at_ref = kinetics.reaction_enthalpies(298.15, 101325.0).unwrap();
        assert_eq!(at_ref, standard);
    }

    #[test]
    fn test_reaction_enthalpies_constant_cp() {
        let kinetics = Kinetics::new(
            vec![ammonia_rate()],
            ammonia_gas(),
            vec![-1.0, -3.0, 2.0],
            "concentration",
        )
        .unwrap();
        let dcp = 2.0 * 35.1 - 29.1 - 3.0 * 28.8;
        let h = kinetics.reaction_enthalpies(698.15, 101325.0).unwrap();
        assert_relative_eq!(h[0], -91_800.0 + dcp * 400.0, max_relative = 1e-10);
    }

    #[test]
    fn test_missing_formation_enthalpies() {
        let a = Substance::new("A").with_volume_liquid(|_t, _p| 1e-4);
        let b = Substance::new("B").with_volume_liquid(|_t, _p| 1e-4);
        let mix = Mixture::ideal_solution(vec![a, b]).unwrap();
        let kinetics =
            Kinetics::new(vec![constant_rate(1.0)], mix, vec![-1.0, 1.0], "concentration").unwrap();
        assert!(kinetics.std_reaction_enthalpies().is_none());
        assert!(matches!(
            kinetics.reaction_enthalpies(350.0, 1e5),
            Err(ReactorError::MissingProperty { .. })
        ));
    }

    #[test]
    fn test_with_mix_rebuilds_enthalpies() {
        let a = Substance::new("A")
            .with_volume_liquid(|_t, _p| 1e-4)
            .with_formation_enthalpy(-10.0);
        let b = Substance::new("B")
            .with_volume_liquid(|_t, _p| 1e-4)
            .with_formation_enthalpy(-30.0);
        let kinetics = Kinetics::new(
            vec![constant_rate(1.0)],
            Mixture::ideal_solution(vec![a, b]).unwrap(),
            vec![-1.0, 1.0],
            "concentration",
        )
        .unwrap();
        assert_relative_eq!(kinetics.std_reaction_enthalpies().unwrap()[0], -20.0);

        let a2 = Substance::new("A")
            .with_volume_liquid(|_t, _p| 1e-4)
            .with_formation_enthalpy(0.0);
        let b2 = Substance::new("B")
            .with_volume_liquid(|_t, _p| 1e-4)
            .with_formation_enthalpy(-50.0);
        let kinetics = kinetics
            .with_mix(Mixture::ideal_solution(vec![a2, b2]).unwrap())
            .unwrap();
        assert_relative_eq!(kinetics.std_reaction_enthalpies().unwrap()[0], -50.0);
        assert_eq!(kinetics.mix().names(), vec!["A".to_string(), "B".to_string()]);

        let too_many = Mixture::ideal_solution(vec![
            Substance::new("A"),
            Substance::new("B"),
            Substance::new("C"),
        ])
        .unwrap();
        assert!(kinetics.with_mix(too_many).is_err());
    }
}
