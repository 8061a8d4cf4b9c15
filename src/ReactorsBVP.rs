//! # Reactor Boundary Value Problem (BVP) Module
//!
//! Steady state, one dimensional plug flow reactor (PFR) posed as a boundary value problem in
//! the axial coordinate `z ∈ [0, L]`. Every state variable may be fixed at the inlet or at the
//! outlet, which is what makes the problem a BVP instead of an initial value problem.
//!
//! ## Mathematical Model
//!
//! ### Nomenclature
//!
//! | Symbol | Description | Units |
//! |--------|-------------|-------|
//! | `z` | Axial coordinate | m |
//! | `L` | Reactor length | m |
//! | `A` | Transversal (cross section) area | m² |
//! | `F_i` | Molar flow of substance `i` | mol/s |
//! | `T` | Temperature | K |
//! | `Tr` | Refrigerant temperature | K |
//! | `P` | Pressure | Pa |
//! | `r_j` | Rate of reaction `j` | mol/(m³·s) |
//! | `ν_ji` | Stoichiometric coefficient of substance `i` in reaction `j` | - |
//! | `ΔH_j` | Reaction enthalpy | J/mol |
//! | `cp` | Molar heat capacity of the mixture | J/(mol·K) |
//! | `U` | Heat exchange coefficient | W/(m²·K) |
//! | `φ`, `dp` | Bed porosity, particle diameter | -, m |
//!
//! ### Governing Equations
//!
//! ```text
//! dF_i/dz = A Σ_j ν_ji r_j
//! dT/dz   = energy balance (isothermic | adiabatic | heat exchange with a refrigerant)
//! dTr/dz  = refrigerant balance (zero unless heat is exchanged)
//! dP/dz   = pressure balance (isobaric | Ergun)
//! ```
//!
//! ### Boundary Conditions
//!
//! Each row of the state gets exactly one value, fixed either at `z = 0` or at `z = L`. The
//! residuals handed to the solver list the inlet constraints first, then the outlet ones.
//!
//! ## Numerical Solution
//!
//! The system of `n + 3` first order ODEs for `n` substances is solved by 4th order collocation
//! with mesh refinement, `solve_bvp` from `RustedSciThe::numerical::BVP_sci`.
//!
//! ## Modules
//!
//! - `reactor_BVP_utils`: error type, settings, boundary condition bookkeeping, templates
//! - `mass_balances`, `energy_balances`, `pressure_balances`: balance models
//! - `PFR`: the reactor
//! - `PFR_results`: solved profiles as a labelled table
//! - `task_parser_reactor_BVP`: JSON configuration

pub mod PFR;
pub mod PFR_results;
pub mod energy_balances;
pub mod mass_balances;
pub mod pressure_balances;
pub mod reactor_BVP_utils;
pub mod task_parser_reactor_BVP;
