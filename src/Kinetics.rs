/// kinetics evaluator: stoichiometry, user rate functions and the mixture they act on.
/// Converts local composition into reaction rates and net production rates of substances,
/// one grid node at a time or for a whole profile
#[allow(non_snake_case)]
pub mod User_kinetics;
/// Arrhenius constants and power-law rate functions
pub mod rate_laws;
#[allow(non_snake_case)]
mod User_kinetics_tests;
