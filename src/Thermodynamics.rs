/// pure substance data: molecular weight, formation enthalpies and user supplied property
/// correlations as closures of temperature and pressure
#[allow(non_snake_case)]
pub mod Substance;
/// ideal gas and ideal solution mixtures with single-node and batch (per grid node) operations
#[allow(non_snake_case)]
pub mod Mixture;
