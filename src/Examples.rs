/// Runnable PFR demonstrations: numbered tasks called from `main`
pub mod pfr_examples;
