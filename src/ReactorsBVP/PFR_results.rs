//! Solved axial profiles of a PFR run, labelled by column.
use crate::ReactorsBVP::reactor_BVP_utils::{ReactorError, SolverStatus};
use RustedSciThe::numerical::BVP_sci::legacy::BVP_sci_nalgebra::BVPResult;
use log::info;
use nalgebra::{DMatrix, DVector};
use prettytable::{Cell, Row, Table};
use serde_json::{Map, Value, json};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PFRTable {
    /// "z", substance names, "temperature", "refrigerant_temperature", "pressure"
    pub columns: Vec<String>,
    /// one row per mesh node, one column per label
    pub data: DMatrix<f64>,
    pub status: SolverStatus,
    pub niter: usize,
    pub max_rms_residual: f64,
    pub max_bc_residual: f64,
}

impl PFRTable {
    pub fn from_solution(
        substance_names: &[String],
        solution: &BVPResult,
        status: SolverStatus,
        max_bc_residual: f64,
    ) -> Self {
        let mut columns = vec!["z".to_string()];
        columns.extend(substance_names.iter().cloned());
        columns.extend(
            ["temperature", "refrigerant_temperature", "pressure"]
                .iter()
                .map(|s| s.to_string()),
        );
        let n_nodes = solution.x.len();
        let mut data = DMatrix::zeros(n_nodes, columns.len());
        data.set_column(0, &solution.x);
        for (i, row) in solution.y.row_iter().enumerate() {
            data.set_column(i + 1, &row.transpose());
        }
        Self {
            columns,
            data,
            status,
            niter: solution.niter,
            max_rms_residual: solution.rms_residuals.max(),
            max_bc_residual,
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_converged(&self) -> bool {
        self.status.is_success()
    }

    pub fn message(&self) -> &'static str {
        self.status.message()
    }

    /// The table itself when the run converged, `NotConverged` otherwise
    pub fn ensure_converged(&self) -> Result<&Self, ReactorError> {
        if self.is_converged() {
            Ok(self)
        } else {
            Err(ReactorError::NotConverged {
                status: self.status,
                message: self.status.message().to_string(),
            })
        }
    }

    pub fn column(&self, name: &str) -> Result<DVector<f64>, ReactorError> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ReactorError::MissingData(format!("no column '{}' in results", name)))?;
        Ok(self.data.column(idx).into_owned())
    }

    pub fn z(&self) -> DVector<f64> {
        self.data.column(0).into_owned()
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(self.columns.iter().map(|c| Cell::new(c)).collect()));
        for row in self.data.row_iter() {
            table.add_row(Row::new(
                row.iter().map(|v| Cell::new(&format!("{:.6e}", v))).collect(),
            ));
        }
        table
    }

    pub fn pretty_print(&self) {
        info!("{} ({} nodes)", self.message(), self.n_nodes());
        self.to_table().printstd();
    }

    /// `{"status": .., "columns": {"z": [..], ..}}`
    pub fn to_json(&self) -> Value {
        let mut columns = Map::new();
        for (i, name) in self.columns.iter().enumerate() {
            let values: Vec<f64> = self.data.column(i).iter().copied().collect();
            columns.insert(name.clone(), json!(values));
        }
        json!({
            "status": self.status,
            "message": self.message(),
            "niter": self.niter,
            "max_rms_residual": self.max_rms_residual,
            "max_bc_residual": self.max_bc_residual,
            "columns": Value::Object(columns),
        })
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ReactorError> {
        let mut file = File::create(path)?;
        let text = serde_json::to_string_pretty(&self.to_json())?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }
}
