// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters for `hydrogenline` subcommands.
//!
//! The code here is kind of "mirroring" the code within the `cli` module; the
//! idea is that `cli` is unparsed, user-facing code, whereas parameters have
//! been parsed and are ready to be used directly.

mod spectra;
mod waterfall;

pub(crate) use spectra::SpectraParams;
pub(crate) use waterfall::WaterfallParams;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::CAPTURE_TIMESTAMP_FORMAT, dsp::BaselinePolicy, dsp::DspError,
    measurement::MeasurementError, window::WindowFunction, PROGRESS_BARS,
};

/// Calibrated spectra of a measurement, ready to be plotted by something else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedOutput {
    /// How the baseline was removed.
    pub policy: BaselinePolicy,

    /// The units of the spectra.
    pub units: String,

    /// The frequency of every remaining bin \[Hz\].
    pub frequencies_hz: Vec<f64>,

    /// The capture timestamp of every remaining spectrum.
    pub timestamps: Vec<String>,

    pub spectra: IndexMap<WindowFunction, ProcessedBatch>,
}

/// The calibrated spectra of a single window function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedBatch {
    /// The suggested top of a colour scale for these spectra.
    pub color_scale_max: f64,

    /// `[measurement][bin]`
    pub psd: Vec<Vec<f64>>,
}

impl ProcessedBatch {
    fn new(batch: ArrayView2<f64>, color_scale_max: f64) -> ProcessedBatch {
        ProcessedBatch {
            color_scale_max,
            psd: batch.outer_iter().map(|row| row.to_vec()).collect(),
        }
    }
}

impl ProcessedOutput {
    fn new(
        policy: BaselinePolicy,
        frequencies_hz: ArrayView1<f64>,
        timestamps: &[NaiveDateTime],
        spectra: IndexMap<WindowFunction, ProcessedBatch>,
    ) -> ProcessedOutput {
        ProcessedOutput {
            policy,
            units: match policy {
                // Dividing by the reference cancels the units.
                BaselinePolicy::Pipeline => "relative".to_string(),
                BaselinePolicy::ReferenceMean => "W".to_string(),
            },
            frequencies_hz: frequencies_hz.to_vec(),
            timestamps: timestamps
                .iter()
                .map(|t| t.format(CAPTURE_TIMESTAMP_FORMAT).to_string())
                .collect(),
            spectra,
        }
    }
}

#[derive(Error, Debug)]
pub(crate) enum ProcessError {
    #[error(transparent)]
    Measurement(#[from] MeasurementError),

    #[error(transparent)]
    Dsp(#[from] DspError),

    #[error("Couldn't serialise the processed spectra: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

impl From<ProcessError> for crate::HydrogenlineError {
    fn from(e: ProcessError) -> Self {
        let s = e.to_string();
        match e {
            ProcessError::Measurement(e) => Self::from(e),
            ProcessError::Dsp(e) => Self::from(e),
            ProcessError::Json(_) => Self::Generic(s),
            ProcessError::IO(e) => Self::from(e),
        }
    }
}

/// A progress bar that ticks once per window function.
fn window_progress_bar(num_windows: usize, message: &'static str) -> ProgressBar {
    let draw_target = if PROGRESS_BARS.load() {
        ProgressDrawTarget::stdout()
    } else {
        ProgressDrawTarget::hidden()
    };
    let style = ProgressStyle::with_template(
        "{msg:18}: [{wide_bar:.blue}] {pos:2}/{len:2} windows ({elapsed_precise}<{eta_precise})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");
    ProgressBar::with_draw_target(Some(num_windows as u64), draw_target)
        .with_style(style)
        .with_position(0)
        .with_message(message)
}

fn write_output(path: &Path, output: &ProcessedOutput) -> Result<(), ProcessError> {
    let mut f = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut f, output)?;
    f.flush()?;
    Ok(())
}
