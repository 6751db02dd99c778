// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use indexmap::IndexMap;
use log::{debug, info};

use super::{write_output, ProcessError, ProcessedBatch, ProcessedOutput};
use crate::{
    dsp::{peak_power, BaselinePolicy},
    measurement::Measurement,
};

/// Normalise every window of a measurement by its reference, for a waterfall
/// of all measurements.
pub(crate) struct WaterfallParams {
    /// This must have a reference.
    pub(crate) measurement: Measurement,

    /// Subtract each spectrum's mean power after normalising.
    pub(crate) normalise: bool,

    /// The fraction of the largest normalised power used for colour scales.
    pub(crate) peak: f64,

    pub(crate) output: PathBuf,
}

impl WaterfallParams {
    pub(crate) fn run(&self) -> Result<(), ProcessError> {
        let output = self.process()?;
        write_output(&self.output, &output)?;
        info!("Wrote {}", self.output.display());
        Ok(())
    }

    pub(crate) fn process(&self) -> Result<ProcessedOutput, ProcessError> {
        let measurement = &self.measurement;

        let progress =
            super::window_progress_bar(measurement.psd().len(), "Normalising spectra");
        let mut spectra = IndexMap::with_capacity(measurement.psd().len());
        for &window in measurement.psd().keys() {
            debug!("Normalising the {window} PSD batch");
            let batch = measurement.waterfall_for(window, self.normalise)?;
            let color_scale_max = peak_power(batch.view(), self.peak)?;
            spectra.insert(window, ProcessedBatch::new(batch.view(), color_scale_max));
            progress.inc(1);
        }
        progress.abandon_with_message("Normalised spectra");

        Ok(ProcessedOutput::new(
            BaselinePolicy::ReferenceMean,
            measurement.settings().frequencies().view(),
            measurement.timestamps(),
            spectra,
        ))
    }
}
