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

/// Run the full calibration pipeline over every window of a measurement.
pub(crate) struct SpectraParams {
    pub(crate) measurement: Measurement,

    /// The moving-median window across frequency \[bins\].
    pub(crate) freq_window_size: usize,

    /// The moving-median window across time \[measurements\].
    pub(crate) time_window_size: usize,

    /// The fraction of the largest corrected power used for colour scales.
    pub(crate) peak: f64,

    pub(crate) output: PathBuf,
}

impl SpectraParams {
    pub(crate) fn run(&self) -> Result<(), ProcessError> {
        let output = self.process()?;
        write_output(&self.output, &output)?;
        info!("Wrote {}", self.output.display());
        Ok(())
    }

    pub(crate) fn process(&self) -> Result<ProcessedOutput, ProcessError> {
        let measurement = &self.measurement;
        let settings = measurement.settings();

        let progress = super::window_progress_bar(measurement.psd().len(), "Processing spectra");
        let mut spectra = IndexMap::with_capacity(measurement.psd().len());
        let mut num_bins = settings.bins;
        for &window in measurement.psd().keys() {
            debug!("Processing the {window} PSD batch");
            let batch =
                measurement.spectrum_for(window, self.freq_window_size, self.time_window_size)?;
            let color_scale_max = peak_power(batch.view(), self.peak)?;
            num_bins = batch.ncols();
            spectra.insert(window, ProcessedBatch::new(batch.view(), color_scale_max));
            progress.inc(1);
        }
        progress.abandon_with_message("Processed spectra");

        Ok(ProcessedOutput::new(
            BaselinePolicy::Pipeline,
            settings.frequencies_for(num_bins).view(),
            measurement.smoothed_timestamps(self.time_window_size),
            spectra,
        ))
    }
}
