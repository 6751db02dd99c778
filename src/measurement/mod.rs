// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Measurement runs: the PSD batches of every window function, the times they
//! were captured and the reference they should be calibrated against.

mod error;
mod settings;

pub use error::MeasurementError;
pub use settings::{CaptureSettings, MeasurementSettings, ReferenceSettings, ReferenceWarning};

use std::path::Path;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use log::{debug, warn};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    constants::CAPTURE_TIMESTAMP_FORMAT,
    dsp::{self, batch_dbm_to_watts, batch_watts_to_dbm},
    window::WindowFunction,
};

/// A reference PSD for each window function, captured while the antenna was
/// not pointed at anything interesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub settings: ReferenceSettings,
    pub psd: IndexMap<WindowFunction, Vec<f64>>,
}

/// One averaged capture. The name is the capture's timestamp, e.g.
/// "20240314_21_05_33", optionally with a file extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub name: String,
    pub psd: IndexMap<WindowFunction, Vec<f64>>,
}

/// The serialisable form of a measurement run, as handed over by whatever did
/// the acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub settings: MeasurementSettings,
    pub captures: Vec<Capture>,
}

/// Parse the timestamp that a capture is named with.
pub fn parse_capture_timestamp(name: &str) -> Result<NaiveDateTime, MeasurementError> {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    NaiveDateTime::parse_from_str(stem, CAPTURE_TIMESTAMP_FORMAT).map_err(|err| {
        MeasurementError::BadTimestamp {
            name: name.to_string(),
            err,
        }
    })
}

/// A validated measurement run. Every window function in the settings has a
/// PSD batch with one row per timestamp and `settings.bins` columns, in watts.
#[derive(Debug, Clone)]
pub struct Measurement {
    settings: MeasurementSettings,
    timestamps: Vec<NaiveDateTime>,
    psd: IndexMap<WindowFunction, Array2<f64>>,
    reference: Option<Reference>,
    warnings: Vec<ReferenceWarning>,
}

impl Measurement {
    pub fn new(
        settings: MeasurementSettings,
        timestamps: Vec<NaiveDateTime>,
        mut psd: IndexMap<WindowFunction, Array2<f64>>,
        reference: Option<Reference>,
    ) -> Result<Measurement, MeasurementError> {
        for (i, window) in settings.windows.iter().enumerate() {
            if settings.windows[..i].contains(window) {
                return Err(MeasurementError::DuplicateWindow(*window));
            }
        }

        let mut ordered = IndexMap::with_capacity(settings.windows.len());
        for &window in settings.windows.iter() {
            let batch =
                psd.shift_remove(&window)
                    .ok_or_else(|| MeasurementError::MissingWindow {
                        window,
                        thing: "the measurement data".to_string(),
                    })?;
            let (num_rows, num_bins) = batch.dim();
            if num_bins != settings.bins {
                return Err(MeasurementError::BadShape {
                    thing: format!("the spectra of the {window} PSD batch"),
                    expected: settings.bins,
                    actual: num_bins,
                });
            }
            if num_rows != timestamps.len() {
                return Err(MeasurementError::BadShape {
                    thing: format!("the {window} PSD batch (one spectrum per timestamp)"),
                    expected: timestamps.len(),
                    actual: num_rows,
                });
            }
            ordered.insert(window, batch);
        }
        for window in psd.keys() {
            debug!("Ignoring PSD data for the {window} window; it isn't in the measurement settings");
        }

        let mut warnings = vec![];
        match (&settings.reference, &reference) {
            (Some(name), None) => {
                return Err(MeasurementError::ReferenceNotSupplied(name.clone()))
            }
            (_, Some(reference)) => {
                if let Some(warning) = settings.check_reference(&reference.settings)? {
                    warn!("{warning}");
                    warnings.push(warning);
                }
                for &window in settings.windows.iter() {
                    let reference_psd = reference
                        .psd
                        .get(&window)
                        .ok_or(MeasurementError::ReferenceMissingWindow(window))?;
                    if reference_psd.len() != settings.bins {
                        return Err(MeasurementError::BadShape {
                            thing: format!("the {window} reference PSD"),
                            expected: settings.bins,
                            actual: reference_psd.len(),
                        });
                    }
                }
            }
            (None, None) => (),
        }

        Ok(Measurement {
            settings,
            timestamps,
            psd: ordered,
            reference,
            warnings,
        })
    }

    /// Assemble a measurement from individual captures. The captures are put
    /// into acquisition order by their timestamps.
    pub fn from_captures(
        settings: MeasurementSettings,
        captures: Vec<Capture>,
        reference: Option<Reference>,
    ) -> Result<Measurement, MeasurementError> {
        if captures.is_empty() {
            return Err(MeasurementError::NoCaptures);
        }

        let mut captures = captures
            .into_iter()
            .map(|c| Ok((parse_capture_timestamp(&c.name)?, c)))
            .collect::<Result<Vec<_>, MeasurementError>>()?;
        captures.sort_by_key(|(timestamp, _)| *timestamp);

        let mut psd = IndexMap::with_capacity(settings.windows.len());
        for &window in settings.windows.iter() {
            let mut batch = Array2::zeros((captures.len(), settings.bins));
            for ((_, capture), mut row) in captures.iter().zip(batch.outer_iter_mut()) {
                let spectrum =
                    capture
                        .psd
                        .get(&window)
                        .ok_or_else(|| MeasurementError::MissingWindow {
                            window,
                            thing: format!("capture {}", capture.name),
                        })?;
                if spectrum.len() != settings.bins {
                    return Err(MeasurementError::BadShape {
                        thing: format!("the {window} PSD of capture {}", capture.name),
                        expected: settings.bins,
                        actual: spectrum.len(),
                    });
                }
                row.assign(&ArrayView1::from(spectrum.as_slice()));
            }
            psd.insert(window, batch);
        }

        let timestamps = captures.into_iter().map(|(t, _)| t).collect();
        Measurement::new(settings, timestamps, psd, reference)
    }

    pub fn from_record(
        record: MeasurementRecord,
        reference: Option<Reference>,
    ) -> Result<Measurement, MeasurementError> {
        Measurement::from_captures(record.settings, record.captures, reference)
    }

    pub fn settings(&self) -> &MeasurementSettings {
        &self.settings
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// The timestamps of the rows left after time smoothing with
    /// `time_window_size`. Smoothing drops the trailing rows.
    pub fn smoothed_timestamps(&self, time_window_size: usize) -> &[NaiveDateTime] {
        let num_rows = if time_window_size <= 1 {
            self.timestamps.len()
        } else {
            self.timestamps.len().saturating_sub(time_window_size)
        };
        &self.timestamps[..num_rows]
    }

    pub fn num_measurements(&self) -> usize {
        self.timestamps.len()
    }

    /// The PSD batches \[W\], in the order of the settings' windows.
    pub fn psd(&self) -> &IndexMap<WindowFunction, Array2<f64>> {
        &self.psd
    }

    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    /// The reference PSD for a window \[W\], if there's a reference.
    pub fn reference_psd(&self, window: WindowFunction) -> Option<ArrayView1<f64>> {
        self.reference
            .as_ref()
            .and_then(|r| r.psd.get(&window))
            .map(|psd| ArrayView1::from(psd.as_slice()))
    }

    /// Anything suspicious found while validating the reference.
    pub fn warnings(&self) -> &[ReferenceWarning] {
        &self.warnings
    }

    pub fn psd_dbm(&self) -> IndexMap<WindowFunction, Array2<f64>> {
        self.psd
            .iter()
            .map(|(&window, batch)| (window, batch_watts_to_dbm(batch.view())))
            .collect()
    }

    /// Replace the PSD batches with ones given in dBm. Every window must be
    /// given, with the same shape as the current data.
    pub fn set_psd_dbm(
        &mut self,
        mut psd: IndexMap<WindowFunction, Array2<f64>>,
    ) -> Result<(), MeasurementError> {
        // Validate everything before touching anything.
        for (&window, batch) in &self.psd {
            let new = psd
                .get(&window)
                .ok_or_else(|| MeasurementError::MissingWindow {
                    window,
                    thing: "the new dBm data".to_string(),
                })?;
            if new.dim() != batch.dim() {
                return Err(MeasurementError::BadShape {
                    thing: format!("the new {window} dBm batch"),
                    expected: batch.len(),
                    actual: new.len(),
                });
            }
        }

        for (window, batch) in self.psd.iter_mut() {
            if let Some(new) = psd.shift_remove(window) {
                *batch = batch_dbm_to_watts(new.view());
            }
        }
        Ok(())
    }

    pub fn reference_psd_dbm(&self) -> Option<IndexMap<WindowFunction, Array1<f64>>> {
        self.reference.as_ref().map(|reference| {
            reference
                .psd
                .iter()
                .map(|(&window, psd)| {
                    (window, batch_watts_to_dbm(ArrayView1::from(psd.as_slice())))
                })
                .collect()
        })
    }

    /// Run the whole calibration pipeline on the PSD batch of one window. The
    /// window's reference PSD is used if there is one, otherwise a reference
    /// is derived from the batch.
    pub fn spectrum_for(
        &self,
        window: WindowFunction,
        freq_window_size: usize,
        time_window_size: usize,
    ) -> Result<Array2<f64>, MeasurementError> {
        let batch = self
            .psd
            .get(&window)
            .ok_or_else(|| MeasurementError::MissingWindow {
                window,
                thing: "this measurement".to_string(),
            })?;
        let processed = dsp::process(
            batch.clone(),
            freq_window_size,
            time_window_size,
            self.reference_psd(window),
        )?;
        Ok(processed)
    }

    /// [`Measurement::spectrum_for`] for every window.
    pub fn spectra(
        &self,
        freq_window_size: usize,
        time_window_size: usize,
    ) -> Result<IndexMap<WindowFunction, Array2<f64>>, MeasurementError> {
        self.psd
            .keys()
            .map(|&window| {
                self.spectrum_for(window, freq_window_size, time_window_size)
                    .map(|batch| (window, batch))
            })
            .collect()
    }

    /// Normalise the PSD batch of one window by the reference PSD's shape.
    /// This needs a reference.
    pub fn waterfall_for(
        &self,
        window: WindowFunction,
        normalise: bool,
    ) -> Result<Array2<f64>, MeasurementError> {
        let reference = self
            .reference_psd(window)
            .ok_or(MeasurementError::NoReference)?;
        let batch = self
            .psd
            .get(&window)
            .ok_or_else(|| MeasurementError::MissingWindow {
                window,
                thing: "this measurement".to_string(),
            })?;
        let normalised = dsp::normalise_to_reference(batch.clone(), reference, normalise)?;
        Ok(normalised)
    }

    /// [`Measurement::waterfall_for`] for every window.
    pub fn waterfall(
        &self,
        normalise: bool,
    ) -> Result<IndexMap<WindowFunction, Array2<f64>>, MeasurementError> {
        self.psd
            .keys()
            .map(|&window| {
                self.waterfall_for(window, normalise)
                    .map(|batch| (window, batch))
            })
            .collect()
    }
}
