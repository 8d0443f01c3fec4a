//! Per-file decode timing shown while a batch is materialized.
//!
//! * [`DecodeTimer`] – collects the duration of each file decode and keeps an **exponential
//!   moving average** over them (`avg ← α·dt + (1–α)·avg`, `α ∈ (0,1]`). Durations are
//!   measured by the decoding thread around its own work, so the average stays a per-file
//!   cost when several workers decode at once.
//! * [`short_duration`] – compact label for a [`Duration`] (`"253µs"`, `"42ms"`, `"3.14s"`).
//! * [`batch_progress`] – progress bar over the files of one batch.
//!
//! This module is enabled only with the `progress` feature.
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone)]
pub struct DecodeTimer {
    alpha: f64,
    avg_secs: Option<f64>,
    last: Duration,
}

impl DecodeTimer {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(f64::EPSILON, 1.0),
            avg_secs: None,
            last: Duration::ZERO,
        }
    }

    /// Account for one decoded file that took `elapsed`.
    pub fn record(&mut self, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        self.avg_secs = Some(match self.avg_secs {
            None => secs,
            Some(avg) => self.alpha * secs + (1.0 - self.alpha) * avg,
        });
        self.last = elapsed;
    }

    pub fn last(&self) -> Duration {
        self.last
    }

    pub fn avg(&self) -> Duration {
        self.avg_secs.map_or(Duration::ZERO, Duration::from_secs_f64)
    }

    /// Message displayed next to the bar.
    pub fn summary(&self) -> String {
        format!(
            "last file {}, avg {}",
            short_duration(self.last()),
            short_duration(self.avg())
        )
    }
}

pub fn short_duration(d: Duration) -> String {
    match d.as_micros() {
        us @ 0..1_000 => format!("{us}µs"),
        us @ 1_000..1_000_000 => format!("{}ms", us / 1_000),
        _ => format!("{:.2}s", d.as_secs_f64()),
    }
}

/// Progress bar over the `n_files` files of batch `batch`.
pub fn batch_progress(batch: usize, n_files: usize) -> ProgressBar {
    let pb = ProgressBar::new(n_files as u64);
    if let Ok(style) =
        ProgressStyle::with_template("batch {prefix} [{bar:40.green/white}] {pos}/{len} | {msg}")
    {
        pb.set_style(style);
    }
    pb.set_prefix(batch.to_string());
    pb
}
