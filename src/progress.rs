// src/progress.rs
//
// Progress reporting for long block-writing runs.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::info;

use crate::constants::DEFAULT_PROGRESS_INTERVAL;

/// How progress is surfaced while a file is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressOptions {
    /// Log a progress line every `interval` blocks
    pub interval: u64,
    /// Also draw an interactive progress bar on stderr
    pub show_bar: bool,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_PROGRESS_INTERVAL,
            show_bar: false,
        }
    }
}

/// True when block `index` (0-based) should produce a progress line.
pub fn is_report_point(index: u64, interval: u64) -> bool {
    interval > 0 && index > 0 && index % interval == 0
}

/// Bar layout; `{msg}` carries the completion line once the file is done.
fn bar_template(label: &str) -> String {
    format!(
        "{}: {{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} blocks ({{per_sec}}, ETA: {{eta}}) {{msg}}",
        label
    )
}

/// Tracks blocks written for one output file.
pub struct ProgressReporter {
    interval: u64,
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Create a reporter for a file of `total_blocks` blocks
    pub fn new(label: &str, total_blocks: u64, options: ProgressOptions) -> Self {
        let bar = options.show_bar.then(|| {
            let pb = ProgressBar::new(total_blocks);
            if let Ok(style) = ProgressStyle::with_template(&bar_template(label)) {
                pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
            }
            pb
        });

        Self {
            interval: options.interval,
            bar,
        }
    }

    /// Reporter that only logs, never draws
    pub fn quiet(interval: u64) -> Self {
        Self { interval, bar: None }
    }

    /// Record that block `index` has been written.
    ///
    /// Returns whether a progress line was emitted for this block.
    pub fn block_written(&self, index: u64) -> bool {
        if let Some(pb) = &self.bar {
            pb.set_position(index + 1);
        }
        if is_report_point(index, self.interval) {
            info!("Written {} blocks...", index);
            true
        } else {
            false
        }
    }

    /// Close out the bar and log throughput for the finished file.
    ///
    /// Returns the completion line that was logged.
    pub fn finish(&self, label: &str, total_bytes: u64, duration: Duration) -> String {
        let secs = duration.as_secs_f64();
        let throughput_mbps = if secs > 0.0 {
            (total_bytes as f64 / 1_048_576.0) / secs
        } else {
            0.0
        };
        let message = format!(
            "{} complete! {:.2} MB in {} ({:.2} MB/s)",
            label,
            total_bytes as f64 / 1_048_576.0,
            humantime::format_duration(Duration::from_millis(duration.as_millis() as u64)),
            throughput_mbps
        );

        if let Some(pb) = &self.bar {
            pb.finish_with_message(message.clone());
        }
        info!("{}", message);
        message
    }
}
