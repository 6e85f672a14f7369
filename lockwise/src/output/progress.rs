use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Create the per-signature verification progress bar.
///
/// In test mode, returns a hidden progress bar to avoid polluting test output.
#[must_use]
pub fn verification_bar(total_signatures: u64) -> ProgressBar {
    if cfg!(test) {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::with_draw_target(
        Some(total_signatures),
        ProgressDrawTarget::stderr_with_hz(20),
    );
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} signatures ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_message("verifying...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.tick();
    pb
}
