use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Frames-completed / total-frames bar on stderr. Falls back to a spinner when
/// the container does not report a frame count.
pub struct FrameProgress {
    bar: ProgressBar,
}

impl FrameProgress {
    pub fn new(total: usize) -> Self {
        let bar = if total > 0 {
            let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
            let style = ProgressStyle::with_template("{bar:40} {pos}/{len} frames ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar
        } else {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            let style = ProgressStyle::with_template("{spinner} {pos} frames")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            bar.set_style(style);
            bar
        };
        Self { bar }
    }

    pub fn update(&self, done: usize) {
        self.bar.set_position(done as u64);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_completed_frames() {
        let progress = FrameProgress::new(10);
        progress.update(3);
        assert_eq!(progress.bar.position(), 3);
        assert_eq!(progress.bar.length(), Some(10));

        let spinner = FrameProgress::new(0);
        spinner.update(7);
        assert_eq!(spinner.bar.position(), 7);
        assert_eq!(spinner.bar.length(), None);
    }
}
