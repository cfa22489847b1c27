use indicatif::{ProgressBar, ProgressStyle};
use octo_lib::{BackoffEvent, Completion, Observer};
use std::{sync::LazyLock, time::Duration};

static STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::with_template("{spinner:.162} {pos}/{len:.238} {bar:.162/238} {wide_msg}")
        .expect("Valid progress bar")
        .progress_chars("━ ━")
});

/// Reports the progress of a run on stderr
#[derive(Debug)]
pub(crate) struct Progress {
    bar: ProgressBar,
}

impl Progress {
    pub(crate) fn new(total: usize, hide_bar: bool) -> Self {
        let len = u64::try_from(total).unwrap_or(u64::MAX);
        let bar = if hide_bar {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(len).with_style(STYLE.clone());
            bar.set_message("Sending requests");
            // report status _at least_ every 500ms
            bar.enable_steady_tick(Duration::from_millis(500));
            bar
        };
        bar.set_length(len);
        Progress { bar }
    }

    pub(crate) fn finish(&self, failed: usize) {
        let message = match failed {
            0 => "Done".to_string(),
            n => format!("Done, {n} failed"),
        };
        self.bar.finish_with_message(message);
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Observer for Progress {
    fn on_backoff(&self, event: &BackoffEvent<'_>) {
        self.bar.set_message(format!(
            "Request #{} failed {} time(s), retrying in {:.1}s",
            event.index,
            event.attempt,
            event.wait.as_secs_f64()
        ));
    }

    fn on_complete(&self, _completion: &Completion) {
        self.bar.inc(1);
    }
}
