use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use indicatif::{HumanDuration, MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

pub struct Progress {
    enabled: bool,
    start: Instant,

    // UI
    mp: Option<MultiProgress>,
    stage: ProgressBar,
    pages: ProgressBar,
    requests: ProgressBar,

    // Counters
    pages_total: AtomicU64,
    pages_done: AtomicU64,

    requests_in_flight: AtomicU64,
    requests_ok: AtomicU64,
    requests_failed: AtomicU64,
    rows_received: AtomicU64,

    last_request_label: Mutex<String>,
}

impl Progress {
    pub fn new(enabled: bool) -> Arc<Self> {
        let start = Instant::now();

        let counters = |mp: Option<MultiProgress>,
                        stage: ProgressBar,
                        pages: ProgressBar,
                        requests: ProgressBar| Self {
            enabled,
            start,
            mp,
            stage,
            pages,
            requests,
            pages_total: AtomicU64::new(0),
            pages_done: AtomicU64::new(0),
            requests_in_flight: AtomicU64::new(0),
            requests_ok: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            rows_received: AtomicU64::new(0),
            last_request_label: Mutex::new(String::new()),
        };

        if !enabled {
            return Arc::new(counters(
                None,
                ProgressBar::hidden(),
                ProgressBar::hidden(),
                ProgressBar::hidden(),
            ));
        }

        let mp = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());

        let stage = mp.add(ProgressBar::new_spinner());
        stage.set_style(spinner_style());
        stage.enable_steady_tick(Duration::from_millis(80));
        stage.set_message("starting");

        let pages = mp.add(ProgressBar::new(0));
        if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}") {
            pages.set_style(style.progress_chars("##-"));
        }
        pages.set_message("pages");

        let requests = mp.add(ProgressBar::new_spinner());
        requests.set_style(spinner_style());
        requests.enable_steady_tick(Duration::from_millis(120));
        requests.set_message("store requests");

        Arc::new(counters(Some(mp), stage, pages, requests))
    }

    pub fn set_stage(&self, msg: impl Into<String>) {
        if !self.enabled {
            return;
        }
        self.stage.set_message(msg.into());
    }

    pub fn set_pages_total(&self, total: usize) {
        self.pages_total.store(total as u64, Ordering::Relaxed);
        if self.enabled {
            self.pages.set_length(total as u64);
        }
    }

    pub fn page_done(&self, name: &str) {
        self.pages_done.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.pages.inc(1);
            self.pages.set_message(name.to_string());
        }
    }

    pub fn request_start(&self, table: &str) {
        self.requests_in_flight.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.set_label(format!("{table} ..."));
            self.refresh_requests();
        }
    }

    pub fn request_ok(&self, table: &str, rows: usize) {
        self.requests_in_flight.fetch_sub(1, Ordering::Relaxed);
        self.requests_ok.fetch_add(1, Ordering::Relaxed);
        self.rows_received.fetch_add(rows as u64, Ordering::Relaxed);
        if self.enabled {
            self.set_label(format!("{table} ok ({rows} rows)"));
            self.refresh_requests();
        }
    }

    pub fn request_err(&self, table: &str) {
        self.requests_in_flight.fetch_sub(1, Ordering::Relaxed);
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.set_label(format!("{table} failed"));
            self.refresh_requests();
        }
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        self.refresh_requests();
        self.stage.finish_with_message("done");
        self.pages.finish_and_clear();
        self.requests.finish_and_clear();
        if let Some(mp) = &self.mp {
            let _ = mp.println(format!("Done in {}", HumanDuration(self.start.elapsed())));
        }
    }

    fn set_label(&self, label: String) {
        if let Ok(mut last) = self.last_request_label.lock() {
            *last = label;
        }
    }

    fn refresh_requests(&self) {
        let in_flight = self.requests_in_flight.load(Ordering::Relaxed);
        let ok = self.requests_ok.load(Ordering::Relaxed);
        let failed = self.requests_failed.load(Ordering::Relaxed);
        let rows = self.rows_received.load(Ordering::Relaxed);
        let pages_done = self.pages_done.load(Ordering::Relaxed);
        let pages_total = self.pages_total.load(Ordering::Relaxed);

        let last = self
            .last_request_label
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        self.requests.set_message(format!(
            "store: ok {ok} | failed {failed} | in-flight {in_flight} | rows {rows} | pages {pages_done}/{pages_total} | {last}"
        ));
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} {msg}  [{elapsed_precise}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
