use std::collections::HashMap;
use std::sync::RwLock;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use localsend_core::{BatchState, LocalBatch, ProgressEvent, TransferSubscriber};

/// Renders one progress bar per uploaded file.
pub struct SendProgress {
    verbose: bool,
    mp: MultiProgress,
    names: HashMap<String, String>,
    bars: RwLock<HashMap<String, ProgressBar>>,
}

impl SendProgress {
    pub fn new(batch: &LocalBatch, verbose: bool) -> Self {
        let names = batch
            .ids()
            .filter_map(|id| {
                batch.get(id).map(|f| (id.to_string(), f.name.clone()))
            })
            .collect();
        Self {
            verbose,
            mp: MultiProgress::new(),
            names,
            bars: RwLock::new(HashMap::new()),
        }
    }

    fn name<'a>(&'a self, file_id: &'a str) -> &'a str {
        self.names
            .get(file_id)
            .map(String::as_str)
            .unwrap_or(file_id)
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
    }
}

impl TransferSubscriber for SendProgress {
    fn notify_skipped(&self, file_ids: &[String]) {
        let _ = self.mp.println("Receiver declined:");
        for id in file_ids {
            let _ = self.mp.println(format!("   {}", self.name(id)));
        }
    }

    fn notify_progress(&self, event: ProgressEvent) {
        let mut bars = match self.bars.write() {
            Ok(bars) => bars,
            Err(e) => {
                eprintln!("Error accessing progress bars: {}", e);
                return;
            }
        };
        let name = self.name(&event.file_id).to_string();
        let pb = bars.entry(event.file_id.clone()).or_insert_with(|| {
            let pb = self.mp.add(ProgressBar::new(event.total));
            pb.set_style(Self::bar_style());
            pb.set_message(format!("Sending {}", name));
            pb
        });

        pb.set_position(event.sent);
        if event.sent == event.total {
            pb.finish_with_message(format!("[DONE] Sent {}", name));
        }
    }

    fn notify_state(&self, state: &BatchState) {
        if self.verbose {
            let _ = self.mp.println(format!("[DEBUG] {:?}", state));
        }
    }
}
