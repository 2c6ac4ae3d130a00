use evodesign::engine::progress::{Progress, ProgressCallback};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::warn;

const SPINNER_TICK: Duration = Duration::from_millis(80);

/// Bar of the phase that is currently running.
struct PhaseBar {
    name: &'static str,
    bar: ProgressBar,
    started: Instant,
}

/// Renders design progress on stderr while the engine runs on a blocking thread.
pub struct UiManager {
    mp: MultiProgress,
    phase: Option<PhaseBar>,
    events: mpsc::Receiver<Progress>,
    shutdown: watch::Receiver<bool>,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<Progress>, watch::Sender<bool>) {
        Self::with_draw_target(ProgressDrawTarget::stderr_with_hz(12))
    }

    fn with_draw_target(
        target: ProgressDrawTarget,
    ) -> (Self, mpsc::Sender<Progress>, watch::Sender<bool>) {
        let (event_sender, events) = mpsc::channel(1024);
        let (shutdown_sender, shutdown) = watch::channel(false);
        let manager = Self {
            mp: MultiProgress::with_draw_target(target),
            phase: None,
            events,
            shutdown,
        };
        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle(event),
                result = self.shutdown.changed() => {
                    if result.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        while let Ok(event) = self.events.try_recv() {
            self.handle(event);
        }
        if let Some(phase) = self.phase.take() {
            phase.bar.finish_and_clear();
        }
    }

    fn handle(&mut self, event: Progress) {
        match event {
            Progress::PhaseStart { name } => {
                if let Some(previous) = self.phase.take() {
                    previous.bar.finish_and_clear();
                }
                let bar = self.mp.add(ProgressBar::new_spinner());
                bar.set_style(spinner_style());
                bar.enable_steady_tick(SPINNER_TICK);
                bar.set_message(name);
                self.phase = Some(PhaseBar {
                    name,
                    bar,
                    started: Instant::now(),
                });
            }
            Progress::PhaseFinish => {
                if let Some(phase) = self.phase.take() {
                    phase.bar.finish_and_clear();
                    self.print(format!(
                        "✓ {} ({:.1}s)",
                        phase.name,
                        phase.started.elapsed().as_secs_f64()
                    ));
                }
            }
            Progress::TaskStart { total_steps } => {
                if let Some(phase) = &self.phase {
                    phase.bar.disable_steady_tick();
                    phase.bar.set_style(bar_style());
                    phase.bar.reset();
                    phase.bar.set_length(total_steps);
                }
            }
            Progress::TaskIncrement => {
                if let Some(phase) = &self.phase {
                    phase.bar.inc(1);
                }
            }
            Progress::TaskFinish => {
                if let Some(phase) = &self.phase {
                    phase.bar.finish();
                }
            }
            Progress::StepReady {
                sample,
                step,
                fraction,
            } => {
                if let Some(phase) = &self.phase {
                    phase.bar.set_message(format!(
                        "{} · design {} step {} ({:.0}%)",
                        phase.name,
                        sample + 1,
                        step + 1,
                        fraction * 100.0
                    ));
                }
            }
            Progress::StatusUpdate { text } => match &self.phase {
                Some(phase) => phase.bar.set_message(format!("{} · {}", phase.name, text)),
                None => self.print(format!("» {text}")),
            },
            Progress::Message(text) => self.print(format!("  {text}")),
        }
    }

    fn print(&self, line: String) {
        if let Err(e) = self.mp.println(line) {
            warn!("Failed to write progress line: {}", e);
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<40} [{bar:30.cyan/blue}] {pos}/{len} steps")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸ ")
}

/// Forwards engine progress into the UI channel without blocking the engine thread.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<Progress>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<Progress>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(progress) {
                warn!("Dropped progress update: {}", e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden_manager() -> UiManager {
        UiManager::with_draw_target(ProgressDrawTarget::hidden()).0
    }

    fn message(manager: &UiManager) -> String {
        manager.phase.as_ref().unwrap().bar.message()
    }

    #[test]
    fn phase_start_replaces_the_running_phase() {
        let mut manager = hidden_manager();
        manager.handle(Progress::PhaseStart { name: "Encoding" });
        manager.handle(Progress::PhaseStart { name: "Generation" });

        let phase = manager.phase.as_ref().unwrap();
        assert_eq!(phase.name, "Generation");
        assert_eq!(phase.bar.message(), "Generation");
    }

    #[test]
    fn phase_finish_clears_the_bar() {
        let mut manager = hidden_manager();
        manager.handle(Progress::PhaseStart { name: "Encoding" });
        manager.handle(Progress::PhaseFinish);
        assert!(manager.phase.is_none());

        // A stray finish is ignored.
        manager.handle(Progress::PhaseFinish);
    }

    #[test]
    fn each_design_restarts_the_step_bar() {
        let mut manager = hidden_manager();
        manager.handle(Progress::PhaseStart { name: "Generation" });

        manager.handle(Progress::TaskStart { total_steps: 4 });
        manager.handle(Progress::TaskIncrement);
        manager.handle(Progress::TaskIncrement);
        manager.handle(Progress::TaskFinish);
        assert!(manager.phase.as_ref().unwrap().bar.is_finished());

        manager.handle(Progress::TaskStart { total_steps: 4 });
        manager.handle(Progress::TaskIncrement);
        let bar = &manager.phase.as_ref().unwrap().bar;
        assert!(!bar.is_finished());
        assert_eq!(bar.length(), Some(4));
        assert_eq!(bar.position(), 1);
    }

    #[test]
    fn step_ready_shows_design_and_step_from_one() {
        let mut manager = hidden_manager();
        manager.handle(Progress::PhaseStart { name: "Generation" });
        manager.handle(Progress::StepReady {
            sample: 1,
            step: 9,
            fraction: 0.25,
        });
        assert_eq!(message(&manager), "Generation · design 2 step 10 (25%)");
    }

    #[test]
    fn status_update_labels_the_running_phase() {
        let mut manager = hidden_manager();
        manager.handle(Progress::PhaseStart { name: "Generation" });
        manager.handle(Progress::StatusUpdate {
            text: "Generating design 1/2".into(),
        });
        assert_eq!(message(&manager), "Generation · Generating design 1/2");
    }

    #[test]
    fn events_outside_a_phase_are_printed() {
        let mut manager = hidden_manager();
        manager.handle(Progress::StatusUpdate {
            text: "Design cycle 1/2".into(),
        });
        manager.handle(Progress::Message("Cycle 0: selected MKAA (score 1.000).".into()));
        manager.handle(Progress::TaskIncrement);
        assert!(manager.phase.is_none());
    }

    #[tokio::test]
    async fn callback_forwards_into_the_channel() {
        let (sender, mut receiver) = mpsc::channel(1);
        let callback = CliProgressHandler::new(sender).get_callback();

        callback(Progress::PhaseStart { name: "Redesign" });
        // Full channel: the update is dropped rather than blocking.
        callback(Progress::PhaseFinish);

        assert!(matches!(
            receiver.recv().await,
            Some(Progress::PhaseStart { name: "Redesign" })
        ));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn run_drains_queued_events_then_stops() {
        let (manager, sender, shutdown) =
            UiManager::with_draw_target(ProgressDrawTarget::hidden());
        sender
            .send(Progress::PhaseStart { name: "Generation" })
            .await
            .unwrap();
        shutdown.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), tokio::spawn(manager.run()))
            .await
            .expect("UI manager did not stop")
            .unwrap();
    }
}
