use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use showwatch_core::{
    reconcile, BookingLinks, NotificationDetail, NotificationEvent, ReconcileMode, RunPhase,
    RunReport, TargetOutcome, WatchTarget,
};
use showwatch_logging::{watch_debug, watch_error, watch_info, watch_warn};

use crate::dispatch::dispatch;
use crate::extract::ListingExtractor;
use crate::notify::{CallTrigger, ChatNotifier};
use crate::render::PageRenderer;
use crate::store::{StateError, StateStore};

#[derive(Debug, Clone)]
pub struct WatcherSettings {
    pub mode: ReconcileMode,
    pub links: BookingLinks,
    /// Upper bound on acquiring one rendered page.
    pub render_timeout: Duration,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            mode: ReconcileMode::default(),
            links: BookingLinks::default(),
            render_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to load state: {0}")]
    Load(#[from] StateError),
}

/// One observation pass over every tracked target.
pub struct Watcher {
    settings: WatcherSettings,
    store: Box<dyn StateStore>,
    renderer: Box<dyn PageRenderer>,
    extractor: Box<dyn ListingExtractor>,
    chat: Box<dyn ChatNotifier>,
    call: Option<Box<dyn CallTrigger>>,
}

impl Watcher {
    pub fn new(
        settings: WatcherSettings,
        store: Box<dyn StateStore>,
        renderer: Box<dyn PageRenderer>,
        extractor: Box<dyn ListingExtractor>,
        chat: Box<dyn ChatNotifier>,
    ) -> Self {
        Self {
            settings,
            store,
            renderer,
            extractor,
            chat,
            call: None,
        }
    }

    pub fn with_call_trigger(mut self, call: Box<dyn CallTrigger>) -> Self {
        self.call = Some(call);
        self
    }

    /// Loads state, processes targets in order, and saves state once.
    ///
    /// Only a load failure is an error. Per-target failures, delivery
    /// failures, a panic while processing, and a failed save are all
    /// recorded in the returned report instead.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        let started = Instant::now();
        let mut report = RunReport::default();
        enter(&mut report, RunPhase::Idle);
        enter(&mut report, RunPhase::LoadingState);
        let mut targets = match self.store.load() {
            Ok(targets) => targets,
            Err(err) => {
                enter(&mut report, RunPhase::Faulted);
                watch_error!("Error reading targets: {}", err);
                return Err(RunError::Load(err));
            }
        };
        watch_info!(
            "Loaded {} targets (mode={}, template={})",
            targets.len(),
            self.settings.mode,
            self.settings.links.template()
        );

        enter(&mut report, RunPhase::ProcessingTargets);
        let processed = AssertUnwindSafe(self.process_targets(&mut targets, &mut report))
            .catch_unwind()
            .await;
        if let Err(payload) = processed {
            let message = panic_message(payload.as_ref());
            watch_error!(
                "Target processing aborted by panic after {} targets: {}",
                report.targets.len(),
                message
            );
            report.interrupted = Some(message);
        }
        self.renderer.close().await;

        enter(&mut report, RunPhase::PersistingState);
        if let Err(err) = self.store.save(&targets) {
            watch_error!("Error saving final state: {}", err);
            report.persist_error = Some(err.to_string());
        }

        report.duration = started.elapsed();
        enter(&mut report, RunPhase::Done);
        watch_info!(
            "Run completed in {:.2}s: targets={} notifications={} skipped={} settled={} delivery_failures={} persisted={}",
            report.duration.as_secs_f64(),
            report.targets.len(),
            report.events_sent(),
            report.skipped(),
            report.settled(),
            report.delivery_failures(),
            report.persisted()
        );
        Ok(report)
    }

    async fn process_targets(&self, targets: &mut [WatchTarget], report: &mut RunReport) {
        for target in targets.iter_mut() {
            let outcome = self.process_target(target).await;
            report.record(target.name.clone(), outcome);
        }
    }

    async fn process_target(&self, target: &mut WatchTarget) -> TargetOutcome {
        if target.settled {
            watch_debug!("movie={} Already settled, skipping", target.name);
            return TargetOutcome::AlreadySettled;
        }

        let url = self.settings.links.url_for(target);
        let page = match tokio::time::timeout(self.settings.render_timeout, self.renderer.render(&url))
            .await
        {
            Ok(Ok(page)) => page,
            Ok(Err(err)) => {
                watch_error!("movie={} url={} Error rendering page: {}", target.name, url, err);
                return TargetOutcome::Skipped {
                    reason: err.to_string(),
                };
            }
            Err(_) => {
                let reason = format!(
                    "render timed out after {}s",
                    self.settings.render_timeout.as_secs()
                );
                watch_error!("movie={} url={} {}", target.name, url, reason);
                return TargetOutcome::Skipped { reason };
            }
        };

        let observations = match self.extractor.extract(&page.html) {
            Ok(observations) => observations,
            Err(err) => {
                watch_error!("movie={} Error finding theatres: {}", target.name, err);
                return TargetOutcome::Skipped {
                    reason: err.to_string(),
                };
            }
        };
        watch_debug!(
            "movie={} {} theatres listed",
            target.name,
            observations.len()
        );

        let (updated, events) = reconcile(target.clone(), &observations, self.settings.mode, &url);
        *target = updated;
        if events.is_empty() {
            return TargetOutcome::NothingListed;
        }

        let mut delivery_failures = Vec::new();
        for event in &events {
            log_event(event);
            let failures = dispatch(
                event,
                self.settings.mode,
                self.chat.as_ref(),
                self.call.as_deref(),
            )
            .await;
            delivery_failures.extend(failures);
        }

        TargetOutcome::Notified {
            events: events.len(),
            delivery_failures,
        }
    }
}

fn enter(report: &mut RunReport, phase: RunPhase) {
    watch_debug!("Run phase -> {}", phase);
    report.enter(phase);
}

fn log_event(event: &NotificationEvent) {
    match &event.detail {
        NotificationDetail::NewTheatre {
            theatre,
            show_count,
        } => watch_info!(
            "movie={} date={} theatre={} shows={} url={} Found new theatre",
            event.movie,
            event.formatted_date(),
            theatre,
            show_count,
            event.booking_url
        ),
        NotificationDetail::BookingsOpened { theatre_count } => watch_info!(
            "movie={} date={} theatres={} city={} url={} Found movie with available bookings",
            event.movie,
            event.formatted_date(),
            theatre_count,
            event.city,
            event.booking_url
        ),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        watch_warn!("Panic payload of unknown type");
        "unknown panic".to_string()
    }
}
