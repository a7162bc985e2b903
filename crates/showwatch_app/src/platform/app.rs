use std::backtrace::Backtrace;
use std::process::ExitCode;

use anyhow::Context;
use log::LevelFilter;
use showwatch_engine::{
    HttpPageRenderer, JsonStateStore, ListingSelectors, RenderSettings, SelectorExtractor,
    TelegramNotifier, Watcher, WatcherSettings, WebhookCallTrigger,
};
use showwatch_logging::{watch_error, watch_info, watch_warn};

use super::config::Config;
use super::lock::{LockStatus, RunLock};
use super::logging::{self, LogDestination};

/// One scheduled invocation: configure, lock, run every target, exit.
pub fn run_app() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            logging::initialize(LogDestination::Terminal, LevelFilter::Info);
            watch_error!("Configuration error: {}", err);
            return ExitCode::FAILURE;
        }
    };
    logging::initialize(LogDestination::Both(&config.log_file), config.log_level);
    install_panic_hook();

    let _lock = match RunLock::acquire(&config.lock_file, config.lock_stale_after) {
        Ok(LockStatus::Acquired(lock)) => lock,
        Ok(LockStatus::Held { holder, age }) => {
            watch_warn!(
                "Another run (pid {}) holds {:?} for {}s; exiting",
                holder,
                config.lock_file,
                age.as_secs()
            );
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            watch_error!("Failed to acquire lock {:?}: {}", config.lock_file, err);
            return ExitCode::FAILURE;
        }
    };

    match execute(&config) {
        Ok(code) => code,
        Err(err) => {
            watch_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn execute(config: &Config) -> anyhow::Result<ExitCode> {
    let watcher = build_watcher(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    match runtime.block_on(watcher.run()) {
        Ok(report) => {
            if let Some(reason) = &report.interrupted {
                watch_warn!("Run was interrupted: {}", reason);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            watch_error!("Run aborted: {}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn build_watcher(config: &Config) -> anyhow::Result<Watcher> {
    let selectors =
        ListingSelectors::parse(&config.selectors).context("invalid listing selectors")?;
    let renderer = HttpPageRenderer::new(RenderSettings {
        request_timeout: config.render_timeout,
        ..RenderSettings::default()
    })
    .context("failed to build page renderer")?;
    let chat = TelegramNotifier::new(config.telegram.clone())
        .context("failed to build Telegram client")?;

    let settings = WatcherSettings {
        mode: config.mode,
        links: config.links.clone(),
        render_timeout: config.render_timeout,
    };
    let mut watcher = Watcher::new(
        settings,
        Box::new(JsonStateStore::new(&config.state_file)),
        Box::new(renderer),
        Box::new(SelectorExtractor::new(selectors)),
        Box::new(chat),
    );

    match &config.call_webhook {
        Some(endpoint) => {
            let trigger = WebhookCallTrigger::new(endpoint.clone(), config.telegram.timeout)
                .context("invalid IFTTT_WEBHOOK_API")?;
            watcher = watcher.with_call_trigger(Box::new(trigger));
        }
        None if config.mode.triggers_call() => {
            watch_info!("IFTTT_WEBHOOK_API not set; call alerts disabled");
        }
        None => {}
    }
    Ok(watcher)
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        watch_error!("{}\n{}", info, Backtrace::force_capture());
        default_hook(info);
    }));
}
