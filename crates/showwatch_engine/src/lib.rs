//! Showwatch engine: IO collaborators and the run orchestrator.
mod decode;
mod dispatch;
mod extract;
mod notify;
mod persist;
mod render;
mod store;
mod types;
mod watcher;

pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use dispatch::dispatch;
pub use extract::{
    ExtractError, ListingExtractor, ListingSelectors, SelectorConfig, SelectorExtractor,
};
pub use notify::{
    CallTrigger, ChatNotifier, DeliveryError, TelegramNotifier, TelegramSettings,
    WebhookCallTrigger, DEFAULT_TELEGRAM_API_BASE,
};
pub use persist::{AtomicFileWriter, PersistError};
pub use render::{HttpPageRenderer, PageRenderer, RenderSettings};
pub use store::{JsonStateStore, StateError, StateStore};
pub use types::{FailureKind, RenderError, RenderedPage};
pub use watcher::{RunError, Watcher, WatcherSettings};
