use std::sync::Arc;

use log::{info, warn};

use crate::capture_session::track::TrackLocator;
use crate::configuration::config::Config;
use crate::error_handling::types::ControllerError;
use crate::handoff::channel::HandoffChannel;
use crate::handoff::clipboard_channel::ClipboardChannel;
use crate::handoff::receiver::{consume_on_activation, EntryPoint};
use crate::storage::backend::open_storage;
use crate::storage::storage_trait::TranscriptStore;
use crate::storage::types::TranscriptRecord;
use crate::web_interface::web_server::WebServer;

pub struct Controller {
    pub config: Config,
}

impl Controller {
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Brings up storage, runs the hand-off receiver once, then serves the
    /// web interface until shutdown.
    pub async fn run(&mut self) -> Result<(), ControllerError> {
        let (store, info) = open_storage(&self.config.storage_options()).await?;
        match &info.detail {
            Some(detail) => info!("storage ready: {} ({})", info.backend, detail),
            None => info!("storage ready: {}", info.backend),
        }

        let channel = ClipboardChannel::new();
        self.consume_pending_handoff(store.clone(), &channel).await;

        if self.config.web_enabled {
            let server = WebServer::new(store, self.config.api_token.clone());
            let ip = self.config.bind_ip().map_err(ControllerError::from)?;
            server
                .start(ip, self.config.web_port)
                .await
                .map_err(ControllerError::from)?;
        } else {
            info!("web interface disabled");
        }

        Ok(())
    }

    /// Companion-side receiver turn: if the configured entry point carries
    /// the activation marker, try to consume a captured payload from the
    /// hand-off channel and persist it. All failures are silent; a missing
    /// clipboard grant is the normal case, not an error.
    async fn consume_pending_handoff(
        &self,
        store: Arc<dyn TranscriptStore>,
        channel: &dyn HandoffChannel,
    ) {
        let Some(address) = &self.config.entry_point else {
            return;
        };
        let mut entry = EntryPoint::new(address.clone());
        let Some(capture) = consume_on_activation(&mut entry, channel).await else {
            return;
        };

        // The entry address doubles as the identity carrier: a `v=` query
        // parameter names the video the payload belongs to.
        let locator = TrackLocator::new(address.clone());
        match locator.video_id() {
            Some(video_id) => {
                let mut record = TranscriptRecord::from_capture(
                    &video_id,
                    format!("Captured transcript {}", video_id),
                    String::new(),
                    &capture,
                );
                if let Some(language) = locator.language_code() {
                    record = record.with_language(language);
                }
                match store.save(&record).await {
                    Ok(id) => info!("hand-off transcript persisted as {}", id),
                    Err(e) => warn!("hand-off transcript could not be persisted: {}", e),
                }
            }
            None => {
                info!(
                    "hand-off transcript consumed ({} words) but entry point names no video id; \
                     leaving it unpersisted",
                    capture.word_count
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    use crate::handoff::channel::MemoryChannel;
    use crate::storage::memory_storage::MemoryStorage;

    fn config_with_entry(entry: Option<&str>, dir: &TempDir) -> Config {
        let mut args = vec![
            "transcap".to_string(),
            "--storage-backend".to_string(),
            "memory".to_string(),
            "--storage-path".to_string(),
            dir.path().display().to_string(),
        ];
        if let Some(entry) = entry {
            args.push("--entry-point".to_string());
            args.push(entry.to_string());
        }
        Config::try_parse_from(args).unwrap()
    }

    #[tokio::test]
    async fn handoff_with_video_id_is_persisted() {
        let dir = TempDir::new().unwrap();
        let config = config_with_entry(
            Some("https://app.example/companion?auto=1&v=abc123&lang=en"),
            &dir,
        );
        let controller = Controller::new(config).unwrap();

        let channel = MemoryChannel::new();
        channel
            .send(r#"{"events":[{"segs":[{"utf8":"persisted words"}]}]}"#)
            .await;

        let store = Arc::new(MemoryStorage::new());
        controller
            .consume_pending_handoff(store.clone(), &channel)
            .await;

        let record = store.get("abc123").await.unwrap().unwrap();
        assert_eq!(record.clean_text, "persisted words");
        assert_eq!(record.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn no_entry_point_means_no_consumption() {
        let dir = TempDir::new().unwrap();
        let config = config_with_entry(None, &dir);
        let controller = Controller::new(config).unwrap();

        let channel = MemoryChannel::new();
        channel
            .send(r#"{"events":[{"segs":[{"utf8":"ignored"}]}]}"#)
            .await;

        let store = Arc::new(MemoryStorage::new());
        controller
            .consume_pending_handoff(store.clone(), &channel)
            .await;
        assert_eq!(store.get_stats().await.unwrap().total_count, 0);
    }

    #[tokio::test]
    async fn handoff_without_video_id_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let config = config_with_entry(Some("https://app.example/companion?auto=1"), &dir);
        let controller = Controller::new(config).unwrap();

        let channel = MemoryChannel::new();
        channel
            .send(r#"{"events":[{"segs":[{"utf8":"floating words"}]}]}"#)
            .await;

        let store = Arc::new(MemoryStorage::new());
        controller
            .consume_pending_handoff(store.clone(), &channel)
            .await;
        assert_eq!(store.get_stats().await.unwrap().total_count, 0);
    }
}
