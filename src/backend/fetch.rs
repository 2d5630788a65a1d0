//! Background fetch workers. Each request runs on its own short-lived
//! thread and re-enters the UI loop as a tagged `AppEvent`; the UI thread
//! never blocks on the network.

use std::{path::PathBuf, sync::mpsc::Sender, sync::Arc, thread};

use crate::{
    domain::{
        conversation::Conversation,
        events::{AppEvent, MediaIntent},
        message::MessageKind,
    },
    usecases::contracts::{ContactsFetcher, HistoryFetcher, MediaFetcher, UploadDispatcher},
};

use super::rest::RestClient;

pub struct HttpHistoryFetcher {
    client: Arc<RestClient>,
    events_tx: Sender<AppEvent>,
}

impl HttpHistoryFetcher {
    pub fn new(client: Arc<RestClient>, events_tx: Sender<AppEvent>) -> Self {
        Self { client, events_tx }
    }
}

impl HistoryFetcher for HttpHistoryFetcher {
    fn request(&self, conversation: Conversation) {
        let client = Arc::clone(&self.client);
        let events_tx = self.events_tx.clone();
        thread::spawn(move || {
            let result = match conversation {
                Conversation::Broadcast => client.broadcast_history(),
                Conversation::Direct(peer_id) => client.direct_history(peer_id),
            };
            let _ = events_tx.send(AppEvent::HistoryLoaded {
                conversation,
                result,
            });
        });
    }
}

pub struct HttpContactsFetcher {
    client: Arc<RestClient>,
    events_tx: Sender<AppEvent>,
}

impl HttpContactsFetcher {
    pub fn new(client: Arc<RestClient>, events_tx: Sender<AppEvent>) -> Self {
        Self { client, events_tx }
    }
}

impl ContactsFetcher for HttpContactsFetcher {
    fn request(&self) {
        let client = Arc::clone(&self.client);
        let events_tx = self.events_tx.clone();
        thread::spawn(move || {
            let _ = events_tx.send(AppEvent::ContactsLoaded {
                result: client.contacts(),
            });
        });
    }
}

pub struct HttpUploadDispatcher {
    client: Arc<RestClient>,
    events_tx: Sender<AppEvent>,
}

impl HttpUploadDispatcher {
    pub fn new(client: Arc<RestClient>, events_tx: Sender<AppEvent>) -> Self {
        Self { client, events_tx }
    }
}

impl UploadDispatcher for HttpUploadDispatcher {
    fn dispatch(
        &self,
        conversation: Conversation,
        recipient_id: Option<i64>,
        kind: MessageKind,
        path: PathBuf,
    ) {
        let client = Arc::clone(&self.client);
        let events_tx = self.events_tx.clone();
        thread::spawn(move || {
            let result = client.upload(recipient_id, kind, &path);
            let _ = events_tx.send(AppEvent::UploadFinished {
                conversation,
                result,
            });
        });
    }
}

pub struct HttpMediaFetcher {
    client: Arc<RestClient>,
    events_tx: Sender<AppEvent>,
}

impl HttpMediaFetcher {
    pub fn new(client: Arc<RestClient>, events_tx: Sender<AppEvent>) -> Self {
        Self { client, events_tx }
    }
}

impl MediaFetcher for HttpMediaFetcher {
    fn request(&self, message_id: i64, media_url: &str, intent: MediaIntent) {
        let client = Arc::clone(&self.client);
        let events_tx = self.events_tx.clone();
        let media_url = media_url.to_owned();
        thread::spawn(move || {
            let result = client.download_media(&media_url);
            let _ = events_tx.send(AppEvent::MediaReady {
                message_id,
                intent,
                result,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, time::Duration};

    use super::*;
    use crate::domain::events::FetchError;

    fn unreachable_client() -> Arc<RestClient> {
        // Port 9 (discard) refuses connections on loopback.
        Arc::new(RestClient::new("http://127.0.0.1:9", PathBuf::from("/tmp")))
    }

    #[test]
    fn history_failure_arrives_tagged_with_its_conversation() {
        let (events_tx, events_rx) = mpsc::channel();
        let fetcher = HttpHistoryFetcher::new(unreachable_client(), events_tx);

        fetcher.request(Conversation::Direct(7));

        match events_rx.recv_timeout(Duration::from_secs(20)) {
            Ok(AppEvent::HistoryLoaded {
                conversation,
                result,
            }) => {
                assert_eq!(conversation, Conversation::Direct(7));
                assert_eq!(result, Err(FetchError::Unavailable));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn contacts_failure_reenters_the_queue() {
        let (events_tx, events_rx) = mpsc::channel();
        let fetcher = HttpContactsFetcher::new(unreachable_client(), events_tx);

        fetcher.request();

        match events_rx.recv_timeout(Duration::from_secs(20)) {
            Ok(AppEvent::ContactsLoaded { result }) => {
                assert_eq!(result, Err(FetchError::Unavailable));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
