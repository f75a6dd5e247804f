//! Server-sent-event fan-out for newly created enquiries.

use crate::models::EnquiryNotification;
use actix_web::web::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, mpsc};

/// 每个订阅者的缓冲帧数，满了就丢弃该帧
const CLIENT_BUFFER: usize = 32;

pub const KEEP_ALIVE_FRAME: &str = ":keep-alive\n\n";

#[derive(Clone, Default)]
pub struct EnquiryNotifier {
    clients: Arc<RwLock<HashMap<u64, mpsc::Sender<Bytes>>>>,
    next_id: Arc<AtomicU64>,
}

pub fn event_frame(notification: &EnquiryNotification) -> serde_json::Result<String> {
    let data = serde_json::to_string(notification)?;
    Ok(format!("event: newEnquiry\ndata: {data}\n\n"))
}

impl EnquiryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self) -> (u64, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.clients.write().await.insert(id, tx);
        log::info!("SSE client {} subscribed", id);
        (id, rx)
    }

    pub async fn unsubscribe(&self, id: u64) {
        if self.clients.write().await.remove(&id).is_some() {
            log::info!("SSE client {} unsubscribed", id);
        }
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Sends `frame` to every subscriber and drops the ones that hung up.
    /// Returns how many clients received it.
    pub async fn broadcast(&self, frame: &str) -> usize {
        let payload = Bytes::from(frame.to_owned());
        let mut closed = Vec::new();
        let mut delivered = 0;
        {
            let clients = self.clients.read().await;
            for (id, tx) in clients.iter() {
                match tx.try_send(payload.clone()) {
                    Ok(()) => delivered += 1,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        log::warn!("SSE client {} is lagging, frame dropped", id);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut clients = self.clients.write().await;
            for id in &closed {
                clients.remove(id);
            }
            log::info!("Pruned {} closed SSE clients", closed.len());
        }
        delivered
    }

    pub async fn notify_new_enquiry(&self, notification: &EnquiryNotification) {
        match event_frame(notification) {
            Ok(frame) => {
                let delivered = self.broadcast(&frame).await;
                log::info!(
                    "New enquiry {} pushed to {} SSE clients",
                    notification.enq_no,
                    delivered
                );
            }
            Err(e) => log::error!("Failed to encode enquiry notification: {}", e),
        }
    }

    pub async fn keep_alive(&self) {
        self.broadcast(KEEP_ALIVE_FRAME).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let notifier = EnquiryNotifier::new();
        let (_, mut a) = notifier.subscribe().await;
        let (_, mut b) = notifier.subscribe().await;

        let n = EnquiryNotification::new(1, "Meera", "Enq01", Utc::now());
        notifier.notify_new_enquiry(&n).await;

        for rx in [&mut a, &mut b] {
            let frame = rx.recv().await.unwrap();
            let text = std::str::from_utf8(&frame).unwrap();
            assert!(text.starts_with("event: newEnquiry\ndata: {"));
            assert!(text.contains("\"enqNo\":\"Enq01\""));
            assert!(text.ends_with("\n\n"));
        }
    }

    #[tokio::test]
    async fn test_closed_clients_are_pruned() {
        let notifier = EnquiryNotifier::new();
        let (_, rx) = notifier.subscribe().await;
        let (_, mut alive) = notifier.subscribe().await;
        drop(rx);

        assert_eq!(notifier.broadcast(KEEP_ALIVE_FRAME).await, 1);
        assert_eq!(notifier.client_count().await, 1);
        assert_eq!(&alive.recv().await.unwrap()[..], KEEP_ALIVE_FRAME.as_bytes());
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let notifier = EnquiryNotifier::new();
        let (id, _rx) = notifier.subscribe().await;
        notifier.unsubscribe(id).await;
        assert_eq!(notifier.client_count().await, 0);
        assert_eq!(notifier.broadcast(KEEP_ALIVE_FRAME).await, 0);
    }
}
