use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::Stream;
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use super::events::ClickEvent;

/// Best-effort publish/subscribe bus for click events.
///
/// Each subscriber owns a bounded ring buffer of `capacity` events. A
/// subscriber that falls behind loses its oldest events; publishers never
/// wait on subscribers. There is no history: a subscription only sees events
/// published after it was created.
pub struct NotificationBus {
    sender: broadcast::Sender<ClickEvent>,
    closed: watch::Sender<bool>,
    published: AtomicU64,
}

impl NotificationBus {
    pub fn new(capacity: usize) -> Self {
        // broadcast::channel panics on zero capacity
        let (sender, _) = broadcast::channel(capacity.max(1));
        let (closed, _) = watch::channel(false);
        Self {
            sender,
            closed,
            published: AtomicU64::new(0),
        }
    }

    /// 广播事件，返回收到该事件的订阅者数量
    ///
    /// 没有订阅者或总线已关闭时返回 0，从不阻塞。
    pub fn publish(&self, event: ClickEvent) -> usize {
        if self.is_closed() {
            return 0;
        }
        self.published.fetch_add(1, Ordering::Relaxed);
        match self.sender.send(event) {
            Ok(n) => n,
            Err(broadcast::error::SendError(event)) => {
                debug!("No subscribers for click event on '{}'", event.short_code);
                0
            }
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            closed: self.closed.subscribe(),
            dropped: 0,
        }
    }

    /// 结束所有订阅；之后的 publish 不再投递
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// 累计发布次数（含无人接收的事件）
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// A live view of the bus for one consumer
pub struct Subscription {
    receiver: broadcast::Receiver<ClickEvent>,
    closed: watch::Receiver<bool>,
    dropped: u64,
}

impl Subscription {
    /// 下一个事件；总线关闭后返回 `None`
    pub async fn next(&mut self) -> Option<ClickEvent> {
        loop {
            if *self.closed.borrow() {
                return None;
            }

            let received = tokio::select! {
                biased;

                changed = self.closed.changed() => match changed {
                    // sender 被丢弃同样视为关闭
                    Err(_) => return None,
                    Ok(()) => continue,
                },
                received = self.receiver.recv() => received,
            };

            match received {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    self.dropped += skipped;
                    warn!("Click subscriber lagging, dropped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// 因处理过慢而丢失的事件数
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn into_stream(self) -> impl Stream<Item = ClickEvent> + Send + 'static {
        futures_util::stream::unfold(self, |mut sub| async move {
            sub.next().await.map(|event| (event, sub))
        })
    }
}
