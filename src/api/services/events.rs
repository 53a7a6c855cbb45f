//! `GET /api/events`: server-sent click updates

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::time::{Instant, interval_at};
use tracing::{debug, error};

use super::ApiSettings;
use crate::services::ResolutionService;
use crate::system::event::ClickEvent;

const CONNECTED_FRAME: &[u8] = b": connected\n\n";
const KEEPALIVE_FRAME: &[u8] = b": keepalive\n\n";

/// `event: clickUpdate` 帧
pub fn sse_frame(event: &ClickEvent) -> Option<Bytes> {
    match serde_json::to_string(event) {
        Ok(data) => Some(Bytes::from(format!(
            "event: {}\ndata: {}\n\n",
            event.event_name(),
            data
        ))),
        Err(e) => {
            error!("Failed to serialize click event: {}", e);
            None
        }
    }
}

pub struct EventsService;

impl EventsService {
    pub async fn click_events(
        service: web::Data<Arc<ResolutionService>>,
        settings: web::Data<ApiSettings>,
    ) -> HttpResponse {
        let subscription = service.bus().subscribe();
        let period = settings.keepalive;
        let ticker = interval_at(Instant::now() + period, period);
        debug!(
            "Click stream opened ({} subscribers)",
            service.bus().subscriber_count()
        );

        let frames = futures_util::stream::unfold(
            (subscription, ticker),
            |(mut subscription, mut ticker)| async move {
                loop {
                    let frame = tokio::select! {
                        event = subscription.next() => match event {
                            Some(event) => sse_frame(&event),
                            // 总线关闭，结束流
                            None => return None,
                        },
                        _ = ticker.tick() => Some(Bytes::from_static(KEEPALIVE_FRAME)),
                    };
                    if let Some(frame) = frame {
                        return Some((frame, (subscription, ticker)));
                    }
                }
            },
        );

        let body = futures_util::stream::once(async { Bytes::from_static(CONNECTED_FRAME) })
            .chain(frames)
            .map(Ok::<_, actix_web::Error>);

        HttpResponse::Ok()
            .content_type("text/event-stream")
            .insert_header(("Cache-Control", "no-cache"))
            .insert_header(("X-Accel-Buffering", "no"))
            // 跳过 Compress 中间件，压缩器会缓冲帧
            .insert_header(("Content-Encoding", "identity"))
            .streaming(body)
    }
}
