use std::convert::Infallible;

use actix_web::{HttpResponse, http::header, web, web::Bytes};
use futures_util::{StreamExt, stream};
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};
use tracing::{info, warn};

use crate::push::{EventHub, PushEvent, sse};

/// Push channel
#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "Server-sent events: connect, barcode_scanned, data_cleared",
            body = String, content_type = "text/event-stream")
    ),
    tag = "Push"
)]
pub async fn events(hub: web::Data<EventHub>) -> HttpResponse {
    let rx = hub.subscribe();
    info!("Push subscriber connected");

    let hello = stream::once(async { Ok::<_, Infallible>(Bytes::from(sse::encode(&PushEvent::Connected))) });
    let updates = BroadcastStream::new(rx).filter_map(|item| async move {
        match item {
            Ok(event) => Some(Ok(Bytes::from(sse::encode(&event)))),
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                warn!(missed, "Push subscriber lagging, events skipped");
                None
            }
        }
    });

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(hello.chain(updates))
}
