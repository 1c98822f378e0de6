use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::buffer::RotationBuffer;
use crate::catalog::{CatalogClient, SearchRequest, SearchResponse};
use crate::dedup::{self, InitialOrder};
use crate::error::GalleryError;
use crate::events::{LoadEvent, LoadEventKind, LoadedGallery};
use crate::handle::ImageHandle;
use crate::surface::GRID_SLOTS;

/// How fetched references are ordered before they enter the buffer.
#[derive(Debug, Clone, Copy)]
pub struct Selection {
    pub order: InitialOrder,
    pub seed: Option<u64>,
}

/// One complete fetch cycle. Blocking; never call it on the gallery loop.
///
/// `report` receives `loaded / K` after each handle is buffered. Nothing
/// outside the returned value is mutated, so on error the live grid and
/// buffer are exactly as they were.
pub fn run_search<F>(
    catalog: &dyn CatalogClient,
    request: &SearchRequest,
    selection: Selection,
    cancel: &CancellationToken,
    mut report: F,
) -> Result<LoadedGallery, GalleryError>
where
    F: FnMut(f64),
{
    let started = Instant::now();
    let raw = catalog.search(request)?;
    if cancel.is_cancelled() {
        return Err(GalleryError::Interrupted);
    }
    if !raw.is_success() {
        return Err(GalleryError::Network(raw));
    }

    let response = SearchResponse::decode(&raw.body)?;
    let mut urls = dedup::distinct_artwork(&response.results);
    debug!(
        results = response.results.len(),
        result_count = response.result_count,
        distinct = urls.len(),
        "deduplicated search results"
    );
    if urls.len() <= GRID_SLOTS {
        return Err(GalleryError::InsufficientResults { found: urls.len() });
    }

    selection.order.apply(&mut urls, selection.seed);
    let total = urls.len();
    let mut buffer = RotationBuffer::with_capacity(total);
    for (loaded, url) in urls.into_iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(GalleryError::Interrupted);
        }
        buffer.push_back(ImageHandle::new(url));
        report((loaded + 1) as f64 / total as f64);
    }

    let fill = buffer
        .warm_rotation()
        .ok_or(GalleryError::InsufficientResults { found: total })?;
    info!(
        distinct = total,
        elapsed = %humantime::format_duration(started.elapsed()),
        "search loaded"
    );
    Ok(LoadedGallery { buffer, fill })
}

/// Fire-and-forget launch of [`run_search`] on a blocking worker.
///
/// Progress and the final outcome arrive on `events` in order, tagged with
/// `load`. A worker that panics or is torn down surfaces as
/// [`GalleryError::Interrupted`].
pub fn spawn(
    load: u64,
    catalog: Arc<dyn CatalogClient>,
    request: SearchRequest,
    selection: Selection,
    events: Sender<LoadEvent>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let uri = request.uri().to_string();
        info!(
            load,
            term = %request.query().term,
            media = %request.query().media,
            limit = request.limit(),
            %uri,
            "search started"
        );
        let progress_tx = events.clone();
        let worker = tokio::task::spawn_blocking(move || {
            run_search(catalog.as_ref(), &request, selection, &cancel, |fraction| {
                let _ = progress_tx.blocking_send(LoadEvent {
                    load,
                    kind: LoadEventKind::Progress(fraction),
                });
            })
        });
        let outcome = match worker.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(load, "search worker failed: {err}");
                Err(GalleryError::Interrupted)
            }
        };
        if events
            .send(LoadEvent {
                load,
                kind: LoadEventKind::Finished { uri, outcome },
            })
            .await
            .is_err()
        {
            debug!(load, "gallery loop gone; dropping search outcome");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MediaCategory, RawResponse, SearchQuery};
    use reqwest::Url;

    struct CannedCatalog {
        status: u16,
        body: String,
    }

    impl CatalogClient for CannedCatalog {
        fn search(&self, request: &SearchRequest) -> Result<RawResponse, GalleryError> {
            Ok(RawResponse {
                uri: request.uri().to_string(),
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn body_with(urls: &[String]) -> String {
        let results: Vec<serde_json::Value> = urls
            .iter()
            .map(|u| serde_json::json!({"wrapperType": "track", "kind": "song", "artworkUrl100": u}))
            .collect();
        serde_json::json!({"resultCount": results.len(), "results": results}).to_string()
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://art.example/{i}/100x100bb.jpg")).collect()
    }

    fn request() -> SearchRequest {
        let endpoint = Url::parse("https://itunes.apple.com/search").unwrap();
        SearchRequest::new(&endpoint, SearchQuery::new("lana del rey", MediaCategory::Music), 200)
    }

    const IN_ORDER: Selection = Selection {
        order: InitialOrder::Response,
        seed: None,
    };

    #[test]
    fn loads_every_distinct_handle_and_fills_the_grid() {
        let mut all = urls(30);
        all.extend(urls(10)); // duplicates
        let catalog = CannedCatalog { status: 200, body: body_with(&all) };
        let mut progress = Vec::new();

        let loaded = run_search(&catalog, &request(), IN_ORDER, &CancellationToken::new(), |p| {
            progress.push(p)
        })
        .unwrap();

        assert_eq!(loaded.buffer.len(), 30);
        assert_eq!(progress.len(), 30);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(progress.last().copied(), Some(1.0));
        let expected = urls(30);
        assert_eq!(loaded.fill[0].url(), expected[0]);
        assert_eq!(loaded.fill[19].url(), expected[19]);
        assert_eq!(loaded.buffer.front().map(ImageHandle::url), Some(expected[20].as_str()));
    }

    #[test]
    fn twenty_distinct_results_are_not_enough() {
        let catalog = CannedCatalog { status: 200, body: body_with(&urls(20)) };
        let mut reported = 0;
        let err = run_search(&catalog, &request(), IN_ORDER, &CancellationToken::new(), |_| {
            reported += 1
        })
        .unwrap_err();
        assert!(matches!(err, GalleryError::InsufficientResults { found: 20 }));
        assert_eq!(
            err.to_string(),
            "20 distinct results found, but 21 or more are needed."
        );
        assert_eq!(reported, 0);
    }

    #[test]
    fn non_success_status_carries_the_raw_response() {
        let catalog = CannedCatalog { status: 503, body: "unavailable".into() };
        let err = run_search(&catalog, &request(), IN_ORDER, &CancellationToken::new(), |_| {})
            .unwrap_err();
        match err {
            GalleryError::Network(raw) => {
                assert_eq!(raw.status, 503);
                assert_eq!(raw.body, "unavailable");
            }
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[test]
    fn cancelled_search_is_interrupted() {
        let catalog = CannedCatalog { status: 200, body: body_with(&urls(25)) };
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = run_search(&catalog, &request(), IN_ORDER, &cancel, |_| {}).unwrap_err();
        assert!(matches!(err, GalleryError::Interrupted));
    }

    #[test]
    fn cancellation_while_buffering_stops_the_load() {
        let catalog = CannedCatalog { status: 200, body: body_with(&urls(40)) };
        let cancel = CancellationToken::new();
        let mut reported = 0;
        let err = run_search(&catalog, &request(), IN_ORDER, &cancel, |_| {
            reported += 1;
            if reported == 5 {
                cancel.cancel();
            }
        })
        .unwrap_err();
        assert!(matches!(err, GalleryError::Interrupted));
        assert_eq!(reported, 5);
    }

    struct PanickingCatalog;

    impl CatalogClient for PanickingCatalog {
        fn search(&self, _request: &SearchRequest) -> Result<RawResponse, GalleryError> {
            panic!("catalog worker crashed");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn crashed_worker_finishes_as_interrupted() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let handle = spawn(
            7,
            Arc::new(PanickingCatalog),
            request(),
            IN_ORDER,
            tx,
            CancellationToken::new(),
        );

        let ev = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("timeout waiting for load outcome")
            .expect("load task dropped its sender");
        assert_eq!(ev.load, 7);
        match ev.kind {
            LoadEventKind::Finished { uri, outcome } => {
                assert!(uri.contains("term=lana+del+rey"));
                assert!(matches!(outcome, Err(GalleryError::Interrupted)));
            }
            LoadEventKind::Progress(p) => panic!("unexpected progress {p}"),
        }
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn spawned_load_reports_progress_before_outcome() {
        let catalog: Arc<dyn CatalogClient> =
            Arc::new(CannedCatalog { status: 200, body: body_with(&urls(21)) });
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let handle = spawn(3, catalog, request(), IN_ORDER, tx, CancellationToken::new());

        let mut progress = 0;
        loop {
            let ev = rx.recv().await.expect("load task dropped its sender");
            assert_eq!(ev.load, 3);
            match ev.kind {
                LoadEventKind::Progress(_) => progress += 1,
                LoadEventKind::Finished { uri, outcome } => {
                    assert!(uri.starts_with("https://itunes.apple.com/search?term=lana+del+rey"));
                    assert_eq!(outcome.unwrap().buffer.len(), 21);
                    break;
                }
            }
        }
        assert_eq!(progress, 21);
        handle.await.unwrap();
    }
}
