//! End-to-end list model scenarios with real domain items.
//!
//! Drives a `PagedItemStore` through a `ChannelFetcher` the way the client
//! session layer would: page orders go out over a channel, a simulated
//! session worker answers them with `receive` on the same thread.

use crossbeam_channel::{Receiver, unbounded};

use hub_remote_store::{ChannelFetcher, ListChange, ListChangeBus, ListSlot, PagedItemStore, PageRequest};
use hub_remote_types::{Alarm, Player, PlaylistEntry};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn channel_store<T>(
    page_size: usize,
    empty_item: bool,
) -> (
    PagedItemStore<T, ChannelFetcher>,
    Receiver<PageRequest>,
    Receiver<ListChange>,
) {
    let (req_tx, req_rx) = unbounded();
    let (bus, changes) = ListChangeBus::new();
    let store = PagedItemStore::new(page_size, empty_item, ChannelFetcher::new(req_tx), bus);
    (store, req_rx, changes)
}

/// Answer every outstanding page order from `all`, the way the session
/// worker would once responses come back.
fn serve_pages<T: Clone>(
    store: &mut PagedItemStore<T, ChannelFetcher>,
    req_rx: &Receiver<PageRequest>,
    all: &[T],
) {
    while let Ok(req) = req_rx.try_recv() {
        let page = if req.start < all.len() {
            let end = (req.start + store.page_size()).min(all.len());
            all[req.start..end].to_vec()
        } else {
            Vec::new()
        };
        store.receive(req.generation, all.len(), req.start, page);
    }
}

fn player(id: &str, name: &str) -> Player {
    Player {
        id: id.to_string(),
        name: name.to_string(),
        ip: Some("192.168.1.40".to_string()),
        model: Some("squeezebox3".to_string()),
        can_power_off: true,
        connected: true,
    }
}

fn alarm(id: &str, tod: u32) -> Alarm {
    Alarm {
        id: id.to_string(),
        tod,
        enabled: true,
        repeat: false,
        dow: vec![1, 2, 3, 4, 5],
        url: None,
    }
}

fn playlist(len: usize) -> Vec<PlaylistEntry> {
    // Payload-shaped fixtures, the way the hub reports playlist pages.
    (0..len)
        .map(|i| {
            serde_json::from_str(&format!(
                r#"{{"id":"track-{i}","title":"Track {i}","artist":"Artist","duration_ms":180000}}"#
            ))
            .unwrap()
        })
        .collect()
}

#[test]
fn player_list_fills_from_session_worker() {
    init_tracing();
    let all: Vec<Player> = (0..7).map(|i| player(&format!("id-{i}"), &format!("Room {i}"))).collect();
    let (mut store, req_rx, _changes) = channel_store(5, false);

    store.request_visible(None, 0);
    serve_pages(&mut store, &req_rx, &all);
    assert_eq!(store.len(), 7);
    assert_eq!(store.get(0).item().map(|p| p.name.as_str()), Some("Room 0"));

    // The second page is ordered on first read, then filled.
    assert_eq!(store.get(6), ListSlot::Loading);
    serve_pages(&mut store, &req_rx, &all);
    assert_eq!(store.get(6).item().map(|p| p.name.as_str()), Some("Room 6"));
}

#[test]
fn playlist_browser_defers_pages_while_scrolling() {
    init_tracing();
    let all = playlist(23);
    let (mut store, req_rx, _changes) = channel_store(10, false);

    store.request_page(0);
    serve_pages(&mut store, &req_rx, &all);
    assert_eq!(store.len(), 23);

    // A fling across unfetched rows must not flood the session worker.
    store.set_scrolling(true);
    assert_eq!(store.get(15), ListSlot::Loading);
    assert_eq!(store.get(21), ListSlot::Loading);
    assert!(req_rx.try_recv().is_err());

    // Settling re-evaluates the visible window, including the short tail page.
    store.set_scrolling(false);
    store.request_visible(Some(15), 7);
    serve_pages(&mut store, &req_rx, &all);
    assert_eq!(
        store.get(21).item().map(|e| e.title.as_str()),
        Some("Track 21")
    );
}

#[test]
fn alarm_editor_mutations_keep_list_packed() {
    init_tracing();
    let all: Vec<Alarm> = (0..7).map(|i| alarm(&format!("alarm-{i}"), 6 * 3600 + i * 600)).collect();
    let (mut store, req_rx, changes) = channel_store(3, false);

    store.request_visible(Some(0), 7);
    serve_pages(&mut store, &req_rx, &all);
    while changes.try_recv().is_ok() {}

    // Add an alarm in the middle, drag it to the end, then delete it.
    store.insert(2, alarm("alarm-new", 7 * 3600));
    store.move_item(2, 7);
    assert_eq!(store.remove_at(7).map(|a| a.id), Some("alarm-new".to_string()));

    let notified: Vec<ListChange> = changes.try_iter().collect();
    assert_eq!(
        notified,
        vec![
            ListChange::CountChanged { count: 8 },
            ListChange::Inserted { position: 2 },
            ListChange::Moved { from: 2, to: 7 },
            ListChange::CountChanged { count: 7 },
            ListChange::Removed { position: 7 },
        ]
    );

    // The original schedule is intact across the page-boundary shuffling.
    for i in 0..7 {
        assert_eq!(
            store.get(i).item().map(|a| a.id.clone()),
            Some(format!("alarm-{i}"))
        );
    }
}

#[test]
fn blank_first_row_stays_synthetic() {
    init_tracing();
    let all = playlist(4);
    let (mut store, req_rx, _changes) = channel_store(10, true);

    assert_eq!(store.len(), 1);
    assert_eq!(store.get(0), ListSlot::Blank);
    serve_pages(&mut store, &req_rx, &all);

    assert_eq!(store.len(), 5);
    assert_eq!(store.get(0), ListSlot::Blank);
    assert_eq!(store.get(1).item().map(|e| e.title.as_str()), Some("Track 0"));
    assert_eq!(store.get(4).item().map(|e| e.title.as_str()), Some("Track 3"));
}

#[test]
fn refresh_drops_response_for_previous_player() {
    init_tracing();
    let old = playlist(12);
    let new = playlist(3);
    let (mut store, req_rx, _changes) = channel_store(10, false);

    store.request_page(0);
    let old_order = req_rx.try_recv().unwrap();

    // Active player changes before the response lands.
    store.clear_and_refetch();
    let new_order = req_rx.try_recv().unwrap();
    assert_ne!(old_order.generation, new_order.generation);

    // Late response for the old player is discarded, the fresh one lands.
    store.receive(old_order.generation, old.len(), old_order.start, old.clone());
    assert_eq!(store.len(), 0);
    store.receive(new_order.generation, new.len(), new_order.start, new.clone());
    assert_eq!(store.len(), 3);
    assert_eq!(store.get(2).item().map(|e| e.id.as_str()), Some("track-2"));
}
