//! TUI subsystem integration tests
//!
//! These live inside the crate because the panel's state (`App`, `AppUpdate`, the editor)
//! is `pub(crate)`. Tests of the public API (CLI, config loading, the HTTP gateway) are
//! under the top-level `tests/` directory instead.


use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::test_utils::FakeService;
use crate::tui::PanelBackend;
use crate::tui::app::App;

/// Panel wired to an in-memory service
pub(super) fn make_app(service: FakeService) -> (App, Arc<FakeService>) {
    let service = Arc::new(service);
    let backend: Arc<dyn PanelBackend> = Arc::clone(&service) as Arc<dyn PanelBackend>;
    (App::new(&Config::default(), backend), service)
}

/// Let spawned work finish and apply every update it produced
pub(super) async fn settle(app: &mut App) {
    for _ in 0..3 {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        // Aborted connections are released on a later scheduler pass
        tokio::time::sleep(Duration::from_millis(5)).await;
        while let Ok(update) = app.update_rx.try_recv() {
            app.apply_update(update);
        }
    }
}
