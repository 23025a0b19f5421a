use cookie_consent::bootstrap::should_show_loader;
use cookie_consent::consent::{ConsentEvent, ConsentStore, HeadlessDocument, Theme};
use cookie_consent::storage::{CookieArea, CookieAttributes, JsonFileArea, StorageHandles};
use cookie_consent::{ConsentConfig, ConsentError};
use std::sync::Arc;

fn main() -> Result<(), ConsentError> {
    env_logger::init();

    // Status flag lives in a cookie, the tree snapshot in a JSON file next to it.
    let config = ConsentConfig::builder()
        .max_age(time::Duration::days(365))
        .secure(true)
        .build()?;

    let cookies = Arc::new(CookieArea::new(CookieAttributes::from_config(&config)));
    let snapshot_path = std::env::temp_dir().join("consent-walkthrough.json");
    let snapshot = Arc::new(JsonFileArea::open(&snapshot_path)?);

    let storage = StorageHandles {
        flag: cookies.clone(),
        snapshot,
    };

    let mut store = ConsentStore::new(config.clone(), storage, HeadlessDocument::new(Theme::Dark));
    let mut events = store.subscribe();
    store.initialize();

    log::info!("status after load: {} (prompt: {})", store.status(), store.needs_prompt());

    store.toggle("transitions");
    store.toggle("themes");
    store.toggle("prefers");
    store.save_preferences();

    log::info!("transitions active: {}", store.is_active("transitions"));
    log::info!("stylesheets: {:?}", store.document().stylesheets());
    log::info!("theme: {:?}", store.document().theme());
    log::info!("cookie header: {:?}", cookies.set_cookie_header(&config.status_key));
    log::info!("loader on next visit: {}", should_show_loader(&cookies.document_cookie(), &config));

    store.reject_all();
    log::info!("after reject: {} / transitions {}", store.status(), store.is_active("transitions"));

    store.reset_to_default();
    log::info!("after reset: {} (prompt: {})", store.status(), store.needs_prompt());

    while let Ok(ev) = events.try_recv() {
        match ev {
            ConsentEvent::StorageFailed { key, reason } => log::warn!("storage failed for {:?}: {}", key, reason),
            other => log::info!("event: {:?}", other),
        }
    }

    Ok(())
}
