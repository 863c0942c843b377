use std::sync::Arc;

use anyhow::Context;

use kuuburi_app::modules;
use kuuburi_app::modules::catalog::CatalogService;
use kuuburi_app::modules::profiles::ProfileService;
use kuuburi_app::session::Session;
use kuuburi_auth::DevProvider;
use kuuburi_events::EventBus;
use kuuburi_kernel::settings::Settings;
use kuuburi_kernel::{InitCtx, ModuleRegistry};
use kuuburi_store::{DocumentStore, MemoryStore, SchemaSet};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load kuuburi settings")?;
    kuuburi_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        store = %settings.store.endpoint,
        "kuuburi bootstrap starting"
    );

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);

    let schemas = SchemaSet::new(registry.collect_schemas());
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new(schemas));

    let ctx = InitCtx {
        settings: &settings,
        store: &store,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let events = EventBus::default();
    let mut session = Session::new(
        CatalogService::new(store.clone()),
        ProfileService::new(store.clone()),
        events.clone(),
    );

    session.load_books().await;

    let provider = DevProvider::new(
        &settings.auth.dev_uid,
        &settings.auth.dev_display_name,
        &settings.auth.dev_email,
    );
    session.sign_in(&provider).await;

    tracing::info!(
        books = session.books().len(),
        user = session.current_user().map(|user| user.uid.as_str()),
        "session ready"
    );

    registry.stop_all().await?;
    tracing::info!("kuuburi bootstrap complete");
    Ok(())
}
