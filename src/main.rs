use std::{process, sync::Arc};

use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

use vetrina::{
    application::error::{AppError, ErrorReport},
    application::provider::RecentItemsProvider,
    application::repos::{ContentRepo, SettingsRepo},
    application::settings::WidgetSettingsService,
    cache::{CacheConfig, EventQueue, FlushConsumer, FlushTrigger, TransientStore},
    config,
    infra::{memory::MemoryHost, telemetry},
    widget::{FieldValues, RECENT_POSTS_SLUG, RecentPostsWidget, Widget, WidgetRegistry},
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let report = ErrorReport::from_error("main", error);
    if dispatcher::has_been_set() {
        error!(source_module = report.source, error_chain = ?report.messages, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(source_module = report.source, error_chain = ?report.messages, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Render(config::RenderArgs {
            instance: config::DEFAULT_INSTANCE.to_string(),
            ..Default::default()
        }));

    telemetry::init(&settings.logging)?;

    let runtime = build_runtime(&settings)?;

    match command {
        config::Command::Render(args) => run_render(&runtime, &args).await,
        config::Command::Form(args) => run_form(&runtime, &args).await,
        config::Command::Save(args) => run_save(&runtime, &args).await,
        config::Command::Publish(args) => run_publish(&runtime, &args).await,
        config::Command::Flush(args) => run_flush(&runtime, &args).await,
    }
}

struct Runtime {
    host: Arc<MemoryHost>,
    registry: WidgetRegistry,
    trigger: Arc<FlushTrigger>,
    store: Arc<TransientStore>,
}

impl Runtime {
    fn widget(&self) -> Result<Arc<dyn Widget>, AppError> {
        self.registry
            .get(RECENT_POSTS_SLUG)
            .ok_or_else(|| AppError::unknown_widget(RECENT_POSTS_SLUG))
    }
}

fn build_runtime(settings: &config::Settings) -> Result<Runtime, AppError> {
    let host = match settings.site.seed_file.as_deref() {
        Some(path) => MemoryHost::from_seed_file(settings.site.base_url.clone(), path)?,
        None => MemoryHost::with_sample_content(settings.site.base_url.clone()),
    };
    let host = Arc::new(host);

    let cache_config = CacheConfig::from(&settings.cache);
    let store = Arc::new(TransientStore::new(&cache_config));
    let queue = Arc::new(EventQueue::new());
    let consumer = Arc::new(FlushConsumer::new(
        cache_config.clone(),
        Arc::clone(&store),
        Arc::clone(&queue),
    ));
    let trigger = Arc::new(FlushTrigger::new(cache_config.clone(), queue, consumer));

    let provider = RecentItemsProvider::new(
        Arc::clone(&host) as Arc<dyn ContentRepo>,
        Arc::clone(&store),
        &cache_config,
    );
    let settings_service = WidgetSettingsService::new(
        Arc::clone(&host) as Arc<dyn SettingsRepo>,
        Arc::clone(&trigger),
    );
    let widget = RecentPostsWidget::new(
        provider,
        settings_service,
        Arc::clone(&host) as Arc<dyn ContentRepo>,
    );

    let registry = WidgetRegistry::new();
    registry.register(Arc::new(widget));

    info!(
        posts = host.post_count(),
        cache_enabled = cache_config.is_enabled(),
        "Runtime assembled"
    );

    Ok(Runtime {
        host,
        registry,
        trigger,
        store,
    })
}

async fn run_render(runtime: &Runtime, args: &config::RenderArgs) -> Result<(), AppError> {
    let html = runtime.widget()?.render(&args.instance).await?;
    println!("{html}");
    Ok(())
}

async fn run_form(runtime: &Runtime, args: &config::FormArgs) -> Result<(), AppError> {
    let html = runtime.widget()?.form(&args.instance).await?;
    println!("{html}");
    Ok(())
}

async fn run_save(runtime: &Runtime, args: &config::SaveArgs) -> Result<(), AppError> {
    let fields = FieldValues::new()
        .with("title", args.title.clone())
        .with("count", args.count.clone())
        .with("category", args.category.clone());

    let saved = runtime.widget()?.update(&args.instance, &fields).await?;

    let encoded = serde_json::to_string_pretty(&saved)
        .map_err(|err| AppError::unexpected(format!("failed to encode settings: {err}")))?;
    println!("{encoded}");
    Ok(())
}

async fn run_publish(runtime: &Runtime, args: &config::PublishArgs) -> Result<(), AppError> {
    let widget = runtime.widget()?;

    // Warm the instance's cache so the flush below is observable.
    let _warm = widget.render(&args.instance).await?;
    let queries_before = runtime.host.content_queries();

    let record = runtime
        .host
        .publish_post(&args.title, &args.excerpt, &args.category)?;
    let slug = record.permalink.rsplit('/').next().unwrap_or_default();
    runtime.trigger.post_published(record.id, slug);

    let html = widget.render(&args.instance).await?;
    info!(
        post_id = %record.id,
        queries_before,
        queries_after = runtime.host.content_queries(),
        "Published and re-rendered"
    );
    println!("{html}");
    Ok(())
}

async fn run_flush(runtime: &Runtime, args: &config::FlushArgs) -> Result<(), AppError> {
    let widget = runtime.widget()?;

    let _warm = widget.render(&args.instance).await?;
    let queries_before = runtime.host.content_queries();

    runtime.trigger.theme_changed();

    let html = widget.render(&args.instance).await?;
    info!(
        queries_before,
        queries_after = runtime.host.content_queries(),
        display_epoch = runtime.store.display_epoch(),
        "Theme flush forced a fresh query"
    );
    println!("{html}");
    Ok(())
}
