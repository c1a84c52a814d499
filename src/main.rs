use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Result};
use awful_aj::{config, template};
use chrono::Utc;
use chrono_tz::Asia::Shanghai;
use clap::Parser;
use reqwest::Client;
use tracing::{debug, info, warn};

use hotlist_ideas::collect::{HttpSearchFetcher, SearchFetcher};
use hotlist_ideas::config::PipelineConfig;
use hotlist_ideas::fetch::{fetch_hot_feed, load_feed_file};
use hotlist_ideas::llm::{AwfulModelClient, ModelClient};
use hotlist_ideas::orchestrator::{run_report, Pipeline};

/// Hot-list product ideas - turns trending topics into scored product concepts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Output directory for generated reports (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    /// Path to awful_aj model config (overrides AJ_CONFIG environment variable)
    #[arg(short, long)]
    config: Option<String>,

    /// Path to pipeline options (TOML)
    #[arg(long)]
    pipeline_config: Option<PathBuf>,

    /// Read the hot list from a saved JSON payload instead of the network
    #[arg(long)]
    feed_file: Option<PathBuf>,

    /// Number of topics to analyze (overrides topic_limit)
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Skip the model and use rule-based analysis only
    #[arg(long)]
    no_ai: bool,

    /// Skip background search
    #[arg(long)]
    no_search: bool,

    /// Hot-list provider key
    #[arg(long, env = "TIANAPI_KEY", hide_env_values = true)]
    feed_key: Option<String>,

    /// Hot-list endpoint
    #[arg(long, env = "HOTLIST_FEED_URL", default_value = "https://apis.tianapi.com/weibohot/index")]
    feed_url: String,

    /// Search endpoint; background search is off when unset
    #[arg(long, env = "SEARCH_ENDPOINT")]
    search_endpoint: Option<String>,

    /// Search API key
    #[arg(long, env = "SEARCH_API_KEY", hide_env_values = true)]
    search_api_key: Option<String>,
}

fn resolve_paths() -> Result<(PathBuf, PathBuf, PathBuf)> {
    // base dir: AJ_CONFIG_DIR, else awful_aj::config_dir()
    let base_dir = if let Ok(dir) = std::env::var("AJ_CONFIG_DIR") {
        PathBuf::from(dir)
    } else {
        awful_aj::config_dir().map_err(|e| anyhow::anyhow!(e.to_string()))?
    };

    // config file: AJ_CONFIG, else <base>/config.yaml
    let cfg_path = if let Ok(p) = std::env::var("AJ_CONFIG") {
        PathBuf::from(p)
    } else {
        base_dir.join("config.yaml")
    };

    // templates: AJ_TEMPLATE_DIR, else <base>/templates
    let tpl_dir = if let Ok(p) = std::env::var("AJ_TEMPLATE_DIR") {
        PathBuf::from(p)
    } else {
        let d = base_dir.join("templates");
        // make it visible to awful_aj::template loader
        std::env::set_var("AJ_TEMPLATE_DIR", &d);
        d
    };

    Ok((base_dir, cfg_path, tpl_dir))
}

async fn load_model_client(config_arg: Option<&str>) -> Result<AwfulModelClient> {
    // CLI arg > resolve_paths logic
    let cfg_path = if let Some(config_path) = config_arg {
        debug!("Using config file from --config argument: {}", config_path);
        PathBuf::from(config_path)
    } else {
        let (_base_dir, cfg_path, tpl_dir) = resolve_paths()?;
        debug!(
            "Using config file from environment/default: {}, templates={}",
            cfg_path.display(),
            tpl_dir.display()
        );
        cfg_path
    };

    if !cfg_path.exists() {
        bail!(
            "awful_aj config not found at {}. Use --config or set AJ_CONFIG.",
            cfg_path.display()
        );
    }

    let cfg = config::load_config(
        cfg_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("invalid config path"))?,
    )
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let tpl_name =
        std::env::var("AJ_TEMPLATE_PRODUCT").unwrap_or_else(|_| "product_opportunity_analyst".to_string());
    let tpl = template::load_template(&tpl_name)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    debug!("Loaded template {}", tpl_name);

    Ok(AwfulModelClient::new(cfg, tpl))
}

fn load_pipeline_config(args: &Args) -> Result<PipelineConfig> {
    let mut cfg = match &args.pipeline_config {
        Some(path) => {
            debug!("Loading pipeline options from {}", path.display());
            PipelineConfig::load(path)?
        }
        None => PipelineConfig::default(),
    };
    if let Some(n) = args.count {
        cfg.topic_limit = n;
    }
    if args.no_ai {
        cfg.enable_primary_strategy = false;
    }
    if args.no_search {
        cfg.enable_background_search = false;
    }
    cfg.validate()?;
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting hotlist_ideas");

    let args = Args::parse();
    let cfg = load_pipeline_config(&args)?;
    debug!("Pipeline options: {:?}", cfg);

    let client = Client::builder().build()?;

    // A missing or broken model setup degrades to rule-based analysis
    let model: Option<Arc<dyn ModelClient>> = if cfg.enable_primary_strategy {
        match load_model_client(args.config.as_deref()).await {
            Ok(m) => Some(Arc::new(m)),
            Err(e) => {
                warn!("Model unavailable, using rule-based analysis only: {:#}", e);
                None
            }
        }
    } else {
        info!("Model analysis disabled");
        None
    };

    let search: Option<Arc<dyn SearchFetcher>> = match (&args.search_endpoint, cfg.enable_background_search) {
        (Some(endpoint), true) => Some(Arc::new(HttpSearchFetcher::new(
            client.clone(),
            endpoint,
            args.search_api_key.clone(),
        )?)),
        (None, true) => {
            info!("SEARCH_ENDPOINT not set, background search disabled");
            None
        }
        (_, false) => None,
    };

    let raw_feed = match (&args.feed_file, &args.feed_key) {
        (Some(path), _) => load_feed_file(path)?,
        (None, Some(key)) => fetch_hot_feed(&client, &args.feed_url, key, cfg.topic_limit).await?,
        (None, None) => bail!("No hot-list source: pass --feed-file or set TIANAPI_KEY"),
    };

    let now = Utc::now().with_timezone(&Shanghai);
    let ymd = now.format("%Y-%m-%d").to_string();
    let generated_at = now.format("%Y-%m-%d %H:%M %Z").to_string();
    info!("Run date - date={}, output_dir={}", ymd, args.output_dir);

    let pipeline = Pipeline::new(cfg, search, model);
    let paths = run_report(&pipeline, &raw_feed, Path::new(&args.output_dir), &ymd, &generated_at).await?;
    info!("Done - run={}, directory={}", paths.run_number, paths.dir.display());
    Ok(())
}
