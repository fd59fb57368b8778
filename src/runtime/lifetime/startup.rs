use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::HttpPolicy;
use crate::cache::{ResponseCache, create_response_cache};
use crate::codec::Codec;
use crate::config::AppConfig;
use crate::pipeline::LookupPipeline;
use crate::pool::BufferPool;
use crate::services::geoip::{GeoOracle, MaxMindOracle};

pub struct StartupContext {
    pub pipeline: Arc<LookupPipeline>,
    pub cache: Option<Arc<dyn ResponseCache>>,
    pub policy: HttpPolicy,
}

/// 准备服务器启动的上下文
/// 打开数据库，并构造缓存、缓冲区池和查询流水线
pub fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let oracle = open_database(&config.database.path)?;
    let context = build_context(config, oracle, Utc::now())?;

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(context)
}

fn open_database(path: &str) -> Result<Arc<dyn GeoOracle>> {
    let oracle = MaxMindOracle::open(path)
        .map_err(crate::errors::IpGeoError::from)
        .with_context(|| format!("Failed to open GeoIP database {}", path))?;

    let meta = oracle.metadata();
    match meta.build_time {
        Some(built) => info!(
            "Loaded database {}: {} ({} nodes, IPv{}, built {})",
            path,
            meta.database_type,
            meta.node_count,
            meta.ip_version,
            built.to_rfc3339()
        ),
        None => info!(
            "Loaded database {}: {} ({} nodes, IPv{})",
            path, meta.database_type, meta.node_count, meta.ip_version
        ),
    }
    if !meta.database_type.contains("City") {
        warn!(
            "Database type {} is not a City database, location fields may be empty",
            meta.database_type
        );
    }

    Ok(Arc::new(oracle))
}

/// 根据配置组装流水线（与数据库来源无关）
pub fn build_context(
    config: &AppConfig,
    oracle: Arc<dyn GeoOracle>,
    started_at: DateTime<Utc>,
) -> Result<StartupContext> {
    let cache_policy = config.cache.policy().context("Invalid cache configuration")?;
    let cache = create_response_cache(&cache_policy);

    let pool = Arc::new(BufferPool::new(
        config.buffer_pool.max_pooled,
        config.buffer_pool.initial_capacity,
    ));

    let http = &config.http;
    let policy = HttpPolicy::new(
        &http.origin_policy,
        http.last_modified.then_some(started_at),
        http.input,
    )
    .context("Invalid HTTP configuration")?;

    if policy.origin.is_none() {
        info!("Access-Control-Allow-Origin header disabled");
    }
    info!("Reading IP address from request {}", http.input);

    let pipeline = Arc::new(LookupPipeline::new(
        Arc::clone(&oracle),
        cache.clone(),
        pool,
        Codec::default(),
    ));
    debug!("Lookup pipeline ready, backed by {} oracle", oracle.name());

    Ok(StartupContext {
        pipeline,
        cache,
        policy,
    })
}
