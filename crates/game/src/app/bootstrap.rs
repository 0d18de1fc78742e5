use std::process::ExitCode;

use engine::{load_node_defs, resolve_app_paths, BackdropHandle, LoopConfig};
use neon_alley::{default_nodes, nodes_from_defs, GameConfig, JsonFileStore, Node, Session};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: Session,
    pub(crate) backdrop: BackdropHandle,
}

pub(crate) fn build_app() -> Result<AppWiring, ExitCode> {
    init_tracing();
    info!("=== Neon Alley Startup ===");

    let paths = resolve_app_paths().map_err(|err| {
        error!(error = %err, "startup_failed");
        ExitCode::FAILURE
    })?;
    let config = GameConfig::from_env(&paths);
    info!(
        root = %paths.root.display(),
        save_file = %config.save_file.display(),
        seed = config.rng_seed,
        "config_resolved"
    );

    let nodes = load_world_nodes(&config);
    let backdrop = BackdropHandle::new();
    let session = Session::new(
        nodes,
        Box::new(JsonFileStore::new(config.save_file.clone())),
        config.rng_seed,
    )
    .with_ambient(Box::new(backdrop.clone()));

    Ok(AppWiring {
        config: LoopConfig::default(),
        session,
        backdrop,
    })
}

/// Falls back to the built-in district when the node file is missing or bad.
fn load_world_nodes(config: &GameConfig) -> Vec<Node> {
    let defs = match load_node_defs(&config.nodes_file) {
        Ok(defs) => defs,
        Err(err) => {
            warn!(error = %err, "content_fallback");
            return default_nodes();
        }
    };
    match nodes_from_defs(&defs) {
        Ok(nodes) if !nodes.is_empty() => {
            info!(count = nodes.len(), "world_nodes_loaded");
            nodes
        }
        Ok(_) => {
            warn!(file = %config.nodes_file.display(), "content_fallback_empty");
            default_nodes()
        }
        Err(err) => {
            warn!(error = %err, "content_fallback");
            default_nodes()
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
