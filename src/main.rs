mod cli;
mod queue;

use std::error::Error;

use clap::Parser;
use tessera_models::ModelCatalog;
use tessera_runtime::{Command, InMemoryRenderer, Runtime};
use tessera_world::{MapConfig, load_map_config_from_path};

use cli::{Args, ModelRef};
use queue::{CommandQueue, log_command};

fn resolve(catalog: &ModelCatalog, m: &ModelRef) -> Option<u32> {
    match m {
        ModelRef::Id(id) => Some(*id),
        ModelRef::Name(n) => {
            let id = catalog.id_by_name(n);
            if id.is_none() {
                log::warn!(target: "commands", "unknown model name '{}'", n);
            }
            id
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match &args.map_config {
        Some(p) => load_map_config_from_path(p)?,
        None => MapConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    let map_size = args.map_size.unwrap_or(cfg.tile_dim[0]);
    let catalog = match &args.models {
        Some(p) => ModelCatalog::load_from_path(p)?,
        None => ModelCatalog::builtin(),
    };
    log::info!(
        "tessera: map {}x{} seed={} models={}",
        map_size,
        map_size,
        cfg.seed,
        catalog.len()
    );

    let mut queue = CommandQueue::new();
    queue.push(Command::GenerateTerrain {
        map_size,
        max_height: cfg.max_height,
        roughness: cfg.roughness,
        max_depth: cfg.max_depth,
    });
    for p in &args.place {
        if let Some(model_id) = resolve(&catalog, &p.model) {
            queue.push(Command::PlaceModel {
                rect: p.rect,
                model_id,
            });
        }
    }
    for r in &args.random {
        if let Some(model_id) = resolve(&catalog, &r.model) {
            queue.push(Command::PlaceModelRandom {
                model_id,
                percent: r.percent,
            });
        }
    }
    for rect in &args.remove {
        queue.push(Command::RemoveModel { rect: *rect });
    }

    log::info!(target: "commands", "{} command(s) queued", queue.len());
    let mut rt = Runtime::new(cfg, catalog, InMemoryRenderer::new(), args.threads)?;
    let mut dropped = 0usize;
    while let Some(env) = queue.pop() {
        log_command(&env);
        if !rt.apply(env.cmd).is_applied() {
            dropped += 1;
        }
    }

    if let Some(map) = rt.map() {
        for c in map.layout.chunks() {
            let models = map.models.chunk(c);
            let mut per_model: Vec<(u32, usize)> = models.iter().map(|(id, l)| (id, l.len())).collect();
            per_model.sort();
            log::info!(
                target: "models",
                "chunk ({}, {}): {} instance(s) {:?}",
                c.cx,
                c.cy,
                models.instance_count(),
                per_model
            );
        }
        log::info!(
            "done: {} mesh(es) live, {} vertex floats, {} catalog miss(es), {} command(s) dropped",
            rt.renderer().live(),
            rt.renderer().total_vertex_floats(),
            map.stats.misses,
            dropped
        );
    }
    Ok(())
}
