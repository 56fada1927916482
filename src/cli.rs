use std::path::PathBuf;

use clap::Parser;
use tessera_geom::TileRect;

#[derive(Parser, Debug)]
#[command(
    name = "tessera",
    about = "Generate a tile terrain and place models on it, headless"
)]
pub struct Args {
    /// Map configuration TOML; defaults apply when omitted
    #[arg(long)]
    pub map_config: Option<PathBuf>,
    /// Model catalog TOML (`[[models]]` tables); builtin props when omitted
    #[arg(long)]
    pub models: Option<PathBuf>,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Tiles per map side (power of two)
    #[arg(long)]
    pub map_size: Option<u32>,
    /// Place a model over a rect: `x,y,w,h:model` (id or name)
    #[arg(long = "place", value_parser = parse_place)]
    pub place: Vec<PlaceSpec>,
    /// Scatter a model: `model:percent`
    #[arg(long = "random", value_parser = parse_random)]
    pub random: Vec<RandomSpec>,
    /// Remove every model in a rect: `x,y,w,h`
    #[arg(long = "remove", value_parser = parse_rect)]
    pub remove: Vec<TileRect>,
    /// Meshing threads; 0 lets rayon decide
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModelRef {
    Id(u32),
    Name(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaceSpec {
    pub rect: TileRect,
    pub model: ModelRef,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RandomSpec {
    pub model: ModelRef,
    pub percent: f32,
}

fn parse_model(s: &str) -> Result<ModelRef, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("missing model".into());
    }
    Ok(match s.parse::<u32>() {
        Ok(id) => ModelRef::Id(id),
        Err(_) => ModelRef::Name(s.to_string()),
    })
}

pub fn parse_rect(s: &str) -> Result<TileRect, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!("expected x,y,w,h, got '{}'", s));
    }
    let mut v = [0i32; 4];
    for (dst, p) in v.iter_mut().zip(parts.iter()) {
        *dst = p
            .parse()
            .map_err(|e| format!("bad number '{}' in '{}': {}", p, s, e))?;
    }
    Ok(TileRect::new(v[0], v[1], v[2], v[3]))
}

pub fn parse_place(s: &str) -> Result<PlaceSpec, String> {
    let (rect, model) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected x,y,w,h:model, got '{}'", s))?;
    Ok(PlaceSpec {
        rect: parse_rect(rect)?,
        model: parse_model(model)?,
    })
}

pub fn parse_random(s: &str) -> Result<RandomSpec, String> {
    let (model, pct) = s
        .split_once(':')
        .ok_or_else(|| format!("expected model:percent, got '{}'", s))?;
    let percent: f32 = pct
        .trim()
        .parse()
        .map_err(|e| format!("bad percent '{}': {}", pct, e))?;
    Ok(RandomSpec {
        model: parse_model(model)?,
        percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_place_specs() {
        assert_eq!(
            parse_place("0,0,2,2:5"),
            Ok(PlaceSpec {
                rect: TileRect::new(0, 0, 2, 2),
                model: ModelRef::Id(5)
            })
        );
        assert_eq!(
            parse_place("-1, 3, 4, 4:crate").map(|p| p.model),
            Ok(ModelRef::Name("crate".into()))
        );
        assert!(parse_place("0,0,2:5").is_err());
        assert!(parse_place("0,0,2,2").is_err());
        assert!(parse_place("0,0,2,2:").is_err());
    }

    #[test]
    fn parses_random_specs() {
        let r = parse_random("pyramid:12.5").unwrap();
        assert_eq!(r.model, ModelRef::Name("pyramid".into()));
        assert_eq!(r.percent, 12.5);
        assert!(parse_random("3:lots").is_err());
    }

    #[test]
    fn clap_accepts_repeated_edits() {
        let a = Args::try_parse_from([
            "tessera",
            "--map-size",
            "64",
            "--place",
            "0,0,8,8:0",
            "--place",
            "4,4,2,2:crate",
            "--remove",
            "1,1,1,1",
            "--threads",
            "2",
        ])
        .unwrap();
        assert_eq!(a.map_size, Some(64));
        assert_eq!(a.place.len(), 2);
        assert_eq!(a.remove, vec![TileRect::new(1, 1, 1, 1)]);
        assert_eq!(a.threads, 2);
    }
}
