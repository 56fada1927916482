use tessera_geom::TileRect;
use tessera_world::{ChunkCoord, MapLayout};

/// The part of an edit rectangle that falls inside one chunk, in map tile
/// coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRect {
    pub chunk: ChunkCoord,
    pub rect: TileRect,
}

impl ChunkRect {
    /// Same rectangle relative to the chunk origin.
    pub fn local(&self, layout: &MapLayout) -> TileRect {
        let o = layout.chunk_rect(self.chunk);
        TileRect::new(self.rect.x - o.x, self.rect.y - o.y, self.rect.w, self.rect.h)
    }
}

/// Clips `rect` against every chunk in row-major chunk order (`cx` outer).
/// Chunks the rectangle misses produce nothing.
pub fn split_rect(layout: &MapLayout, rect: TileRect) -> Vec<ChunkRect> {
    if rect.is_empty() {
        return Vec::new();
    }
    layout
        .chunks()
        .filter_map(|chunk| {
            layout
                .chunk_rect(chunk)
                .intersect(&rect)
                .map(|r| ChunkRect { chunk, rect: r })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_across_four_chunks() {
        let l = MapLayout::new(8, 8, 4);
        let parts = split_rect(&l, TileRect::new(3, 2, 3, 4));
        assert_eq!(
            parts,
            vec![
                ChunkRect {
                    chunk: ChunkCoord::new(0, 0),
                    rect: TileRect::new(3, 2, 1, 2)
                },
                ChunkRect {
                    chunk: ChunkCoord::new(0, 1),
                    rect: TileRect::new(3, 4, 1, 2)
                },
                ChunkRect {
                    chunk: ChunkCoord::new(1, 0),
                    rect: TileRect::new(4, 2, 2, 2)
                },
                ChunkRect {
                    chunk: ChunkCoord::new(1, 1),
                    rect: TileRect::new(4, 4, 2, 2)
                },
            ]
        );
        assert_eq!(parts[3].local(&l), TileRect::new(0, 0, 2, 2));
    }

    #[test]
    fn outside_or_empty_yields_nothing() {
        let l = MapLayout::new(8, 8, 4);
        assert!(split_rect(&l, TileRect::new(8, 0, 4, 4)).is_empty());
        assert!(split_rect(&l, TileRect::new(0, 0, 0, 4)).is_empty());
        assert!(split_rect(&l, TileRect::new(-3, -3, 2, 2)).is_empty());
    }
}
