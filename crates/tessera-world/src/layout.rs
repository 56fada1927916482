use tessera_geom::{TilePos, TileRect};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy)
    }
}

/// Index arithmetic for a map split into square chunks. All flattened
/// indices are x-major: `x * extent_y + y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapLayout {
    pub tiles_x: i32,
    pub tiles_y: i32,
    pub chunk_width: i32,
}

impl MapLayout {
    pub fn new(tiles_x: i32, tiles_y: i32, chunk_width: i32) -> Self {
        debug_assert!(chunk_width > 0);
        debug_assert!(tiles_x % chunk_width == 0 && tiles_y % chunk_width == 0);
        Self {
            tiles_x,
            tiles_y,
            chunk_width,
        }
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        (self.tiles_x * self.tiles_y) as usize
    }

    #[inline]
    pub fn chunks_x(&self) -> i32 {
        self.tiles_x / self.chunk_width
    }

    #[inline]
    pub fn chunks_y(&self) -> i32 {
        self.tiles_y / self.chunk_width
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        (self.chunks_x() * self.chunks_y()) as usize
    }

    /// Tiles (and therefore terrain quads or model instances) per chunk.
    #[inline]
    pub fn chunk_tile_count(&self) -> usize {
        (self.chunk_width * self.chunk_width) as usize
    }

    #[inline]
    pub fn map_rect(&self) -> TileRect {
        TileRect::new(0, 0, self.tiles_x, self.tiles_y)
    }

    #[inline]
    pub fn contains_tile(&self, p: TilePos) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.tiles_x && p.y < self.tiles_y
    }

    #[inline]
    pub fn tile_index(&self, p: TilePos) -> usize {
        debug_assert!(self.contains_tile(p), "tile {:?} outside map", p);
        (p.x * self.tiles_y + p.y) as usize
    }

    #[inline]
    pub fn tile_pos(&self, index: usize) -> TilePos {
        let i = index as i32;
        TilePos::new(i / self.tiles_y, i % self.tiles_y)
    }

    /// Height samples sit on tile corners, one more per axis than tiles.
    #[inline]
    pub fn height_index(&self, corner: TilePos) -> usize {
        debug_assert!(
            corner.x >= 0 && corner.y >= 0 && corner.x <= self.tiles_x && corner.y <= self.tiles_y,
            "corner {:?} outside height grid",
            corner
        );
        (corner.x * (self.tiles_y + 1) + corner.y) as usize
    }

    #[inline]
    pub fn chunk_of(&self, p: TilePos) -> ChunkCoord {
        ChunkCoord::new(p.x / self.chunk_width, p.y / self.chunk_width)
    }

    #[inline]
    pub fn chunk_index(&self, c: ChunkCoord) -> usize {
        debug_assert!(c.cx >= 0 && c.cy >= 0 && c.cx < self.chunks_x() && c.cy < self.chunks_y());
        (c.cx * self.chunks_y() + c.cy) as usize
    }

    #[inline]
    pub fn chunk_coord(&self, index: usize) -> ChunkCoord {
        let i = index as i32;
        ChunkCoord::new(i / self.chunks_y(), i % self.chunks_y())
    }

    #[inline]
    pub fn chunk_rect(&self, c: ChunkCoord) -> TileRect {
        TileRect::new(
            c.cx * self.chunk_width,
            c.cy * self.chunk_width,
            self.chunk_width,
            self.chunk_width,
        )
    }

    /// Position-derived slot of a tile inside its chunk's terrain buffer.
    #[inline]
    pub fn slot_in_chunk(&self, p: TilePos) -> usize {
        let lx = p.x % self.chunk_width;
        let ly = p.y % self.chunk_width;
        (lx * self.chunk_width + ly) as usize
    }

    /// Chunks in row-major scan order (`cx` outer, `cy` inner).
    pub fn chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        let (nx, ny) = (self.chunks_x(), self.chunks_y());
        (0..nx).flat_map(move |cx| (0..ny).map(move |cy| ChunkCoord::new(cx, cy)))
    }
}
