use anyhow::Context;
use tracing::instrument;
use crate::AssetManager;
use crate::tileset::Tileset;
use super::{TileMap, TileRef, TilesetEntry};

/// A map together with its tilesets, answering which cells block movement or can be destroyed.
#[derive(Clone, PartialEq, Debug)]
pub struct Level {
    pub map: TileMap,
    /// Same order as the map's tileset entries.
    pub tilesets: Vec<Tileset>,
}

impl Level {

    pub fn new(map: TileMap, tilesets: Vec<Tileset>) -> Self {
        Self { map, tilesets }
    }

    /// Loads a map, then every tileset it references relative to the map's directory.
    #[instrument(skip_all)]
    pub fn load(manager: &AssetManager, map_path: &str) -> anyhow::Result<Self> {
        let path = manager.parse_path(map_path)?;
        let map = manager.load_path::<TileMap>(&path)?;
        let mut tilesets = Vec::with_capacity(map.tilesets.len());
        for entry in &map.tilesets {
            let tileset = match entry {
                TilesetEntry::Internal { tileset, .. } => tileset.clone(),
                TilesetEntry::External { source, .. } => {
                    let tileset_path = path.join(source)?;
                    manager
                        .load_path::<Tileset>(&tileset_path)
                        .with_context(|| format!("Failed to load tileset of map {path}"))?
                },
            };
            tilesets.push(tileset);
        }
        log::info!("Loaded level '{}' ({}x{}, {} tilesets)", map.title(), map.width, map.height, tilesets.len());
        Ok(Self { map, tilesets })
    }

    pub fn width(&self) -> u32 { self.map.width }
    pub fn height(&self) -> u32 { self.map.height }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.map.width && (y as u32) < self.map.height
    }

    /// Tile placed at a cell of a layer.
    /// None if the cell is empty, out of bounds, or its gid belongs to no tileset.
    pub fn tile_at(&self, layer: usize, x: i32, y: i32) -> Option<TileRef> {
        let gid = self.map.layers.get(layer)?.gid_at(x, y)?;
        self.map.resolve(gid)
    }

    pub fn tileset(&self, tile: TileRef) -> Option<&Tileset> {
        self.tilesets.get(tile.tileset_index)
    }

    /// True if a tile on any layer at the cell has the bool property set.
    /// Absent properties are false.
    pub fn flag_at(&self, x: i32, y: i32, name: &str) -> bool {
        (0..self.map.layers.len())
            .filter_map(|layer| self.tile_at(layer, x, y))
            .any(|tile| match self.tileset(tile) {
                Some(tileset) => tileset.flag(tile.tile_id, name),
                None => false,
            })
    }

    /// Cells outside the map always block.
    pub fn is_blocking(&self, x: i32, y: i32) -> bool {
        !self.in_bounds(x, y) || self.flag_at(x, y, "blocking")
    }

    pub fn is_destroyable(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.flag_at(x, y, "destroyable")
    }

    /// Blocking state of every cell, row by row.
    pub fn blocking_grid(&self) -> Vec<Vec<bool>> {
        (0..self.map.height as i32)
            .map(|y| (0..self.map.width as i32).map(|x| self.is_blocking(x, y)).collect())
            .collect()
    }

    /// One line per row: `%` for destroyable blocks, `#` for other blocking cells, `.` for free ones.
    pub fn render_grid(&self) -> String {
        let mut text = String::new();
        for y in 0..self.map.height as i32 {
            for x in 0..self.map.width as i32 {
                text.push(match (self.is_blocking(x, y), self.is_destroyable(x, y)) {
                    (true, true) => '%',
                    (true, false) => '#',
                    (false, _) => '.',
                });
            }
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod test {
    use crate::{AssetManager, MemoryProtocol};
    use crate::map::{JsonMapLoader, TileMap, TileRef, TmxLoader};
    use crate::tileset::{JsonTilesetLoader, Tileset, TsxLoader};
    use super::Level;

    const CLASSIC_TSX: &str = include_str!("../../assets/tileset_classic.tsx");
    const CLASSIC_TMX: &str = include_str!("../../assets/classic.tmx");
    const CLASSIC_JSON: &str = include_str!("../../assets/classic.json");

    fn manager() -> AssetManager {
        let protocol = MemoryProtocol::default()
            .with_file("levels/tileset_classic.tsx", CLASSIC_TSX)
            .with_file("levels/classic.tmx", CLASSIC_TMX)
            .with_file("levels/classic.json", CLASSIC_JSON);
        let mut manager = AssetManager::new();
        manager.add_protocol(protocol, true);
        manager.try_add_loader(TsxLoader).unwrap();
        manager.try_add_loader(JsonTilesetLoader).unwrap();
        manager.try_add_loader(TmxLoader).unwrap();
        manager.try_add_loader(JsonMapLoader).unwrap();
        manager
    }

    fn classic() -> Level {
        let map = TileMap::parse_str(CLASSIC_TMX).unwrap();
        let tileset = Tileset::parse_str(CLASSIC_TSX).unwrap();
        Level::new(map, vec![tileset])
    }

    #[test]
    fn load_resolves_tilesets_next_to_the_map() {
        let manager = manager();
        let from_tmx = Level::load(&manager, "levels/classic.tmx").unwrap();
        let from_json = Level::load(&manager, "levels/classic.json").unwrap();
        assert_eq!(classic(), from_tmx);
        assert_eq!(from_tmx.tilesets, from_json.tilesets);
        assert_eq!(from_tmx.blocking_grid(), from_json.blocking_grid());
    }

    #[test]
    fn load_missing_tileset() {
        let protocol = MemoryProtocol::default().with_file("classic.tmx", CLASSIC_TMX);
        let mut manager = AssetManager::new();
        manager.add_protocol(protocol, true);
        manager.try_add_loader(TmxLoader).unwrap();
        manager.try_add_loader(TsxLoader).unwrap();
        assert!(Level::load(&manager, "classic.tmx").is_err());
    }

    #[test]
    fn tiles() {
        let level = classic();
        assert_eq!(Some(TileRef { tileset_index: 0, tile_id: 0 }), level.tile_at(0, 0, 0));
        assert_eq!(Some(TileRef { tileset_index: 0, tile_id: 1 }), level.tile_at(0, 3, 1));
        assert_eq!(None, level.tile_at(0, 1, 1));
        assert_eq!(None, level.tile_at(1, 0, 0));
        assert_eq!(None, level.tile_at(0, 7, 0));
    }

    #[test]
    fn flags() {
        let level = classic();

        // Wall
        assert!(level.is_blocking(0, 0));
        assert!(!level.is_destroyable(0, 0));

        // Bricks
        assert!(level.is_blocking(3, 1));
        assert!(level.is_destroyable(3, 1));
        assert!(level.is_destroyable(3, 2));

        // Empty cell, and tiles without properties
        assert!(!level.is_blocking(1, 1));
        assert!(!level.is_blocking(3, 3));
        assert!(!level.is_blocking(5, 3));
        assert!(!level.flag_at(3, 3, "destroyable"));

        // Outside of the map
        assert!(level.is_blocking(-1, 2));
        assert!(level.is_blocking(7, 2));
        assert!(level.is_blocking(2, 5));
        assert!(!level.is_destroyable(-1, 2));
    }

    #[test]
    fn blocking_grid() {
        let grid = classic().blocking_grid();
        assert_eq!(5, grid.len());
        assert_eq!(vec![true; 7], grid[0]);
        assert_eq!(vec![true, false, false, true, false, false, true], grid[1]);
        assert_eq!(vec![true, false, true, true, true, false, true], grid[2]);
        assert_eq!(vec![true, false, false, false, false, false, true], grid[3]);
    }

    #[test]
    fn render_grid() {
        let expected = "\
#######
#..%..#
#.#%#.#
#.....#
#######
";
        assert_eq!(expected, classic().render_grid());
    }
}
