//! Column-sorted tile index
//!
//! Level geometry is a flat `Vec<Block>` kept sorted by `(column, row)`.
//! Range queries binary-search that order, so the cost of finding the tiles
//! under the camera does not depend on level length.
//!
//! Blocks are never removed. Collecting a pickup downgrades the block to
//! [`BlockKind::Empty`] in place so indices stay stable for the whole level.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Box2;
use crate::level::SectionMask;

/// What a tile does when touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Wall,
    Point,
    /// Collected pickup; ignored by every query
    Empty,
}

/// One tile of level geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub column: i32,
    pub row: i32,
    pub kind: BlockKind,
}

impl Block {
    #[inline]
    fn key(&self) -> (i32, i32) {
        (self.column, self.row)
    }
}

/// Sorted tile storage for one level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockIndex {
    blocks: Vec<Block>,
    /// Level length in columns (sum of appended section widths)
    length: i32,
    tile_size: f32,
}

impl BlockIndex {
    pub fn new(tile_size: f32) -> Self {
        Self {
            blocks: Vec::new(),
            length: 0,
            tile_size,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Level length in columns
    #[inline]
    pub fn length(&self) -> i32 {
        self.length
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// First index whose column is `>= column`
    pub fn begin_index(&self, column: i32) -> usize {
        self.blocks.partition_point(|b| b.column < column)
    }

    /// First index past the `view_span` columns starting at `column`
    pub fn end_index(&self, column: i32, view_span: i32) -> usize {
        self.begin_index(column.saturating_add(view_span))
    }

    /// World box of the tile at `index`
    pub fn block_box(&self, index: usize) -> Box2 {
        let b = &self.blocks[index];
        let pos = Vec2::new(b.column as f32, b.row as f32) * self.tile_size;
        Box2::from_pos_size(pos, Vec2::splat(self.tile_size))
    }

    /// Overlap between `query` and the wall at `index`
    ///
    /// The tile is moved left by `scroll_delta` so it is expressed in the
    /// frame the query was built in (the start of the tick). Returns
    /// `Box2::EMPTY` for anything that is not a wall.
    pub fn hit(&self, query: &Box2, index: usize, scroll_delta: f32) -> Box2 {
        self.overlap_of_kind(query, index, scroll_delta, BlockKind::Wall)
    }

    /// Same as [`hit`](Self::hit), for pickups
    pub fn pickup(&self, query: &Box2, index: usize, scroll_delta: f32) -> Box2 {
        self.overlap_of_kind(query, index, scroll_delta, BlockKind::Point)
    }

    fn overlap_of_kind(&self, query: &Box2, index: usize, scroll_delta: f32, kind: BlockKind) -> Box2 {
        match self.blocks.get(index) {
            Some(b) if b.kind == kind => {
                let tile = self.block_box(index).translate(Vec2::new(-scroll_delta, 0.0));
                query.intersection(&tile)
            }
            _ => Box2::EMPTY,
        }
    }

    /// Turn the block at `index` into an empty cell
    pub fn clear_block(&mut self, index: usize) {
        if let Some(b) = self.blocks.get_mut(index) {
            b.kind = BlockKind::Empty;
        }
    }

    /// Whether any wall sits on `row` between `begin` and `end` (indices)
    pub fn has_wall_at_row_in_range(&self, row: i32, begin: usize, end: usize) -> bool {
        let end = end.min(self.blocks.len());
        if begin >= end {
            return false;
        }
        self.blocks[begin..end]
            .iter()
            .any(|b| b.row == row && b.kind == BlockKind::Wall)
    }

    /// Append a section to the right end of the level
    ///
    /// Pixels are scanned column by column. The mask is flipped vertically:
    /// its bottom pixel row lands on grid row 0. Pure black becomes a wall,
    /// pure green a pickup, everything else is left empty.
    pub fn append_section(&mut self, mask: &SectionMask) {
        let base = self.length;
        let height = mask.height() as i32;
        let before = self.blocks.len();

        for x in 0..mask.width() {
            for row in 0..height {
                let y = (height - 1 - row) as usize;
                let kind = match mask.pixel(x, y) {
                    SectionMask::WALL => BlockKind::Wall,
                    SectionMask::POINT => BlockKind::Point,
                    _ => continue,
                };
                self.blocks.push(Block {
                    column: base + x as i32,
                    row,
                    kind,
                });
            }
        }
        self.length += mask.width() as i32;

        debug_assert!(self.is_sorted());
        log::debug!(
            "Appended section: {} columns, {} blocks (level length {})",
            mask.width(),
            self.blocks.len() - before,
            self.length
        );
    }

    /// `(column, row)` order holds across the whole array
    pub fn is_sorted(&self) -> bool {
        self.blocks.windows(2).all(|w| w[0].key() < w[1].key())
    }

    /// Number of blocks of the given kind
    pub fn count(&self, kind: BlockKind) -> usize {
        self.blocks.iter().filter(|b| b.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mask(rows: &[&str]) -> SectionMask {
        SectionMask::from_ascii(&rows.join("\n")).unwrap()
    }

    #[test]
    fn test_append_flips_rows() {
        let mut index = BlockIndex::new(48.0);
        index.append_section(&mask(&["#..", "...", ".o."]));

        assert_eq!(index.len(), 2);
        assert_eq!(index.length(), 3);
        // Top-left pixel of a 3-row mask lands on row 2
        assert_eq!(
            *index.block(0).unwrap(),
            Block {
                column: 0,
                row: 2,
                kind: BlockKind::Wall
            }
        );
        assert_eq!(
            *index.block(1).unwrap(),
            Block {
                column: 1,
                row: 0,
                kind: BlockKind::Point
            }
        );
    }

    #[test]
    fn test_begin_index_skips_empty_columns() {
        let mut index = BlockIndex::new(48.0);
        // Walls only in column 1
        index.append_section(&mask(&[".#.", ".#."]));
        assert_eq!(index.begin_index(0), 0);
        assert_eq!(index.begin_index(1), 0);
        assert_eq!(index.begin_index(2), 2);

        let mut index = BlockIndex::new(48.0);
        index.append_section(&mask(&["##.", ".#."]));
        assert_eq!(index.begin_index(0), 0);
        assert_eq!(index.begin_index(1), 1);
        assert_eq!(index.begin_index(2), 3);
    }

    #[test]
    fn test_ranges_past_end_are_empty() {
        let mut index = BlockIndex::new(48.0);
        index.append_section(&mask(&["#o#"]));
        assert_eq!(index.begin_index(100), index.len());
        assert_eq!(index.end_index(100, 41), index.len());
        assert_eq!(index.begin_index(-50), 0);
        assert!(!index.has_wall_at_row_in_range(0, 3, 10));
    }

    #[test]
    fn test_end_index_spans_view() {
        let mut index = BlockIndex::new(10.0);
        index.append_section(&mask(&["#####"]));
        assert_eq!(index.end_index(0, 2), 2);
        assert_eq!(index.end_index(1, 3), 4);
    }

    #[test]
    fn test_sections_concatenate() {
        let mut index = BlockIndex::new(48.0);
        index.append_section(&mask(&["#.", ".#"]));
        index.append_section(&mask(&["o#", ".."]));
        assert_eq!(index.length(), 4);
        assert!(index.is_sorted());
        let cols: Vec<i32> = index.iter().map(|b| b.column).collect();
        assert_eq!(cols, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_block_box() {
        let mut index = BlockIndex::new(48.0);
        index.append_section(&mask(&[".#", ".."]));
        let b = index.block_box(0);
        assert_eq!(b.min, Vec2::new(48.0, 48.0));
        assert_eq!(b.max, Vec2::new(96.0, 96.0));
    }

    #[test]
    fn test_hit_shifts_tile_by_scroll_delta() {
        let mut index = BlockIndex::new(10.0);
        index.append_section(&mask(&[".#"]));
        // Tile spans x in [10, 20]; query sits just left of it
        let query = Box2::new(Vec2::new(4.0, 0.0), Vec2::new(9.0, 10.0));
        assert!(index.hit(&query, 0, 0.0).is_empty());
        let shifted = index.hit(&query, 0, 3.0);
        assert!(!shifted.is_empty());
        assert!((shifted.width() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_hit_and_pickup_filter_kinds() {
        let mut index = BlockIndex::new(10.0);
        index.append_section(&mask(&["#o"]));
        let query = Box2::new(Vec2::new(0.0, 0.0), Vec2::new(20.0, 10.0));
        assert!(!index.hit(&query, 0, 0.0).is_empty());
        assert!(index.pickup(&query, 0, 0.0).is_empty());
        assert!(index.hit(&query, 1, 0.0).is_empty());
        assert!(!index.pickup(&query, 1, 0.0).is_empty());
    }

    #[test]
    fn test_clear_block_is_permanent() {
        let mut index = BlockIndex::new(10.0);
        index.append_section(&mask(&["#o"]));
        let query = Box2::new(Vec2::new(0.0, 0.0), Vec2::new(20.0, 10.0));
        index.clear_block(1);
        index.clear_block(1);
        assert!(index.pickup(&query, 1, 0.0).is_empty());
        assert!(index.hit(&query, 1, 0.0).is_empty());
        assert_eq!(index.len(), 2);
        index.clear_block(0);
        assert!(index.hit(&query, 0, 0.0).is_empty());
    }

    #[test]
    fn test_has_wall_at_row_in_range() {
        let mut index = BlockIndex::new(10.0);
        index.append_section(&mask(&["o..", "..#"]));
        let end = index.len();
        assert!(index.has_wall_at_row_in_range(0, 0, end));
        assert!(!index.has_wall_at_row_in_range(1, 0, end));
        index.clear_block(1);
        assert!(!index.has_wall_at_row_in_range(0, 0, end));
    }

    fn arb_mask() -> impl Strategy<Value = SectionMask> {
        (1usize..6, 1usize..6).prop_flat_map(|(w, h)| {
            prop::collection::vec(prop::sample::select(vec!['#', 'o', '.', '.']), w * h).prop_map(
                move |cells| {
                    let text: Vec<String> = cells
                        .chunks(w)
                        .map(|row| row.iter().collect::<String>())
                        .collect();
                    SectionMask::from_ascii(&text.join("\n")).unwrap()
                },
            )
        })
    }

    proptest! {
        #[test]
        fn prop_append_keeps_order(masks in prop::collection::vec(arb_mask(), 1..6)) {
            let mut index = BlockIndex::new(16.0);
            let mut total = 0;
            for m in &masks {
                index.append_section(m);
                total += m.width() as i32;
            }
            prop_assert!(index.is_sorted());
            prop_assert_eq!(index.length(), total);

            for col in -1..=total + 1 {
                let begin = index.begin_index(col);
                prop_assert!(index.iter().take(begin).all(|b| b.column < col));
                prop_assert!(index.iter().skip(begin).all(|b| b.column >= col));
            }
        }
    }
}
