//! Collage layout: a fixed portrait template and a first-fit landscape packer.

use crate::draw::{Canvas, Content, Path, Theme};
use crate::geom::{Orientation, Point, Rect, Size};
use crate::region::{Hit, Surface};
use fastrand::Rng;
use std::collections::BTreeSet;

pub const LANDSCAPE_ROWS: usize = 4;
/// Item that always gets the large cell.
pub const CENTER_ITEM: usize = 4;
pub const MAX_EXTRA_LARGE: usize = 5;
/// Icons are over-scaled to crop the empty margins most launcher icons carry.
pub const ICON_ZOOM: f64 = 1.4;
/// Stand-in intrinsic size for icons that report none.
pub const FALLBACK_ICON_SIZE: f64 = 100.0;

/// Portrait slots as `(col, row, width, height)` in grid units on a 4×4 square.
pub const PORTRAIT_TEMPLATE: [(f64, f64, f64, f64); 12] = [
    (0.0, 0.0, 1.0, 1.0),
    (1.0, 0.0, 1.0, 1.0),
    (2.0, 0.0, 1.0, 1.0),
    (3.0, 0.0, 1.0, 1.0),
    (1.0, 1.0, 2.0, 2.0),
    (0.0, 1.0, 1.0, 1.0),
    (3.0, 1.0, 1.0, 1.0),
    (0.0, 2.0, 1.0, 1.0),
    (3.0, 2.0, 1.0, 1.0),
    (0.0, 3.0, 1.0, 1.0),
    (1.0, 3.0, 1.5, 1.0),
    (2.5, 3.0, 1.5, 1.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub bounds: Rect,
    pub item_index: usize,
    pub is_large: bool,
}

impl Tile {
    pub fn paint(&self, canvas: &mut dyn Canvas, content: &Content, theme: &Theme) {
        let outline = Path::rect(self.bounds);
        canvas.fill_path(&outline, theme.tile);

        match content {
            Content::Icon { key, intrinsic } => {
                canvas.clip(&outline);
                canvas.icon(key, cover_rect(self.bounds, *intrinsic));
                canvas.restore();
            }
            Content::Label(label) => canvas.text(
                label,
                self.bounds.center(),
                self.bounds.height.min(self.bounds.width) / 6.0,
                theme.label,
            ),
            Content::Empty => {}
        }

        canvas.stroke_path(&outline, theme.border, theme.border_width);
    }
}

/// Destination for an icon that covers `bounds` (cropping overflow), zoomed by [`ICON_ZOOM`].
pub fn cover_rect(bounds: Rect, intrinsic: Option<(f64, f64)>) -> Rect {
    let (w, h) = intrinsic
        .filter(|(w, h)| *w > 0.0 && *h > 0.0)
        .unwrap_or((FALLBACK_ICON_SIZE, FALLBACK_ICON_SIZE));
    let scale = (bounds.width / w).max(bounds.height / h) * ICON_ZOOM;
    let (dw, dh) = (w * scale, h * scale);
    let c = bounds.center();
    Rect::new(c.x - dw / 2.0, c.y - dh / 2.0, dw, dh)
}

/// Item indices that ask for a 2×2 tile in landscape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LargeIndexSet(BTreeSet<usize>);

impl Default for LargeIndexSet {
    fn default() -> Self {
        Self(BTreeSet::from([CENTER_ITEM]))
    }
}

impl LargeIndexSet {
    /// [`CENTER_ITEM`] plus up to [`MAX_EXTRA_LARGE`] random others below `item_count`.
    pub fn choose(item_count: usize, rng: &mut Rng) -> Self {
        let mut candidates: Vec<usize> = (0..item_count).filter(|&i| i != CENTER_ITEM).collect();
        rng.shuffle(&mut candidates);
        let mut set = Self::default();
        set.0.extend(candidates.into_iter().take(MAX_EXTRA_LARGE));
        set
    }

    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::default();
        set.0.extend(indices);
        set
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which cells are taken during a single packing pass.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Grids whose cell count overflows `usize` come out with no columns.
    pub fn new(rows: usize, cols: usize) -> Self {
        let cols = if rows.checked_mul(cols).is_some() { cols } else { 0 };
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.cols + col]
    }

    /// First free cell scanning rows top to bottom, each left to right.
    pub fn find_next_free(&self) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .position(|taken| !taken)
            .map(|i| (i / self.cols, i % self.cols))
    }

    pub fn is_block_free(&self, row: usize, col: usize, height: usize, width: usize) -> bool {
        row + height <= self.rows
            && col + width <= self.cols
            && (row..row + height)
                .all(|r| (col..col + width).all(|c| !self.is_occupied(r, c)))
    }

    pub fn occupy(&mut self, row: usize, col: usize, height: usize, width: usize) {
        for r in row..row + height {
            for c in col..col + width {
                self.cells[r * self.cols + c] = true;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPacker {
    pub landscape_rows: usize,
}

impl Default for GridPacker {
    fn default() -> Self {
        Self {
            landscape_rows: LANDSCAPE_ROWS,
        }
    }
}

impl GridPacker {
    pub fn pack(&self, viewport: Size, item_count: usize, large: &LargeIndexSet) -> GridLayout {
        let tiles = if viewport.is_empty() || !viewport.is_finite() {
            Vec::new()
        } else {
            match viewport.orientation() {
                Orientation::Portrait => Self::pack_portrait(viewport, item_count),
                Orientation::Landscape => self.pack_landscape(viewport, item_count, large),
            }
        };
        GridLayout { viewport, tiles }
    }

    /// The template ignores `LargeIndexSet`; slot 4 is always the 2×2.
    fn pack_portrait(viewport: Size, item_count: usize) -> Vec<Tile> {
        let side = viewport.min_side();
        let start_x = (viewport.width - side) / 2.0;
        let start_y = (viewport.height - side) / 2.0;
        let c = side / 4.0;

        PORTRAIT_TEMPLATE
            .iter()
            .take(item_count)
            .enumerate()
            .map(|(item_index, &(col, row, w, h))| Tile {
                bounds: Rect::new(start_x + col * c, start_y + row * c, w * c, h * c),
                item_index,
                is_large: item_index == CENTER_ITEM,
            })
            .collect()
    }

    fn pack_landscape(
        &self,
        viewport: Size,
        item_count: usize,
        large: &LargeIndexSet,
    ) -> Vec<Tile> {
        let rows = self.landscape_rows.max(1);
        let cell = viewport.height / rows as f64;
        let cols = (viewport.width / cell).floor() as usize;
        let start_x = (viewport.width - cols as f64 * cell) / 2.0;
        // row-major filling never puts item k past column 2k
        let reachable = cols.min(item_count.saturating_mul(2));
        let mut grid = OccupancyGrid::new(rows, reachable);
        let mut tiles = Vec::new();

        for item_index in 0..item_count {
            let Some((row, col)) = grid.find_next_free() else {
                log::debug!(
                    "Grid full: dropped {} of {} items",
                    item_count - item_index,
                    item_count
                );
                break;
            };
            let span = if large.contains(item_index) && grid.is_block_free(row, col, 2, 2) {
                2
            } else {
                1
            };
            grid.occupy(row, col, span, span);
            tiles.push(Tile {
                bounds: Rect::new(
                    start_x + col as f64 * cell,
                    row as f64 * cell,
                    span as f64 * cell,
                    span as f64 * cell,
                ),
                item_index,
                is_large: span == 2,
            });
        }
        tiles
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridLayout {
    viewport: Size,
    tiles: Vec<Tile>,
}

impl GridLayout {
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_for(&self, item_index: usize) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.item_index == item_index)
    }
}

impl Surface for GridLayout {
    fn hit_test(&self, point: Point) -> Option<Hit> {
        self.tiles
            .iter()
            .find(|t| t.bounds.contains(point))
            .map(|t| Hit { slot: t.item_index })
    }

    fn paint(
        &self,
        canvas: &mut dyn Canvas,
        content: &dyn Fn(usize) -> Content,
        theme: &Theme,
        _rotation_deg: f64,
    ) {
        for tile in &self.tiles {
            tile.paint(canvas, &content(tile.item_index), theme);
        }
    }
}
