//! The parcel grid and its mutation API.

use rustc_hash::FxHashSet;

use crate::{GridError, GridResult};

// ── Coord ─────────────────────────────────────────────────────────────────────

/// Integer coordinates of one parcel.  Value identity: two `Coord`s over the
/// same parcel are interchangeable everywhere in the workspace.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: u16,
    pub y: u16,
}

impl Coord {
    #[inline]
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Surface ───────────────────────────────────────────────────────────────────

/// The surface state of a parcel.
///
/// Paved parcels form the road network; built parcels belong to off-grid
/// locations.  A parcel is never both.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Surface {
    #[default]
    Unpaved,
    Paved,
    Built,
}

// ── ParcelGrid ────────────────────────────────────────────────────────────────

/// Fixed-size 2-D field of parcels.
///
/// Dimensions are fixed at construction.  Surfaces are stored row-major in a
/// single `Vec`; entry parcels in a hash set keyed by coordinate.
pub struct ParcelGrid {
    width:         u16,
    height:        u16,
    surface:       Vec<Surface>,
    entry_parcels: FxHashSet<Coord>,
}

impl ParcelGrid {
    /// Construct a grid of `width × height` unpaved parcels.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            surface: vec![Surface::Unpaved; width as usize * height as usize],
            entry_parcels: FxHashSet::default(),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    fn idx(&self, c: Coord) -> usize {
        c.y as usize * self.width as usize + c.x as usize
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The parcel at `(x, y)`, or `None` when out of bounds.
    pub fn parcel(&self, x: u16, y: u16) -> Option<Coord> {
        (x < self.width && y < self.height).then(|| Coord::new(x, y))
    }

    /// Whether `c` lies inside the grid.
    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        c.x < self.width && c.y < self.height
    }

    /// The up-to-four orthogonal neighbors of `c`, in-bounds only.
    ///
    /// Corner parcels have 2 neighbors, edge parcels 3, interior parcels 4.
    pub fn neighbors(&self, c: Coord) -> Vec<Coord> {
        let mut out = Vec::with_capacity(4);
        if c.y + 1 < self.height {
            out.push(Coord::new(c.x, c.y + 1));
        }
        if c.y > 0 {
            out.push(Coord::new(c.x, c.y - 1));
        }
        if c.x > 0 {
            out.push(Coord::new(c.x - 1, c.y));
        }
        if c.x + 1 < self.width {
            out.push(Coord::new(c.x + 1, c.y));
        }
        out
    }

    /// The paved orthogonal neighbors of `c`.
    pub fn paved_neighbors(&self, c: Coord) -> Vec<Coord> {
        self.neighbors(c).into_iter().filter(|&n| self.is_paved(n)).collect()
    }

    #[inline]
    pub fn is_paved(&self, c: Coord) -> bool {
        self.contains(c) && self.surface[self.idx(c)] == Surface::Paved
    }

    #[inline]
    pub fn is_built(&self, c: Coord) -> bool {
        self.contains(c) && self.surface[self.idx(c)] == Surface::Built
    }

    pub fn surface(&self, c: Coord) -> Option<Surface> {
        self.contains(c).then(|| self.surface[self.idx(c)])
    }

    /// Iterator over all coordinates, row by row.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Coord::new(x, y)))
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Pave `c`, making it part of the road network.
    ///
    /// Built parcels belong to locations and cannot become roads.
    pub fn pave(&mut self, c: Coord) -> GridResult<()> {
        if !self.contains(c) {
            return Err(GridError::OutOfBounds(c));
        }
        if self.is_built(c) {
            return Err(GridError::SurfaceConflict { parcel: c, surface: Surface::Built });
        }
        let i = self.idx(c);
        self.surface[i] = Surface::Paved;
        Ok(())
    }

    /// Build on `c`, making it part of an off-grid location.
    ///
    /// Paved parcels are road and cannot be built over.
    pub fn build(&mut self, c: Coord) -> GridResult<()> {
        if !self.contains(c) {
            return Err(GridError::OutOfBounds(c));
        }
        if self.is_paved(c) {
            return Err(GridError::SurfaceConflict { parcel: c, surface: Surface::Paved });
        }
        let i = self.idx(c);
        self.surface[i] = Surface::Built;
        Ok(())
    }

    // ── Entry parcels ─────────────────────────────────────────────────────

    /// Declare a paved parcel as a network entry point.
    ///
    /// Entry parcels are where off-grid locations attach; the network builder
    /// promotes every entry parcel to a crossing.
    pub fn add_entry_parcel(&mut self, c: Coord) -> GridResult<()> {
        if !self.is_paved(c) {
            return Err(GridError::EntryNotPaved(c));
        }
        self.entry_parcels.insert(c);
        Ok(())
    }

    #[inline]
    pub fn is_entry_parcel(&self, c: Coord) -> bool {
        self.entry_parcels.contains(&c)
    }

    pub fn entry_parcels(&self) -> impl Iterator<Item = Coord> + '_ {
        self.entry_parcels.iter().copied()
    }

    // ── Debug rendering ───────────────────────────────────────────────────

    /// ASCII map of the grid, top row first: `.` unpaved, `R` paved, `B` built.
    pub fn render_map(&self) -> String {
        let mut out = String::with_capacity((self.width as usize * 2 + 1) * self.height as usize);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let ch = match self.surface[self.idx(Coord::new(x, y))] {
                    Surface::Unpaved => '.',
                    Surface::Paved => 'R',
                    Surface::Built => 'B',
                };
                out.push(ch);
                if x + 1 < self.width {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out
    }
}
