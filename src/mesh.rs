
mod seed;

use glam::Vec3;
use rand::Rng;

use crate::cell::{Cell, CellId, NOLINK};
use crate::error::{InvalidIterations, NewMeshError};
use crate::subdivide::RegionBalance;

/// Number of cells written by [`GeoMesh::seed_icosahedron`].
pub const SEED_CELLS: CellId = 12;

/// Deepest refinement this build supports. Chosen so that the cell count
/// still fits [`CellId`]; the face count already does not.
pub const MAX_SUBDIVISIONS: u32 = 14;

/// Number of live cells after `iterations` refinement passes starting from
/// the icosahedron.
///
/// Seeds: 12 cells, 20 faces. Each pass quadruples the face count and adds
/// one cell per edge (`E = 3F / 2`).
pub const fn cells_per_iteration(iterations: u32) -> CellId {
    let mut cells: u64 = 12;
    let mut faces: u64 = 20;
    let mut pass = 0;

    while pass < iterations {
        cells += faces * 3 / 2;
        faces *= 4;
        pass += 1;
    }

    cells as CellId
}

/// A geodesic polyhedron under construction: a flat store of [`Cell`]
/// records whose live prefix of [`extant`](Self::extant) cells forms a
/// fully linked mesh. Indices past the live prefix are reserved for future
/// passes and hold no meaningful data.
///
/// The store is allocated once, sized for a target pass count; seeding,
/// subdividing, and terrain perturbation all work in place.
#[derive(Debug)]
pub struct GeoMesh {
    pub(crate) cells: Box<[Cell]>,
    pub(crate) extant: CellId,
}

impl GeoMesh {
    /// Allocates an empty store large enough to subdivide `iterations`
    /// times. This is the only allocation the mesh ever makes; a failed
    /// reservation is reported instead of aborting the process.
    pub fn with_iterations(iterations: u32) -> Result<Self, NewMeshError> {
        if iterations > MAX_SUBDIVISIONS {
            return Err(InvalidIterations::new(iterations, "exceeds MAX_SUBDIVISIONS").into());
        }

        let capacity = cells_per_iteration(iterations) as usize;
        let mut cells = Vec::new();
        cells.try_reserve_exact(capacity)?;
        cells.resize(capacity, Cell::default());

        Ok(Self {
            cells: cells.into_boxed_slice(),
            extant: 0,
        })
    }

    /// Number of live cells.
    pub fn extant(&self) -> CellId {
        self.extant
    }

    /// Total number of cell slots, live or reserved.
    pub fn capacity(&self) -> CellId {
        self.cells.len() as CellId
    }

    /// The live cells, in creation order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells[..self.extant as usize]
    }

    /// Borrows a live cell.
    pub fn cell(&self, id: CellId) -> &Cell {
        assert!(id < self.extant, "Cell {} is not live.", id);
        &self.cells[id as usize]
    }

    /// Mutably borrows a live cell, e.g. for an external terrain generator
    /// reshaping `v`.
    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        assert!(id < self.extant, "Cell {} is not live.", id);
        &mut self.cells[id as usize]
    }

    /// Iterator over the undirected edges of the live mesh, each reported
    /// once with the lower id first.
    pub fn edges(&self) -> impl Iterator<Item = (CellId, CellId)> + '_ {
        self.cells().iter().enumerate().flat_map(|(id, cell)| {
            cell.link
                .into_iter()
                .filter(move |&neighbor| neighbor != NOLINK && (id as CellId) < neighbor)
                .map(move |neighbor| (id as CellId, neighbor))
        })
    }

    /// Writes the twelve icosahedron seed cells into an empty store. Each
    /// seed keeps five neighbours and one open spoke, carries its own id as
    /// its region, and credits that region in `balance`.
    pub fn seed_icosahedron(&mut self, balance: &mut RegionBalance) {
        assert_eq!(self.extant, 0, "Store has already been seeded.");

        for (id, cell) in seed::icosahedron().into_iter().enumerate() {
            balance.credit(cell.region);
            self.cells[id] = cell;
        }

        self.extant = SEED_CELLS;
    }

    /// Radially raises or lowers every live vertex by a fixed factor
    /// depending on which side of a random plane it falls, after Hugo
    /// Elias' fractal planet recipe. Applied repeatedly this builds up an
    /// elevation field over the vertex set.
    ///
    /// This deliberately moves vertices off the unit sphere.
    pub fn perturb<R: Rng>(&mut self, rng: &mut R) {
        let plane = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        let flip = rng.random_range(-1.0..1.0_f32) < 0.0;

        for cell in &mut self.cells[..self.extant as usize] {
            if (plane.dot(cell.v - plane) > 0.0) != flip {
                cell.v *= 1.0001;
            } else {
                cell.v /= 1.0001;
            }
        }
    }
}
