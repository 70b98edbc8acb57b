#![doc = include_str!("../README.md")]

mod cell;
mod checkpoint;
mod coords;
mod error;
mod mesh;
mod subdivide;

pub use cell::{Cell, CellId, NOLINK, REGION_LIMIT, Region};
pub use checkpoint::{CELL_RECORD_BYTES, LoadStatus};
pub use coords::LatLng;
pub use error::{InvalidIterations, NewMeshError};
pub use mesh::{GeoMesh, MAX_SUBDIVISIONS, SEED_CELLS, cells_per_iteration};
pub use subdivide::RegionBalance;
