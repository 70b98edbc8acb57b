use glam::Vec3;
use itertools::Itertools;

use crate::cell::{Cell, CellId, Region};
use crate::mesh::SEED_CELLS;

// Counterclockwise as seen from outside the sphere; spoke 5 stays open.
const SEED_LINKS: [[CellId; 5]; SEED_CELLS as usize] = [
    [1, 5, 2, 4, 3],
    [0, 3, 6, 7, 5],
    [0, 5, 9, 8, 4],
    [0, 4, 10, 6, 1],
    [0, 2, 8, 10, 3],
    [0, 1, 7, 9, 2],
    [11, 7, 1, 3, 10],
    [11, 9, 5, 1, 6],
    [11, 10, 4, 2, 9],
    [11, 8, 2, 5, 7],
    [11, 6, 3, 4, 8],
    [6, 10, 8, 9, 7],
];

pub(crate) fn icosahedron() -> [Cell; SEED_CELLS as usize] {
    /*
    Golden-ratio construction: the vertices are the corners of three
    mutually orthogonal rectangles with aspect ratio t = (1 + sqrt 5) / 2,
    scaled by d = sqrt(1 + t^2) so they land on the unit sphere.
    */
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let d = (1.0 + t * t).sqrt();
    let tau = t / d;
    let one = 1.0 / d;

    let positions = [
        Vec3::new(one, 0.0, tau),
        Vec3::new(-one, 0.0, tau),
        Vec3::new(tau, -one, 0.0),
        Vec3::new(0.0, tau, one),
        Vec3::new(tau, one, 0.0),
        Vec3::new(0.0, -tau, one),
        Vec3::new(-tau, one, 0.0),
        Vec3::new(-tau, -one, 0.0),
        Vec3::new(one, 0.0, -tau),
        Vec3::new(0.0, -tau, -one),
        Vec3::new(0.0, tau, -one),
        Vec3::new(-one, 0.0, -tau),
    ];

    let mut cells = [Cell::default(); SEED_CELLS as usize];

    for (id, (v, links)) in positions.into_iter().zip_eq(SEED_LINKS).enumerate() {
        cells[id].v = v.normalize();
        cells[id].link[..5].copy_from_slice(&links);
        cells[id].region = id as Region;
    }

    cells
}
