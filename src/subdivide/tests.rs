use assert2::check;
use itertools::Itertools;
use ntest::timeout;

use crate::cell::{CellId, NOLINK, REGION_LIMIT};
use crate::mesh::{GeoMesh, cells_per_iteration};
use crate::subdivide::RegionBalance;

fn subdivided(iterations: u32) -> GeoMesh {
    let mut mesh = GeoMesh::with_iterations(iterations).unwrap();
    let mut balance = RegionBalance::new();

    mesh.seed_icosahedron(&mut balance);

    for _ in 0..iterations {
        mesh.subdivide(&mut balance);
    }

    mesh
}

fn check_mutual_linkage(mesh: &GeoMesh) {
    for (id, cell) in mesh.cells().iter().enumerate() {
        for neighbor in cell.link {
            if neighbor == NOLINK {
                continue;
            }

            let back = mesh
                .cell(neighbor)
                .link
                .iter()
                .filter(|&&link| link == id as CellId)
                .count();

            check!(back == 1, "Cell {} links to {}, which must link back exactly once.", id, neighbor);
        }
    }
}

fn check_pentagon_count(mesh: &GeoMesh) {
    let pentagons = mesh.cells().iter().filter(|cell| cell.is_pentagon()).count();
    check!(pentagons == 12, "Exactly the twelve seeds stay pentagonal.");

    let open = mesh
        .cells()
        .iter()
        .flat_map(|cell| cell.link)
        .filter(|&link| link == NOLINK)
        .count();
    check!(open == 12, "No open spoke may appear outside the seeds.");
}

fn check_unit_sphere(mesh: &GeoMesh) {
    for (id, cell) in mesh.cells().iter().enumerate() {
        check!(
            (cell.v.length() - 1.0).abs() <= 1.0e-6,
            "Cell {} must lie on the unit sphere.",
            id
        );
    }
}

fn check_midpoint_identity(mesh: &GeoMesh) {
    for (id, cell) in mesh.cells().iter().enumerate().skip(12) {
        let anchor = (mesh.cell(cell.parent()).v + mesh.cell(cell.child()).v).normalize();
        check!(
            cell.v.distance(anchor) <= 1.0e-5,
            "Cell {} must sit at the midpoint of its parent-child edge.",
            id
        );
    }
}

fn check_region_domain(mesh: &GeoMesh) {
    let limit = mesh.extant().min(REGION_LIMIT);

    for (id, cell) in mesh.cells().iter().enumerate() {
        check!(
            (cell.region as CellId) < limit,
            "Cell {} carries a region outside the live domain.",
            id
        );
    }
}

#[test]
fn one_pass() {
    let mesh = subdivided(1);

    check!(mesh.extant() == 42, "One pass must grow the icosahedron to 42 cells.");
    check_pentagon_count(&mesh);
    check_mutual_linkage(&mesh);
    check_unit_sphere(&mesh);

    let midpoints = mesh
        .cells()
        .iter()
        .positions(|cell| cell.joins(0, 1))
        .collect_vec();
    check!(midpoints.len() == 1, "Edge (0, 1) must have exactly one midpoint.");

    let midpoint = mesh.cell(midpoints[0] as CellId);
    let anchor = (mesh.cell(0).v + mesh.cell(1).v).normalize();
    check!(midpoint.v.distance(anchor) <= 1.0e-6, "The midpoint of (0, 1) must be equidistant from both.");
}

#[test]
fn two_passes() {
    let mesh = subdivided(2);

    check!(mesh.extant() == 162, "Two passes must grow the icosahedron to 162 cells.");
    check_pentagon_count(&mesh);
    check_mutual_linkage(&mesh);
}

#[test]
#[timeout(10000)]
fn four_passes() {
    let mesh = subdivided(4);

    check!(mesh.extant() == cells_per_iteration(4));
    check!(mesh.extant() == 2562);
    check_pentagon_count(&mesh);
    check_mutual_linkage(&mesh);
    check_unit_sphere(&mesh);
    check_midpoint_identity(&mesh);
    check_region_domain(&mesh);
}

#[test]
#[timeout(30000)]
fn inheritance_takes_over_past_the_region_limit() {
    // Five passes fill the store to exactly REGION_LIMIT cells, so every
    // midpoint of the sixth pass must take the score-balanced branch.
    let mesh = subdivided(6);

    check!(mesh.extant() == 40_962);
    check!(mesh.extant() > REGION_LIMIT, "Six passes must cross the region limit.");
    check_region_domain(&mesh);

    let inherited = &mesh.cells()[REGION_LIMIT as usize..];
    check!(!inherited.is_empty());

    for (offset, cell) in inherited.iter().enumerate() {
        let id = REGION_LIMIT + offset as CellId;
        let region = cell.region as CellId;

        check!(region != id, "Cell {} must not carry its own id past the region limit.", id);
        check!(region < REGION_LIMIT);
        check!(
            region == mesh.cell(cell.parent()).region as CellId
                || region == mesh.cell(cell.child()).region as CellId,
            "Cell {} must inherit its region from an endpoint of the edge it split.",
            id
        );
    }
}

#[test]
fn edge_count_quadruples() {
    for iterations in 0..3 {
        let mesh = subdivided(iterations);
        let expected = 30 * 4_usize.pow(iterations);

        check!(
            mesh.edges().count() == expected,
            "Incorrect edge count after {} passes.",
            iterations
        );
    }
}

#[test]
fn early_regions_label_their_own_cell() {
    let mesh = subdivided(2);

    for (id, cell) in mesh.cells().iter().enumerate().skip(12) {
        check!(
            cell.region as usize == id,
            "Below the region limit every midpoint carries its own id."
        );
    }
}

#[test]
fn balanced_split_prefers_the_starved_region() {
    let mut balance = RegionBalance::new();
    balance.credit(3);
    balance.credit(3);
    balance.credit(7);

    check!(balance.split(3, 7) == 7, "The region with the lower score must absorb the midpoint.");
    check!(balance.split(7, 3) == 7, "Balancing must not depend on argument order.");
}

#[test]
fn tied_split_alternates() {
    let mut balance = RegionBalance::new();

    check!(balance.split(2, 9) == 9, "The first tie goes to the greater label.");
    check!(balance.split(2, 9) == 2, "The second tie goes to the lesser label.");
    check!(balance.split(2, 9) == 9);
}

#[test]
fn refinement_is_deterministic() {
    let a = subdivided(3);
    let b = subdivided(3);

    check!(a.cells() == b.cells(), "Identical seeds and balance state must refine identically.");
}

#[test]
#[should_panic(expected = "cannot hold another pass")]
fn overfull_store_is_rejected() {
    let mut mesh = GeoMesh::with_iterations(1).unwrap();
    let mut balance = RegionBalance::new();

    mesh.seed_icosahedron(&mut balance);
    mesh.subdivide(&mut balance);
    mesh.subdivide(&mut balance);
}

#[test]
#[should_panic(expected = "seeded before subdividing")]
fn unseeded_store_is_rejected() {
    let mut mesh = GeoMesh::with_iterations(1).unwrap();
    let mut balance = RegionBalance::new();

    mesh.subdivide(&mut balance);
}
