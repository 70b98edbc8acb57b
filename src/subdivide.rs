#[cfg(test)]
mod tests;

use crate::cell::{Cell, CellId, NOLINK, REGION_LIMIT, Region};
use crate::mesh::{GeoMesh, SEED_CELLS};

/// Slot value of a midpoint whose flank links have not been wired yet.
/// Distinct from [`NOLINK`] so a half-built cell is never mistaken for a
/// pentagon.
const PENDING: CellId = NOLINK - 1;

/// A flank link that could not be wired when its midpoint was created:
/// `target.link[spoke]` must become the midpoint of the `a`-`b` edge once
/// the pass has produced it.
#[derive(Clone, Copy, Debug)]
struct Deferral {
    a: CellId,
    b: CellId,
    spoke: usize,
    target: CellId,
}

/// Per-invocation region bookkeeping: how many cells each region has
/// absorbed so far, and which way the next even split breaks.
///
/// The same instance must be threaded through [`GeoMesh::seed_icosahedron`]
/// and every subsequent [`GeoMesh::subdivide`] call; starting from a fresh
/// instance makes refinement fully deterministic.
pub struct RegionBalance {
    score: Box<[u32]>,
    prefer_high: bool,
}

impl RegionBalance {
    pub fn new() -> Self {
        Self {
            score: vec![0; REGION_LIMIT as usize].into_boxed_slice(),
            prefer_high: false,
        }
    }

    pub(crate) fn credit(&mut self, region: Region) {
        self.score[region as usize] += 1;
    }

    /// Label for a midpoint born between regions `a` and `b`: whichever has
    /// absorbed fewer cells, alternating between the greater and the lesser
    /// label on ties.
    fn split(&mut self, a: Region, b: Region) -> Region {
        if self.score[a as usize] > self.score[b as usize] {
            b
        } else if self.score[a as usize] < self.score[b as usize] {
            a
        } else {
            self.prefer_high = !self.prefer_high;
            if self.prefer_high { a.max(b) } else { a.min(b) }
        }
    }

    fn assign(&mut self, a: Region, b: Region, created: CellId) -> Region {
        let region = if created < REGION_LIMIT {
            created as Region
        } else {
            self.split(a, b)
        };

        self.credit(region);
        region
    }
}

impl Default for RegionBalance {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoMesh {
    /// One refinement pass: splits every edge of the live mesh at its
    /// spherical midpoint and rewires the neighbour graph in place.
    ///
    /// A midpoint's six spokes are laid out around the edge it splits:
    ///
    /// ```text
    /// link[0] = parent
    /// link[1] = midpoint of parent-ccw sibling
    /// link[2] = midpoint of ccw sibling-child
    /// link[3] = child
    /// link[4] = midpoint of cw sibling-child
    /// link[5] = midpoint of parent-cw sibling
    /// ```
    ///
    /// where the siblings are the two cells adjacent to both endpoints.
    /// The four flank slots refer to midpoints of this same pass, so some
    /// of them do not exist yet when a midpoint is created; those are
    /// recorded as deferrals and patched in a final sweep once every
    /// midpoint exists. Cells are visited in ascending id and spokes in
    /// ascending order; the deferral pairing depends on it.
    ///
    /// # Panics
    ///
    /// Panics if the store is unseeded or too small for another pass, and
    /// treats an unresolvable deferral as a corrupt mesh.
    pub fn subdivide(&mut self, balance: &mut RegionBalance) {
        let snapshot = self.extant;
        assert!(snapshot >= SEED_CELLS, "Store must be seeded before subdividing.");

        // One new cell per edge; E = 3F/2 and F = 2(C - 2) by Euler's formula.
        let target = 4 * snapshot as u64 - 6;
        assert!(
            target <= self.cells.len() as u64,
            "Store of {} cells cannot hold another pass ({} cells).",
            self.cells.len(),
            target
        );

        let cells = &mut self.cells;
        let mut deferred = Vec::new();
        let mut created = snapshot;

        for parent in 0..snapshot {
            for spoke in 0..6 {
                let child = cells[parent as usize].link[spoke];

                // Open spoke, or an edge already split from the other end.
                if child >= snapshot {
                    continue;
                }

                let midpoint = created as usize;
                let parent_region = cells[parent as usize].region;
                let child_region = cells[child as usize].region;

                cells[midpoint].v =
                    ((cells[parent as usize].v + cells[child as usize].v) / 2.0).normalize();
                cells[midpoint].link = [PENDING; 6];
                cells[midpoint].region = balance.assign(parent_region, child_region, created);

                cells[midpoint].link[0] = parent;
                cells[parent as usize].link[spoke] = created;

                cells[midpoint].link[3] = child;
                for s in 0..6 {
                    if cells[child as usize].link[s] == parent {
                        cells[child as usize].link[s] = created;
                        break;
                    }
                }

                let ccw = cells[parent as usize].prev_neighbor(spoke);
                link_flank(cells, &mut deferred, parent, child, created, snapshot, ccw, 1, 2);

                let cw = cells[parent as usize].next_neighbor(spoke);
                link_flank(cells, &mut deferred, parent, child, created, snapshot, cw, 5, 4);

                created += 1;
            }
        }

        for deferral in &deferred {
            resolve(cells, deferral);
        }

        self.extant = created;

        debug_assert_eq!(
            self.cells().iter().filter(|cell| cell.is_pentagon()).count(),
            SEED_CELLS as usize,
            "Pentagon count drifted."
        );
    }
}

/// Wires one flank of a freshly created midpoint: the `near` slot points at
/// the midpoint of the parent-sibling edge, the `far` slot at the midpoint
/// of the sibling-child edge. Whatever does not exist yet is deferred.
fn link_flank(
    cells: &mut [Cell],
    deferred: &mut Vec<Deferral>,
    parent: CellId,
    child: CellId,
    created: CellId,
    snapshot: CellId,
    mut sibling: CellId,
    near: usize,
    far: usize,
) {
    if sibling >= snapshot {
        // The parent-sibling edge was already split this pass: link its
        // midpoint directly and step across it to the original sibling.
        cells[created as usize].link[near] = sibling;

        let across = &cells[sibling as usize];
        sibling = if across.link[0] == parent {
            across.link[3]
        } else {
            across.link[0]
        };
    } else {
        deferred.push(Deferral {
            a: parent,
            b: sibling,
            spoke: near,
            target: created,
        });
    }

    for s in 0..6 {
        let candidate = cells[sibling as usize].link[s];

        if candidate == child {
            // The sibling-child edge is still unsplit.
            deferred.push(Deferral {
                a: child,
                b: sibling,
                spoke: far,
                target: created,
            });
            break;
        }

        // NOLINK and under-construction slots are not live neighbours.
        if candidate < created && cells[candidate as usize].joins(sibling, child) {
            cells[created as usize].link[far] = candidate;
            break;
        }
    }
}

/// Patches one deferred link. By the time the final sweep runs, every live
/// spoke of `a` points at a midpoint of this pass, exactly one of which
/// split the `a`-`b` edge.
fn resolve(cells: &mut [Cell], deferral: &Deferral) {
    for s in 0..6 {
        let midpoint = cells[deferral.a as usize].link[s];

        if midpoint != NOLINK && cells[midpoint as usize].joins(deferral.a, deferral.b) {
            cells[deferral.target as usize].link[deferral.spoke] = midpoint;
            return;
        }
    }

    panic!("Deferred link {:?} failed to resolve; the mesh is corrupt.", deferral);
}
