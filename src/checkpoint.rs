
use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use crate::cell::{Cell, CellId, Region};
use crate::mesh::GeoMesh;

/// Serialised size of one cell record: six links, three position
/// components, one region label. Doubles as the format version: a
/// checkpoint written with different compile-time widths advertises a
/// different record size and is refused on load.
pub const CELL_RECORD_BYTES: u64 =
    (6 * size_of::<CellId>() + 3 * size_of::<f32>() + size_of::<Region>()) as u64;

/// Outcome of probing a checkpoint file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// The requested prefix was read into the store.
    Loaded,
    /// No checkpoint exists at the given path.
    Absent,
    /// A checkpoint exists but was written by a build with different
    /// widths, or holds fewer cells than requested. The store is left
    /// untouched.
    Incompatible,
}

impl GeoMesh {
    /// Writes the live prefix to a binary checkpoint. Writes are atomic
    /// only at the operating-system level; callers who cannot afford a
    /// torn file on crash should write to a temporary path and rename.
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);

        out.write_all(&CELL_RECORD_BYTES.to_le_bytes())?;
        out.write_all(&self.extant.to_le_bytes())?;

        for cell in self.cells() {
            write_cell(&mut out, cell)?;
        }

        out.flush()
    }

    /// Reads the first `count` cells of a checkpoint into the store and
    /// marks them live. The header is verified before any cell is touched;
    /// a checkpoint that fails partway through a record read instead
    /// surfaces the I/O error, with the prefix partially overwritten.
    ///
    /// # Panics
    ///
    /// Panics if the store cannot hold `count` cells.
    pub fn load(&mut self, path: impl AsRef<Path>, count: CellId) -> io::Result<LoadStatus> {
        assert!(
            count as usize <= self.cells.len(),
            "Store of {} cells cannot hold a {}-cell checkpoint.",
            self.cells.len(),
            count
        );

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LoadStatus::Absent),
            Err(e) => return Err(e),
        };
        let mut input = BufReader::new(file);

        // A file too short to carry a header was not written by any build
        // of this codec.
        let (record, stored) = match read_header(&mut input) {
            Ok(header) => header,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(LoadStatus::Incompatible),
            Err(e) => return Err(e),
        };

        if record != CELL_RECORD_BYTES || stored < count {
            return Ok(LoadStatus::Incompatible);
        }

        for id in 0..count as usize {
            self.cells[id] = read_cell(&mut input)?;
        }

        self.extant = count;
        Ok(LoadStatus::Loaded)
    }
}

fn write_cell(out: &mut impl Write, cell: &Cell) -> io::Result<()> {
    for link in cell.link {
        out.write_all(&link.to_le_bytes())?;
    }

    out.write_all(&cell.v.x.to_le_bytes())?;
    out.write_all(&cell.v.y.to_le_bytes())?;
    out.write_all(&cell.v.z.to_le_bytes())?;
    out.write_all(&cell.region.to_le_bytes())
}

fn read_header(input: &mut impl Read) -> io::Result<(u64, CellId)> {
    let mut record = [0u8; size_of::<u64>()];
    input.read_exact(&mut record)?;

    let mut count = [0u8; size_of::<CellId>()];
    input.read_exact(&mut count)?;

    Ok((u64::from_le_bytes(record), CellId::from_le_bytes(count)))
}

fn read_cell(input: &mut impl Read) -> io::Result<Cell> {
    let mut cell = Cell::default();

    for link in &mut cell.link {
        *link = read_u32(input)?;
    }

    cell.v.x = read_f32(input)?;
    cell.v.y = read_f32(input)?;
    cell.v.z = read_f32(input)?;
    cell.region = read_u16(input)?;

    Ok(cell)
}

fn read_u16(input: &mut impl Read) -> io::Result<u16> {
    let mut bytes = [0u8; 2];
    input.read_exact(&mut bytes)?;
    Ok(u16::from_le_bytes(bytes))
}

fn read_u32(input: &mut impl Read) -> io::Result<u32> {
    let mut bytes = [0u8; 4];
    input.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_f32(input: &mut impl Read) -> io::Result<f32> {
    let mut bytes = [0u8; 4];
    input.read_exact(&mut bytes)?;
    Ok(f32::from_le_bytes(bytes))
}
