//! # FLVSS Cell Voltage Sensor
//!
//! Packs up to six LiPo cell voltages into up to three S.Port words.
//!
//! ## Word Layout
//!
//! ```text
//! 31        20 19         8 7      4 3      0
//! [ cell B:12 ][ cell A:12 ][ cells:4 ][ first:4 ]
//! ```
//!
//! Cell values are in 2 mV steps. Word 1 carries cells 1-2, word 2 cells 3-4
//! and word 3 cells 5-6. Words for missing cell pairs are held as zero and
//! skipped during rotation.

use tracing::trace;

use super::{scaled_word, Rotation, SportTransport};
use crate::sport::protocol::{SensorId, FLVSS_CELL_DATA_ID};

/// Conventional address of an FLVSS sensor
pub const FLVSS_DEFAULT_ID: SensorId = SensorId::ID2;

/// Rotation slots (one per cell pair)
pub const FLVSS_DATA_COUNT: usize = 3;

/// Maximum number of cells one sensor reports
pub const FLVSS_MAX_CELLS: usize = 6;

/// 12-bit cell field mask
const CELL_MASK: u32 = 0x0FFF;

/// Cell voltages in volts; absent cells are 0.0
///
/// Cells are populated contiguously from cell 1. The first cell at or below
/// zero ends the pack, even if later cells hold a value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellVoltages {
    pub cells: [f32; FLVSS_MAX_CELLS],
}

impl CellVoltages {
    /// Build from up to six voltages, filling missing cells with 0.0
    ///
    /// Extra values past the sixth are ignored.
    pub fn from_slice(voltages: &[f32]) -> Self {
        let mut cells = [0.0; FLVSS_MAX_CELLS];
        for (cell, &voltage) in cells.iter_mut().zip(voltages) {
            *cell = voltage;
        }
        Self { cells }
    }

    /// Number of cells in the pack
    ///
    /// Cell 1 always counts; cells 2-6 count until the first one at or below zero.
    pub fn count(&self) -> u8 {
        let populated = self.cells[1..]
            .iter()
            .take_while(|&&voltage| voltage > 0.0)
            .count();
        1 + populated as u8
    }
}

impl From<[f32; FLVSS_MAX_CELLS]> for CellVoltages {
    fn from(cells: [f32; FLVSS_MAX_CELLS]) -> Self {
        Self { cells }
    }
}

/// Encode one cell voltage into 2 mV steps, masked to 12 bits
fn encode_cell(voltage: f32) -> u32 {
    scaled_word((voltage as f64 * 1000.0 / 2.0).round()) & CELL_MASK
}

/// Pack a pair of cells into one protocol word
pub fn encode_cell_pair(num_cells: u8, first_cell_index: u8, cell_a: f32, cell_b: f32) -> u32 {
    (encode_cell(cell_b) << 20)
        | (encode_cell(cell_a) << 8)
        | ((num_cells as u32 & 0x0F) << 4)
        | (first_cell_index as u32 & 0x0F)
}

/// FrSky FLVSS LiPo cell voltage sensor
#[derive(Debug, Clone)]
pub struct FlvssSensor {
    id: SensorId,
    rotation: Rotation,
    cell_data: [u32; FLVSS_DATA_COUNT],
}

impl FlvssSensor {
    pub fn new(id: SensorId) -> Self {
        Self {
            id,
            rotation: Rotation::new(FLVSS_DATA_COUNT),
            cell_data: [0; FLVSS_DATA_COUNT],
        }
    }

    pub fn id(&self) -> SensorId {
        self.id
    }

    /// Replace the measurement snapshot
    ///
    /// Word 1 is always produced. Words 2 and 3 are produced only when the
    /// pack has more than two and more than four cells respectively.
    pub fn set_data(&mut self, voltages: &CellVoltages) {
        let num_cells = voltages.count();
        let cells = &voltages.cells;

        self.cell_data[0] = encode_cell_pair(num_cells, 0, cells[0], cells[1]);
        self.cell_data[1] = if num_cells > 2 {
            encode_cell_pair(num_cells, 2, cells[2], cells[3])
        } else {
            0
        };
        self.cell_data[2] = if num_cells > 4 {
            encode_cell_pair(num_cells, 4, cells[4], cells[5])
        } else {
            0
        };
    }

    /// Encoded words for cells 1-2, 3-4 and 5-6 (zero when absent)
    pub fn words(&self) -> [u32; FLVSS_DATA_COUNT] {
        self.cell_data
    }

    /// Emit the next cell pair when `id` addresses this sensor
    ///
    /// An absent pair ends the current cycle without touching the transport.
    pub fn poll(&mut self, id: SensorId, transport: &mut dyn SportTransport) {
        if id != self.id {
            return;
        }

        let slot = self.rotation.current();
        let word = self.cell_data[slot];
        if slot == 0 || word != 0 {
            trace!("{} cells slot {} -> 0x{:08X}", self.id, slot, word);
            transport.send_data(FLVSS_CELL_DATA_ID, word);
        } else {
            self.rotation.skip_rest();
        }
        self.rotation.advance();
    }
}

impl Default for FlvssSensor {
    fn default() -> Self {
        Self::new(FLVSS_DEFAULT_ID)
    }
}
