//! KCL file header

use std::io::Cursor;

use binrw::{BinRead, BinWrite};
use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

/// Size in bytes of the header
pub const HEADER_SIZE: usize = 0x38;

/// Offset of the field holding the root node offset
pub const ROOT_OFFSET_FIELD: usize = 12;

/// KCL header
///
/// All data is stored in big endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(big)]
pub struct KclHeader {
    /// Offset of the vertex positions
    pub positions_offset: u32,

    /// Offset of the normals
    pub normals_offset: u32,

    /// Offset of the prisms, which are 1 indexed
    pub prisms_offset: u32,

    /// Offset of the octree root node
    pub block_offset: u32,

    pub prism_thickness: f32,

    /// Lowest corner of the area covered by the octree
    pub area_min: [f32; 3],

    pub area_x_width_mask: u32,
    pub area_y_width_mask: u32,
    pub area_z_width_mask: u32,
    pub block_width_shift: u32,
    pub area_x_blocks_shift: u32,
    pub area_xy_blocks_shift: u32,
}

impl KclHeader {
    pub fn from_bytes(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < HEADER_SIZE {
            return Err(Error::OutOfBounds {
                offset: 0,
                size: HEADER_SIZE,
                len: buffer.len(),
            });
        }
        Ok(Self::read(&mut Cursor::new(buffer))?)
    }

    /// Number of top level blocks described by the area masks
    pub fn block_count(&self) -> u64 {
        let shift = self.block_width_shift.min(31);
        let blocks = |mask: u32, by: u32| ((!mask >> shift) as u64) << by.min(32);

        blocks(self.area_z_width_mask, self.area_xy_blocks_shift)
            | blocks(self.area_y_width_mask, self.area_x_blocks_shift)
            | blocks(self.area_x_width_mask, 0)
    }
}

/// Read the absolute offset of the root node from a KCL buffer
pub fn locate_root(buffer: &[u8]) -> Result<u32> {
    buffer
        .get(ROOT_OFFSET_FIELD..ROOT_OFFSET_FIELD + 4)
        .map(BigEndian::read_u32)
        .ok_or(Error::OutOfBounds {
            offset: ROOT_OFFSET_FIELD as u64,
            size: 4,
            len: buffer.len(),
        })
}
