/*
 * Copyright 2025 Luc Lenôtre
 *
 * This file is part of Maestro.
 *
 * Maestro is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Maestro is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
 * A PARTICULAR PURPOSE. See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Maestro. If not, see <https://www.gnu.org/licenses/>.
 */

//! Block and inode allocation over the two tables of the master block.
//!
//! The scan is first-fit and deterministic: first byte below `0xff`, then the
//! lowest zero bit of that byte. After a format, the first data block handed
//! out is always the one right after the inode table.

use crate::block::{BlockReference, InodeReference, MASTER_BLOCK_REFERENCE};
use crate::error::{FsError, Result};
use crate::vdisk::VDisk;
use log::debug;

/// Returns the position of the first zero bit in the first non-full byte of
/// `table`, as `(byte, bit)`.
fn find_open_bit(table: &[u8]) -> Option<(usize, u32)> {
    let byte = table.iter().position(|b| *b != 0xff)?;
    Some((byte, table[byte].trailing_ones()))
}

/// Allocates one block, marking it in the block table.
pub fn allocate_block(disk: &mut VDisk) -> Result<BlockReference> {
    let mut block = disk.read_block(MASTER_BLOCK_REFERENCE)?;
    let master = block.master_mut();
    let Some((byte, bit)) = find_open_bit(&master.block_allocated_flag) else {
        return Err(FsError::NoSpace);
    };
    master.block_allocated_flag[byte] |= 1 << bit;
    disk.write_block(MASTER_BLOCK_REFERENCE, &block)?;

    let r = ((byte << 3) | bit as usize) as BlockReference;
    debug!("allocated block {r}");
    Ok(r)
}

/// Allocates one inode, marking it in the inode table.
pub fn allocate_inode(disk: &mut VDisk) -> Result<InodeReference> {
    let mut block = disk.read_block(MASTER_BLOCK_REFERENCE)?;
    let master = block.master_mut();
    let Some((byte, bit)) = find_open_bit(&master.inode_allocated_flag) else {
        return Err(FsError::NoSpace);
    };
    master.inode_allocated_flag[byte] |= 1 << bit;
    disk.write_block(MASTER_BLOCK_REFERENCE, &block)?;

    let i = ((byte << 3) | bit as usize) as InodeReference;
    debug!("allocated inode {i}");
    Ok(i)
}

/// Clears the block table bit for `r`.
pub fn deallocate_block(disk: &mut VDisk, r: BlockReference) -> Result<()> {
    let mut block = disk.read_block(MASTER_BLOCK_REFERENCE)?;
    block.master_mut().block_allocated_flag[r as usize >> 3] &= !(1 << (r & 0b111));
    disk.write_block(MASTER_BLOCK_REFERENCE, &block)?;
    debug!("deallocated block {r}");
    Ok(())
}

/// Clears the inode table bit for `i`.
pub fn deallocate_inode(disk: &mut VDisk, i: InodeReference) -> Result<()> {
    let mut block = disk.read_block(MASTER_BLOCK_REFERENCE)?;
    block.master_mut().inode_allocated_flag[i as usize >> 3] &= !(1 << (i & 0b111));
    disk.write_block(MASTER_BLOCK_REFERENCE, &block)?;
    debug!("deallocated inode {i}");
    Ok(())
}
