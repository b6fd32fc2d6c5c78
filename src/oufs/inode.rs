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

//! Single-inode access to the on-disk inode table.

use crate::block::{INODES_PER_BLOCK, Inode, InodeReference};
use crate::error::Result;
use crate::vdisk::VDisk;
use log::debug;

/// Returns the block and element addressing inode `i`.
///
/// The table starts at block `1`, right after the master block.
fn locate(i: InodeReference) -> (InodeReference, usize) {
    (
        i / INODES_PER_BLOCK as InodeReference + 1,
        i as usize % INODES_PER_BLOCK,
    )
}

/// Reads the inode at reference `i`.
pub fn read_inode(disk: &mut VDisk, i: InodeReference) -> Result<Inode> {
    debug!("fetching inode {i}");
    let (block, element) = locate(i);
    let block = disk.read_block(block)?;
    Ok(block.inodes().inode[element])
}

/// Writes `inode` at reference `i`, leaving its block siblings untouched.
pub fn write_inode(disk: &mut VDisk, i: InodeReference, inode: &Inode) -> Result<()> {
    debug!("writing inode {i}");
    let (block_ref, element) = locate(i);
    let mut block = disk.read_block(block_ref)?;
    block.inodes_mut().inode[element] = *inode;
    disk.write_block(block_ref, &block)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_maps_references_to_table_slots() {
        assert_eq!(locate(0), (1, 0));
        assert_eq!(locate(7), (1, 7));
        assert_eq!(locate(8), (2, 0));
        assert_eq!(locate(63), (8, 7));
    }
}
