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

//! Initialization of a pristine virtual disk.

use crate::alloc;
use crate::block::{
    Block, BlockReference, Inode, N_BLOCKS_IN_DISK, N_INODE_BLOCKS, ROOT_DIRECTORY_BLOCK,
};
use crate::error::Result;
use crate::inode;
use crate::vdisk::VDisk;
use log::debug;
use std::path::Path;

/// Formats the virtual disk at `path`, creating the backing file if needed.
///
/// Every block is zeroed, the master block and the inode table are marked
/// reserved, and the root directory is installed with `.` and `..` pointing
/// to itself.
pub fn format<P: AsRef<Path>>(path: P) -> Result<()> {
    let mut disk = VDisk::open(path)?;

    let zero = Block::zeroed();
    for i in 0..N_BLOCKS_IN_DISK {
        disk.write_block(i as BlockReference, &zero)?;
    }

    // Reserve the fixed regions in scan order: the master block, then the
    // inode table. The next allocation is the root directory block.
    alloc::allocate_block(&mut disk)?;
    for _ in 0..N_INODE_BLOCKS {
        alloc::allocate_block(&mut disk)?;
    }
    let root_block = alloc::allocate_block(&mut disk)?;
    let root = alloc::allocate_inode(&mut disk)?;
    // The first-fit scan makes this deterministic
    debug_assert_eq!(root_block, ROOT_DIRECTORY_BLOCK);
    debug!("root directory: inode {root}, block {root_block}");

    inode::write_inode(&mut disk, root, &Inode::directory(root_block))?;

    let mut block = Block::zeroed();
    block.directory_mut().init(root, root);
    disk.write_block(root_block, &block)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{
        DIRECTORY_ENTRIES_PER_BLOCK, FileKind, MASTER_BLOCK_REFERENCE, ROOT_INODE_REFERENCE,
    };
    use crate::inode::read_inode;

    #[test]
    fn format_reserves_fixed_regions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vdisk");
        format(&path).unwrap();

        let mut disk = VDisk::open(&path).unwrap();
        let block = disk.read_block(MASTER_BLOCK_REFERENCE).unwrap();
        let master = block.master();
        // Master block, 8 inode blocks and the root directory block
        for i in 0..=ROOT_DIRECTORY_BLOCK {
            assert!(master.block_is_allocated(i), "block {i} must be reserved");
        }
        for i in (ROOT_DIRECTORY_BLOCK + 1)..N_BLOCKS_IN_DISK as BlockReference {
            assert!(!master.block_is_allocated(i), "block {i} must be free");
        }
        assert!(master.inode_is_allocated(ROOT_INODE_REFERENCE));
        assert!(!master.inode_is_allocated(1));
    }

    #[test]
    fn format_installs_root_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vdisk");
        format(&path).unwrap();

        let mut disk = VDisk::open(&path).unwrap();
        let root = read_inode(&mut disk, ROOT_INODE_REFERENCE).unwrap();
        assert_eq!(root.kind, FileKind::Directory);
        assert_eq!(root.n_references, 1);
        assert_eq!(root.size, 2);
        assert_eq!(root.data[0], ROOT_DIRECTORY_BLOCK);

        let block = disk.read_block(ROOT_DIRECTORY_BLOCK).unwrap();
        let entries = &block.directory().entry;
        assert_eq!(entries[0].name_bytes(), b".");
        assert_eq!(entries[0].inode_reference, ROOT_INODE_REFERENCE);
        assert_eq!(entries[1].name_bytes(), b"..");
        assert_eq!(entries[1].inode_reference, ROOT_INODE_REFERENCE);
        for entry in &entries[2..DIRECTORY_ENTRIES_PER_BLOCK] {
            assert!(!entry.is_allocated());
        }
    }

    #[test]
    fn format_wipes_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vdisk");
        {
            let mut disk = VDisk::open(&path).unwrap();
            let mut junk = Block::zeroed();
            junk.bytes_mut().fill(0x5a);
            for i in 0..N_BLOCKS_IN_DISK {
                disk.write_block(i as BlockReference, &junk).unwrap();
            }
        }
        format(&path).unwrap();

        let mut disk = VDisk::open(&path).unwrap();
        // A data block past the root directory is zero again
        let block = disk.read_block(ROOT_DIRECTORY_BLOCK + 1).unwrap();
        assert!(block.bytes().iter().all(|b| *b == 0));
    }
}
