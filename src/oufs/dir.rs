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

//! Operations on the directory tree: `list`, `mkdir`, `rmdir`, `touch`,
//! `remove` and `link`.

use crate::alloc;
use crate::block::{
    Block, FILE_NAME_SIZE, FileKind, Inode, InodeReference, ROOT_INODE_REFERENCE,
    UNALLOCATED_BLOCK,
};
use crate::error::{FsError, Result};
use crate::inode::{read_inode, write_inode};
use crate::path::{Resolution, resolve};
use crate::vdisk::VDisk;
use log::debug;

/// Checks that `name` fits a directory entry with its NUL terminator.
fn check_name(name: &str) -> Result<()> {
    if name.len() >= FILE_NAME_SIZE {
        return Err(FsError::NameTooLong);
    }
    Ok(())
}

/// Checks that the directory block of `parent` has a free entry slot.
fn check_free_slot(disk: &mut VDisk, parent: InodeReference) -> Result<()> {
    let parent_inode = read_inode(disk, parent)?;
    let block = disk.read_block(parent_inode.data[0])?;
    if block.directory().free_slot().is_none() {
        return Err(FsError::DirectoryFull);
    }
    Ok(())
}

/// Inserts an entry for `child` under `name` into the lowest free slot of the
/// directory block of `parent`, and bumps the entry count.
fn insert_entry(
    disk: &mut VDisk,
    parent: InodeReference,
    name: &str,
    child: InodeReference,
) -> Result<()> {
    let mut parent_inode = read_inode(disk, parent)?;
    let block_ref = parent_inode.data[0];
    let mut block = disk.read_block(block_ref)?;
    let dir = block.directory_mut();
    let Some(slot) = dir.free_slot() else {
        return Err(FsError::DirectoryFull);
    };
    dir.entry[slot].set(name, child);
    disk.write_block(block_ref, &block)?;

    parent_inode.size += 1;
    write_inode(disk, parent, &parent_inode)
}

/// Clears the entry named `name` from the directory block of `parent`, and
/// drops the entry count. Entries are never compacted.
fn remove_entry(disk: &mut VDisk, parent: InodeReference, name: &str) -> Result<()> {
    let mut parent_inode = read_inode(disk, parent)?;
    let block_ref = parent_inode.data[0];
    let mut block = disk.read_block(block_ref)?;
    let dir = block.directory_mut();
    let slot = dir.find(name).map(|(i, _)| i).ok_or(FsError::NotFound)?;
    dir.entry[slot].clear();
    disk.write_block(block_ref, &block)?;

    parent_inode.size -= 1;
    write_inode(disk, parent, &parent_inode)
}

/// Lists the object at `path`.
///
/// For a directory, returns the names of its active entries in byte order,
/// each directory name carrying a trailing `/`. For a regular file, returns
/// its name alone.
pub fn list(disk: &mut VDisk, cwd: &str, path: &str) -> Result<Vec<String>> {
    let Resolution::Found { child, name, .. } = resolve(disk, cwd, path)? else {
        return Err(FsError::NotFound);
    };
    let inode = read_inode(disk, child)?;
    match inode.kind {
        FileKind::File => Ok(vec![name]),
        FileKind::Directory => {
            let block = disk.read_block(inode.data[0])?;
            let mut names = Vec::new();
            for entry in &block.directory().entry {
                if !entry.is_allocated() {
                    continue;
                }
                let entry_inode = read_inode(disk, entry.inode_reference)?;
                names.push((
                    entry.name_string(),
                    entry_inode.kind == FileKind::Directory,
                ));
            }
            // Sort on the bare names, so that `.` stays ahead of `..`
            names.sort();
            Ok(names
                .into_iter()
                .map(|(mut name, is_dir)| {
                    if is_dir {
                        name.push('/');
                    }
                    name
                })
                .collect())
        }
        FileKind::None => Err(FsError::NotFound),
    }
}

/// Creates the directory at `path`.
///
/// The parent must exist and have a free entry slot; the leaf must not exist.
pub fn mkdir(disk: &mut VDisk, cwd: &str, path: &str) -> Result<()> {
    let (parent, name) = match resolve(disk, cwd, path)? {
        Resolution::Found { .. } => return Err(FsError::AlreadyExists),
        Resolution::NotFound { parent, name } => (parent, name),
    };
    debug!("mkdir {name:?} under inode {parent}");
    check_name(&name)?;
    check_free_slot(disk, parent)?;

    let block_ref = alloc::allocate_block(disk)?;
    let inode_ref = match alloc::allocate_inode(disk) {
        Ok(i) => i,
        Err(e) => {
            // Roll back the half-done allocation
            alloc::deallocate_block(disk, block_ref)?;
            return Err(e);
        }
    };

    let mut block = Block::zeroed();
    block.directory_mut().init(inode_ref, parent);
    disk.write_block(block_ref, &block)?;
    write_inode(disk, inode_ref, &Inode::directory(block_ref))?;

    insert_entry(disk, parent, &name, inode_ref)
}

/// Removes the empty directory at `path`.
///
/// The root, `.` and `..` are refused, as is any directory still holding
/// entries besides `.` and `..`.
pub fn rmdir(disk: &mut VDisk, cwd: &str, path: &str) -> Result<()> {
    let Resolution::Found {
        parent,
        child,
        name,
    } = resolve(disk, cwd, path)?
    else {
        return Err(FsError::NotFound);
    };
    if child == ROOT_INODE_REFERENCE || name == "." || name == ".." {
        return Err(FsError::ReservedName);
    }
    let inode = read_inode(disk, child)?;
    if inode.kind != FileKind::Directory {
        return Err(FsError::NotADirectory);
    }
    if inode.size > 2 {
        return Err(FsError::NotEmpty);
    }
    debug!("rmdir {name:?}: inode {child}, block {}", inode.data[0]);

    let block_ref = inode.data[0];
    alloc::deallocate_inode(disk, child)?;
    alloc::deallocate_block(disk, block_ref)?;
    disk.write_block(block_ref, &Block::zeroed())?;
    write_inode(disk, child, &Inode::empty())?;

    remove_entry(disk, parent, &name)
}

/// Creates an empty regular file at `path` and returns its inode.
///
/// No data block is allocated: blocks materialize on the first write. If the
/// path already resolves, nothing is done and the existing inode is returned.
pub fn touch(disk: &mut VDisk, cwd: &str, path: &str) -> Result<InodeReference> {
    let (parent, name) = match resolve(disk, cwd, path)? {
        Resolution::Found { child, .. } => return Ok(child),
        Resolution::NotFound { parent, name } => (parent, name),
    };
    debug!("touch {name:?} under inode {parent}");
    check_name(&name)?;
    check_free_slot(disk, parent)?;

    let inode_ref = alloc::allocate_inode(disk)?;
    write_inode(disk, inode_ref, &Inode::file())?;
    insert_entry(disk, parent, &name, inode_ref)?;
    Ok(inode_ref)
}

/// Removes the regular file name at `path`.
///
/// The entry disappears from the parent directory; the inode and its data
/// blocks are released once the last name referencing them is gone.
pub fn remove(disk: &mut VDisk, cwd: &str, path: &str) -> Result<()> {
    let Resolution::Found {
        parent,
        child,
        name,
    } = resolve(disk, cwd, path)?
    else {
        return Err(FsError::NotFound);
    };
    let mut inode = read_inode(disk, child)?;
    match inode.kind {
        FileKind::File => {}
        FileKind::Directory => return Err(FsError::NotAFile),
        FileKind::None => return Err(FsError::NotFound),
    }
    debug!("remove {name:?}: inode {child}");

    remove_entry(disk, parent, &name)?;

    inode.n_references -= 1;
    if inode.n_references > 0 {
        return write_inode(disk, child, &inode);
    }
    for r in inode.data {
        if r != UNALLOCATED_BLOCK {
            disk.write_block(r, &Block::zeroed())?;
            alloc::deallocate_block(disk, r)?;
        }
    }
    write_inode(disk, child, &Inode::empty())?;
    alloc::deallocate_inode(disk, child)
}

/// Creates at `dst` a new name for the regular file at `src`.
pub fn link(disk: &mut VDisk, cwd: &str, src: &str, dst: &str) -> Result<()> {
    let Resolution::Found { child: target, .. } = resolve(disk, cwd, src)? else {
        return Err(FsError::NotFound);
    };
    let mut inode = read_inode(disk, target)?;
    match inode.kind {
        FileKind::File => {}
        FileKind::Directory => return Err(FsError::NotAFile),
        FileKind::None => return Err(FsError::NotFound),
    }

    let (parent, name) = match resolve(disk, cwd, dst)? {
        Resolution::Found { .. } => return Err(FsError::AlreadyExists),
        Resolution::NotFound { parent, name } => (parent, name),
    };
    debug!("link {name:?} under inode {parent} to inode {target}");
    check_name(&name)?;

    inode.n_references = inode.n_references.checked_add(1).ok_or(FsError::NoSpace)?;
    insert_entry(disk, parent, &name, target)?;
    write_inode(disk, target, &inode)
}
