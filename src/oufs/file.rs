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

//! Byte-oriented file I/O over the direct blocks of a file inode.

use crate::alloc;
use crate::block::{
    BLOCK_SIZE, BLOCKS_PER_INODE, Block, FileKind, Inode, InodeReference, UNALLOCATED_BLOCK,
};
use crate::dir;
use crate::error::{FsError, Result};
use crate::inode::{read_inode, write_inode};
use crate::path::{Resolution, resolve};
use crate::vdisk::VDisk;
use log::debug;

/// The mode of an open file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpenMode {
    /// Read from the beginning.
    Read,
    /// Write from the beginning, truncating any previous content. The file is
    /// created if absent.
    Write,
    /// Write starting at the end of the current content.
    Append,
}

impl OpenMode {
    /// Parses the mode string of the command line (`r`, `w` or `a`).
    pub fn from_arg(arg: &str) -> Result<Self> {
        match arg {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            "a" => Ok(Self::Append),
            _ => Err(FsError::InvalidMode),
        }
    }
}

/// An open file.
///
/// The handle holds no disk state: writes flush as they cross block
/// boundaries, so dropping (or [`OuFile::close`]-ing) a handle loses nothing.
#[derive(Debug)]
pub struct OuFile {
    /// The inode of the open file.
    inode_reference: InodeReference,
    /// The mode the file was opened with.
    mode: OpenMode,
    /// The current byte position.
    offset: usize,
}

impl OuFile {
    /// Returns the inode of the open file.
    pub fn inode_reference(&self) -> InodeReference {
        self.inode_reference
    }

    /// Returns the current byte position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Closes the file.
    pub fn close(self) {}
}

/// Zeroes and releases every data block of the file, leaving it empty.
fn truncate(disk: &mut VDisk, i: InodeReference, inode: &mut Inode) -> Result<()> {
    for r in &mut inode.data {
        if *r != UNALLOCATED_BLOCK {
            disk.write_block(*r, &Block::zeroed())?;
            alloc::deallocate_block(disk, *r)?;
            *r = UNALLOCATED_BLOCK;
        }
    }
    inode.size = 0;
    write_inode(disk, i, inode)
}

/// Opens the file at `path` in the given mode.
///
/// `r` and `a` require the file to exist; `w` creates it if needed and
/// truncates it. Opening a directory fails with [`FsError::NotAFile`].
pub fn open(disk: &mut VDisk, cwd: &str, path: &str, mode: OpenMode) -> Result<OuFile> {
    let inode_reference = match mode {
        OpenMode::Read | OpenMode::Append => {
            let Resolution::Found { child, .. } = resolve(disk, cwd, path)? else {
                return Err(FsError::NotFound);
            };
            child
        }
        // `touch` is a no-op on an existing path
        OpenMode::Write => dir::touch(disk, cwd, path)?,
    };
    let mut inode = read_inode(disk, inode_reference)?;
    match inode.kind {
        FileKind::File => {}
        FileKind::Directory => return Err(FsError::NotAFile),
        FileKind::None => return Err(FsError::NotFound),
    }
    let offset = match mode {
        OpenMode::Read => 0,
        OpenMode::Append => inode.size as usize,
        OpenMode::Write => {
            truncate(disk, inode_reference, &mut inode)?;
            0
        }
    };
    debug!("opened inode {inode_reference} in mode {mode:?} at offset {offset}");
    Ok(OuFile {
        inode_reference,
        mode,
        offset,
    })
}

/// Writes `buf` at the current position of `file`.
///
/// Data blocks materialize as the position crosses into them. Returns the
/// number of bytes accepted, which falls short of `buf.len()` when the file
/// reaches its direct-block capacity or the disk runs out of blocks.
pub fn write(disk: &mut VDisk, file: &mut OuFile, buf: &[u8]) -> Result<usize> {
    if !matches!(file.mode, OpenMode::Write | OpenMode::Append) {
        return Err(FsError::InvalidMode);
    }
    let mut inode = read_inode(disk, file.inode_reference)?;
    if inode.kind != FileKind::File {
        return Err(FsError::InvalidHandle);
    }

    let mut block_index = file.offset / BLOCK_SIZE;
    let mut byte_index = file.offset % BLOCK_SIZE;
    if block_index >= BLOCKS_PER_INODE {
        // Already at capacity
        return Ok(0);
    }
    // Resume inside a partially filled block
    let mut block = if byte_index > 0 {
        disk.read_block(inode.data[block_index])?
    } else {
        Block::zeroed()
    };

    let mut written = 0;
    for &byte in buf {
        if byte_index == 0 {
            block = if inode.data[block_index] == UNALLOCATED_BLOCK {
                match alloc::allocate_block(disk) {
                    Ok(r) => {
                        inode.data[block_index] = r;
                        Block::zeroed()
                    }
                    Err(FsError::NoSpace) => break,
                    Err(e) => return Err(e),
                }
            } else {
                disk.read_block(inode.data[block_index])?
            };
        }
        block.bytes_mut()[byte_index] = byte;
        written += 1;
        byte_index += 1;
        file.offset += 1;
        inode.size += 1;
        if byte_index == BLOCK_SIZE {
            disk.write_block(inode.data[block_index], &block)?;
            block_index += 1;
            byte_index = 0;
            if block_index == BLOCKS_PER_INODE {
                break;
            }
        }
    }
    if byte_index > 0 {
        disk.write_block(inode.data[block_index], &block)?;
    }
    write_inode(disk, file.inode_reference, &inode)?;
    debug!("wrote {written} bytes to inode {}", file.inode_reference);
    Ok(written)
}

/// Reads from the current position of `file` into `buf`.
///
/// Returns the number of bytes read, stopping at the end of the file.
pub fn read(disk: &mut VDisk, file: &mut OuFile, buf: &mut [u8]) -> Result<usize> {
    if file.mode != OpenMode::Read {
        return Err(FsError::InvalidMode);
    }
    let inode = read_inode(disk, file.inode_reference)?;
    if inode.kind != FileKind::File {
        return Err(FsError::InvalidHandle);
    }

    let mut n = 0;
    while n < buf.len() && file.offset < inode.size as usize {
        let block_index = file.offset / BLOCK_SIZE;
        if block_index >= BLOCKS_PER_INODE {
            break;
        }
        let r = inode.data[block_index];
        if r == UNALLOCATED_BLOCK {
            break;
        }
        let block = disk.read_block(r)?;
        let byte_index = file.offset % BLOCK_SIZE;
        let want = (buf.len() - n)
            .min(BLOCK_SIZE - byte_index)
            .min(inode.size as usize - file.offset);
        buf[n..n + want].copy_from_slice(&block.bytes()[byte_index..byte_index + want]);
        n += want;
        file.offset += want;
    }
    Ok(n)
}
