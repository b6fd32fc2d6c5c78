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

//! Resolution of paths against the directory tree.

use crate::block::{
    FileKind, InodeReference, MAX_PATH_LENGTH, ROOT_DIRECTORY_BLOCK, ROOT_INODE_REFERENCE,
};
use crate::error::{FsError, Result};
use crate::inode::read_inode;
use crate::vdisk::VDisk;
use log::debug;

/// The outcome of a path walk.
///
/// A missing component before the leaf is an error, not a `Resolution`: every
/// operation needs the parent directory of the leaf to exist.
#[derive(Debug, Eq, PartialEq)]
pub enum Resolution {
    /// The whole path resolved.
    Found {
        /// The directory holding the leaf.
        parent: InodeReference,
        /// The inode of the leaf.
        child: InodeReference,
        /// The name of the leaf.
        name: String,
    },
    /// Every component but the leaf resolved.
    NotFound {
        /// The directory that would hold the leaf.
        parent: InodeReference,
        /// The name of the missing leaf.
        name: String,
    },
}

/// Combines `path` with the working directory `cwd` into an absolute path.
///
/// An empty `path` designates the working directory itself.
pub fn absolute_path(cwd: &str, path: &str) -> Result<String> {
    let full = if path.is_empty() {
        cwd.to_owned()
    } else if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("{cwd}/{path}")
    };
    if full.len() >= MAX_PATH_LENGTH {
        return Err(FsError::PathTooLong);
    }
    Ok(full)
}

/// Walks the directory tree for `path`, interpreted against `cwd`.
///
/// Empty components (leading, trailing or doubled `/`) are discarded, so the
/// empty path and `/` both resolve to the root with the leaf name `/`.
/// Descending through a regular file fails with [`FsError::NotADirectory`].
pub fn resolve(disk: &mut VDisk, cwd: &str, path: &str) -> Result<Resolution> {
    let full = absolute_path(cwd, path)?;
    debug!("resolving {full:?}");

    let mut parent = ROOT_INODE_REFERENCE;
    let mut current = ROOT_INODE_REFERENCE;
    let mut current_block = ROOT_DIRECTORY_BLOCK;
    let mut name = "/".to_owned();

    let mut tokens = full.split('/').filter(|t| !t.is_empty()).peekable();
    while let Some(token) = tokens.next() {
        let block = disk.read_block(current_block)?;
        let Some((_, entry)) = block.directory().find(token) else {
            if tokens.peek().is_some() {
                // A missing intermediate directory
                return Err(FsError::NotFound);
            }
            return Ok(Resolution::NotFound {
                parent: current,
                name: token.to_owned(),
            });
        };
        let child = entry.inode_reference;
        let inode = read_inode(disk, child)?;
        match inode.kind {
            FileKind::Directory => {
                parent = current;
                current = child;
                current_block = inode.data[0];
            }
            FileKind::File => {
                // A file terminates the walk
                if tokens.peek().is_some() {
                    return Err(FsError::NotADirectory);
                }
                parent = current;
                current = child;
            }
            // A stale entry pointing at a cleared inode
            FileKind::None => return Err(FsError::NotFound),
        }
        name = token.to_owned();
    }
    Ok(Resolution::Found {
        parent,
        child: current,
        name,
    })
}
