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

//! Errors surfaced by the filesystem core.

use std::io;
use thiserror::Error;

/// A result from a filesystem operation.
pub type Result<T> = std::result::Result<T, FsError>;

/// An error from a filesystem operation.
///
/// Every variant except [`FsError::Io`] describes a condition detected before
/// any disk mutation, or after a completed rollback. An `Io` error from a
/// midstream block write may leave the image inconsistent; this is accepted,
/// as the toolbox does not attempt crash recovery.
#[derive(Debug, Error)]
pub enum FsError {
    /// The underlying block device failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// The block or inode allocation table is exhausted.
    #[error("no space left on the virtual disk")]
    NoSpace,
    /// The path does not resolve to an object.
    #[error("no such file or directory")]
    NotFound,
    /// The path resolves to an existing object.
    #[error("file or directory already exists")]
    AlreadyExists,
    /// A non-final path component is not a directory.
    #[error("not a directory")]
    NotADirectory,
    /// The operation requires a regular file.
    #[error("not a file")]
    NotAFile,
    /// The directory still holds entries besides `.` and `..`.
    #[error("directory is not empty")]
    NotEmpty,
    /// The leaf name does not fit a directory entry.
    #[error("file name is too long")]
    NameTooLong,
    /// The parent directory has no free entry slot.
    #[error("directory is full")]
    DirectoryFull,
    /// The operation targets `.`, `..` or the root directory.
    #[error("cannot operate on `.`, `..` or the root directory")]
    ReservedName,
    /// The open mode is not one of `r`, `w`, `a`, or does not permit the
    /// attempted transfer.
    #[error("invalid open mode")]
    InvalidMode,
    /// The handle no longer refers to a regular file.
    #[error("invalid file handle")]
    InvalidHandle,
    /// The normalized path exceeds the path length bound.
    #[error("path is too long")]
    PathTooLong,
}
