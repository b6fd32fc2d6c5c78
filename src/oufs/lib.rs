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

//! Core of the OU filesystem (OUFS): a teaching filesystem stored in a single
//! host file acting as a virtual disk, manipulated by the `z*` commands.

use std::env::ArgsOs;
use std::path::PathBuf;
use std::process::exit;
use std::{env, fmt};

pub mod alloc;
pub mod block;
pub mod dir;
pub mod error;
pub mod file;
pub mod format;
pub mod inode;
pub mod path;
pub mod vdisk;

/// The configuration every command reads from the environment.
pub struct Environment {
    /// The working directory inside the OUFS, from `ZPWD`.
    pub cwd: String,
    /// The path to the backing file on the host, from `ZDISK`.
    pub disk_path: PathBuf,
}

impl Environment {
    /// Reads `ZPWD` and `ZDISK`, falling back to `/` and `vdisk1` when unset.
    pub fn get() -> Self {
        let cwd = env::var("ZPWD").unwrap_or_else(|_| "/".to_owned());
        let disk_path = env::var_os("ZDISK")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("vdisk1"));
        Self { cwd, disk_path }
    }
}

/// Returns the command's name along with an iterator over the command's arguments.
pub fn args() -> (String, ArgsOs) {
    let mut args = env::args_os();
    let bin = args
        .next()
        .map(PathBuf::from)
        .and_then(|p| {
            p.file_name()
                .and_then(|name| name.to_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| {
            error("zutils", "missing binary name");
        });
    (bin, args)
}

/// Writes an error to stderr, then exits.
pub fn error<M: fmt::Display>(bin: &str, msg: M) -> ! {
    eprintln!("{bin}: error: {msg}");
    exit(1);
}
