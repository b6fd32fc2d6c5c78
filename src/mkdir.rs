//! The `zmkdir` command creates a directory in the OU filesystem.

use oufs::vdisk::VDisk;
use oufs::{Environment, dir, error};
use std::env::ArgsOs;
use std::process::exit;

pub fn main(mut args: ArgsOs) {
    let path = args.next().and_then(|a| a.into_string().ok());
    let (Some(path), None) = (path, args.next()) else {
        eprintln!("Usage: zmkdir <path>");
        exit(1);
    };
    let env = Environment::get();
    let mut disk = VDisk::open(&env.disk_path).unwrap_or_else(|e| {
        error("zmkdir", format_args!("{}: {e}", env.disk_path.display()));
    });
    dir::mkdir(&mut disk, &env.cwd, &path).unwrap_or_else(|e| error("zmkdir", e));
}
