//! The `zlink` command creates a new name for an existing file of the OU
//! filesystem.

use oufs::vdisk::VDisk;
use oufs::{Environment, dir, error};
use std::env::ArgsOs;
use std::process::exit;

pub fn main(mut args: ArgsOs) {
    let src = args.next().and_then(|a| a.into_string().ok());
    let dst = args.next().and_then(|a| a.into_string().ok());
    let (Some(src), Some(dst), None) = (src, dst, args.next()) else {
        eprintln!("Usage: zlink <src> <dst>");
        exit(1);
    };
    let env = Environment::get();
    let mut disk = VDisk::open(&env.disk_path).unwrap_or_else(|e| {
        error("zlink", format_args!("{}: {e}", env.disk_path.display()));
    });
    dir::link(&mut disk, &env.cwd, &src, &dst).unwrap_or_else(|e| error("zlink", e));
}
