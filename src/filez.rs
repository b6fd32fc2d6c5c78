//! The `zfilez` command lists a directory of the OU filesystem, or a single
//! file. Without an argument, it lists the working directory.

use oufs::vdisk::VDisk;
use oufs::{Environment, dir, error};
use std::env::ArgsOs;
use std::process::exit;

pub fn main(mut args: ArgsOs) {
    let path = match args.next() {
        Some(arg) => match arg.into_string() {
            Ok(path) => path,
            Err(_) => {
                eprintln!("Usage: zfilez [path]");
                exit(1);
            }
        },
        None => String::new(),
    };
    if args.next().is_some() {
        eprintln!("Usage: zfilez [path]");
        exit(1);
    }
    let env = Environment::get();
    let mut disk = VDisk::open(&env.disk_path).unwrap_or_else(|e| {
        error("zfilez", format_args!("{}: {e}", env.disk_path.display()));
    });
    let names = dir::list(&mut disk, &env.cwd, &path).unwrap_or_else(|e| error("zfilez", e));
    for name in names {
        println!("{name}");
    }
}
