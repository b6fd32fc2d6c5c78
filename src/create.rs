//! The `zcreate` command fills a file of the OU filesystem from its standard
//! input, stopping at end of input or at the file's capacity.

use oufs::file::{self, OpenMode};
use oufs::vdisk::VDisk;
use oufs::{Environment, error};
use std::env::ArgsOs;
use std::io::Read;
use std::process::exit;
use std::io;

pub fn main(mut args: ArgsOs) {
    let path = args.next().and_then(|a| a.into_string().ok());
    let (Some(path), None) = (path, args.next()) else {
        eprintln!("Usage: zcreate <filename>");
        exit(1);
    };
    let env = Environment::get();
    let mut disk = VDisk::open(&env.disk_path).unwrap_or_else(|e| {
        error("zcreate", format_args!("{}: {e}", env.disk_path.display()));
    });

    let mut input = Vec::new();
    io::stdin()
        .lock()
        .read_to_end(&mut input)
        .unwrap_or_else(|e| {
            error("zcreate", format_args!("cannot read input: {e}"));
        });

    let mut file = file::open(&mut disk, &env.cwd, &path, OpenMode::Write)
        .unwrap_or_else(|e| error("zcreate", e));
    file::write(&mut disk, &mut file, &input).unwrap_or_else(|e| error("zcreate", e));
    file.close();
}
