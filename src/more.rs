//! The `zmore` command copies a file of the OU filesystem to its standard
//! output.

use oufs::block::BLOCK_SIZE;
use oufs::file::{self, OpenMode};
use oufs::vdisk::VDisk;
use oufs::{Environment, error};
use std::env::ArgsOs;
use std::io::Write;
use std::process::exit;
use std::io;

pub fn main(mut args: ArgsOs) {
    let path = args.next().and_then(|a| a.into_string().ok());
    let (Some(path), None) = (path, args.next()) else {
        eprintln!("Usage: zmore <filename>");
        exit(1);
    };
    let env = Environment::get();
    let mut disk = VDisk::open(&env.disk_path).unwrap_or_else(|e| {
        error("zmore", format_args!("{}: {e}", env.disk_path.display()));
    });

    let mut file = file::open(&mut disk, &env.cwd, &path, OpenMode::Read)
        .unwrap_or_else(|e| error("zmore", e));
    let mut stdout = io::stdout().lock();
    let mut buf = [0; BLOCK_SIZE];
    loop {
        let n = file::read(&mut disk, &mut file, &mut buf)
            .unwrap_or_else(|e| error("zmore", e));
        if n == 0 {
            break;
        }
        stdout.write_all(&buf[..n]).unwrap_or_else(|e| {
            error("zmore", format_args!("cannot write output: {e}"));
        });
    }
    file.close();
}
