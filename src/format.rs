//! The `zformat` command initializes a pristine OU filesystem on the virtual
//! disk.

use oufs::{Environment, error, format};
use std::env::ArgsOs;
use std::process::exit;

pub fn main(mut args: ArgsOs) {
    if args.next().is_some() {
        eprintln!("Usage: zformat");
        exit(1);
    }
    let env = Environment::get();
    format::format(&env.disk_path).unwrap_or_else(|e| {
        error("zformat", format_args!("{}: {e}", env.disk_path.display()));
    });
}
