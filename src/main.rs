//! Main of the OU filesystem toolbox: one binary serving every `z*` command,
//! dispatched on the name it is invoked under.

mod create;
mod filez;
mod format;
mod link;
mod mkdir;
mod more;
mod rm;
mod rmdir;
mod touch;

use oufs::error;

fn main() {
    env_logger::init();
    let (bin, args) = oufs::args();
    match bin.as_str() {
        "format" | "zformat" => format::main(args),
        "list" | "filez" | "zfilez" => filez::main(args),
        "mkdir" | "zmkdir" => mkdir::main(args),
        "rmdir" | "zrmdir" => rmdir::main(args),
        "touch" | "ztouch" => touch::main(args),
        "remove" | "zrm" => rm::main(args),
        "create" | "zcreate" => create::main(args),
        "more" | "zmore" => more::main(args),
        "link" | "zlink" => link::main(args),
        _ => error("zutils", "invalid binary name"),
    }
}
