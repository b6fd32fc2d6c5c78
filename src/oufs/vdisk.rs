//! The virtual disk: fixed-size random-access block I/O over a single backing
//! file on the host.

use crate::block::{BLOCK_SIZE, Block, BlockReference, DISK_SIZE, N_BLOCKS_IN_DISK};
use libc::ioctl;
use log::debug;
use std::ffi::c_long;
use std::fs::{File, OpenOptions};
use std::io::{Error, ErrorKind, Read, Seek, SeekFrom, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;
use std::{fmt, io};

/// ioctl macro: Command.
macro_rules! ioc {
    ($a:expr, $b:expr, $c:expr, $d:expr) => {
        (($a) << 30) | (($b) << 8) | ($c) | (($d) << 16)
    };
}

/// ioctl macro: Read command.
macro_rules! ior {
    ($a:expr, $b:expr, $c:ty) => {
        ioc!(2, $a, $b, std::mem::size_of::<$c>() as c_long)
    };
}

/// ioctl command: Get size of disk in bytes.
const BLKGETSIZE64: c_long = ior!(0x12, 114, u64);

/// Returns the capacity in bytes of the open block device `dev`.
fn device_size(dev: &File) -> io::Result<u64> {
    let mut size = 0u64;
    let ret = unsafe { ioctl(dev.as_raw_fd(), BLKGETSIZE64 as _, &mut size) };
    if ret < 0 {
        return Err(Error::last_os_error());
    }
    Ok(size)
}

/// The virtual disk device.
///
/// The backing file is acquired on [`VDisk::open`] and released on drop; every
/// transfer moves exactly one block.
pub struct VDisk {
    /// The backing file.
    file: File,
}

impl VDisk {
    /// Opens the virtual disk backed by the file at `path`.
    ///
    /// A missing regular file is created and sized to [`DISK_SIZE`]; an
    /// existing one with the wrong length is resized. A block device is used
    /// as-is and must be at least [`DISK_SIZE`] bytes large.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let metadata = file.metadata()?;
        let file_type = metadata.file_type();
        if file_type.is_block_device() || file_type.is_char_device() {
            let size = device_size(&file)?;
            if size < DISK_SIZE as u64 {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("{}: device is smaller than {DISK_SIZE} bytes", path.display()),
                ));
            }
        } else if metadata.len() != DISK_SIZE as u64 {
            file.set_len(DISK_SIZE as u64)?;
        }
        debug!("opened virtual disk at {}", path.display());
        Ok(Self { file })
    }

    /// Checks that `r` addresses a block of the disk.
    fn check(r: BlockReference) -> io::Result<u64> {
        if (r as usize) < N_BLOCKS_IN_DISK {
            Ok(r as u64 * BLOCK_SIZE as u64)
        } else {
            Err(Error::new(
                ErrorKind::InvalidInput,
                format!("block reference {r} out of range"),
            ))
        }
    }

    /// Reads the block at `r`.
    pub fn read_block(&mut self, r: BlockReference) -> io::Result<Block> {
        let off = Self::check(r)?;
        let mut block = Block::zeroed();
        self.file.seek(SeekFrom::Start(off))?;
        self.file.read_exact(block.bytes_mut())?;
        Ok(block)
    }

    /// Writes `block` at `r`.
    pub fn write_block(&mut self, r: BlockReference, block: &Block) -> io::Result<()> {
        let off = Self::check(r)?;
        self.file.seek(SeekFrom::Start(off))?;
        self.file.write_all(block.bytes())
    }
}

impl fmt::Debug for VDisk {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("VDisk").finish_non_exhaustive()
    }
}
