use super::VolumeUsage;
use std::ffi::CString;
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

pub fn statvfs_usage(path: &Path) -> io::Result<VolumeUsage> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut stat = MaybeUninit::<libc::statvfs>::uninit();
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    let stat = unsafe { stat.assume_init() };

    // f_bavail: blocks available to unprivileged users
    let block_size = stat.f_frsize as u64;
    Ok(VolumeUsage {
        total: stat.f_blocks as u64 * block_size,
        free: stat.f_bavail as u64 * block_size,
    })
}
