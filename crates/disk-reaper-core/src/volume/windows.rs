use super::VolumeUsage;
use std::ffi::OsStr;
use std::io;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use winapi::shared::ntdef::ULARGE_INTEGER;
use winapi::um::fileapi::GetDiskFreeSpaceExW;

pub fn disk_free_space(path: &Path) -> io::Result<VolumeUsage> {
    let wide: Vec<u16> = OsStr::new(path).encode_wide().chain(once(0)).collect();

    let mut free_to_caller: ULARGE_INTEGER = unsafe { std::mem::zeroed() };
    let mut total: ULARGE_INTEGER = unsafe { std::mem::zeroed() };
    let ok = unsafe {
        GetDiskFreeSpaceExW(
            wide.as_ptr(),
            &mut free_to_caller,
            &mut total,
            std::ptr::null_mut(),
        )
    };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(VolumeUsage {
        total: unsafe { *total.QuadPart() },
        free: unsafe { *free_to_caller.QuadPart() },
    })
}
