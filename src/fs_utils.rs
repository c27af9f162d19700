use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Sibling temp path used while `path` is being replaced.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(crate::TMP_SUFFIX);
    path.with_file_name(name)
}

/// Flush directory metadata so a rename inside it survives a crash.
pub(crate) fn sync_parent_dir(path: &Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };

    #[cfg(unix)]
    {
        let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
        fs::File::open(parent)?.sync_all()
    }

    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::Foundation::{CloseHandle, GENERIC_WRITE, INVALID_HANDLE_VALUE};
        use windows_sys::Win32::Storage::FileSystem::{
            CreateFileW, FILE_FLAG_BACKUP_SEMANTICS, FILE_SHARE_DELETE, FILE_SHARE_READ,
            FILE_SHARE_WRITE, FlushFileBuffers, OPEN_EXISTING,
        };

        let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
        let mut wide: Vec<u16> = parent.as_os_str().encode_wide().collect();
        wide.push(0);

        // Directory handles need FILE_FLAG_BACKUP_SEMANTICS
        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE,
                std::ptr::null(),
                OPEN_EXISTING,
                FILE_FLAG_BACKUP_SEMANTICS,
                std::ptr::null_mut(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }

        let flushed = unsafe { FlushFileBuffers(handle) };
        let flush_err = (flushed == 0).then(io::Error::last_os_error);
        let closed = unsafe { CloseHandle(handle) };

        match flush_err {
            Some(e) => Err(e),
            None if closed == 0 => Err(io::Error::last_os_error()),
            None => Ok(()),
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = parent;
        Ok(())
    }
}

/// Replace `path` with `bytes`: temp file, fsync, rename, parent fsync.
///
/// Readers see either the old content or the new content, never a torn
/// file. The temp file is removed if any step before the rename fails.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp_path = temp_path_for(path);

    let written = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.flush()?;
        file.sync_all()
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    // std::fs::rename replaces an existing target on every supported platform
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    sync_parent_dir(path)
}
