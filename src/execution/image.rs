//! Program image prepared in the parent before fork
//!
//! Everything `execvp` needs is allocated here, so the child never touches
//! the allocator between fork and exec.

use crate::errors::{Result, SpawnError};
use std::ffi::{CStr, CString};

/// Program path plus a null-terminated argv, ready for `execvp`.
///
/// `argv[0]` is the command itself, followed by the caller's arguments.
#[derive(Debug)]
pub struct ExecImage {
    program: CString,
    args: Vec<CString>,
    argv: Vec<*const libc::c_char>,
}

impl ExecImage {
    /// Build the image, rejecting strings with interior NUL bytes.
    pub fn new<S: AsRef<str>>(command: &str, args: &[S]) -> Result<Self> {
        let program = to_cstring(command)?;

        let mut owned = Vec::with_capacity(args.len() + 1);
        owned.push(program.clone());
        for arg in args {
            owned.push(to_cstring(arg.as_ref())?);
        }

        // Pointers target the CStrings' heap buffers, which stay put while
        // `args` is never mutated again.
        let mut argv: Vec<*const libc::c_char> = owned.iter().map(|s| s.as_ptr()).collect();
        argv.push(std::ptr::null());

        Ok(Self {
            program,
            args: owned,
            argv,
        })
    }

    /// Program path handed to `execvp`
    pub fn program(&self) -> &CStr {
        &self.program
    }

    /// Full argument vector, including `argv[0]`
    pub fn args(&self) -> &[CString] {
        &self.args
    }

    pub(crate) fn program_ptr(&self) -> *const libc::c_char {
        self.program.as_ptr()
    }

    pub(crate) fn argv_ptr(&self) -> *const *const libc::c_char {
        self.argv.as_ptr()
    }
}

fn to_cstring(value: &str) -> Result<CString> {
    CString::new(value)
        .map_err(|_| SpawnError::InvalidArgument(format!("{:?} contains a nul byte", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argv_zero_is_command() {
        let image = ExecImage::new("/bin/echo", &["hello", "world"]).unwrap();

        assert_eq!(image.program().to_str().unwrap(), "/bin/echo");
        let args: Vec<&str> = image.args().iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(args, vec!["/bin/echo", "hello", "world"]);
    }

    #[test]
    fn test_argv_is_null_terminated() {
        let image = ExecImage::new("true", &[] as &[&str]).unwrap();

        assert_eq!(image.argv.len(), 2);
        let argv0 = unsafe { CStr::from_ptr(image.argv[0]) };
        assert_eq!(argv0, image.program());
        assert!(image.argv[1].is_null());
    }

    #[test]
    fn test_argv_pointers_match_owned_strings() {
        let image = ExecImage::new("/bin/sh", &["-c", "exit 0"]).unwrap();

        for (ptr, owned) in image.argv.iter().zip(image.args()) {
            let seen = unsafe { CStr::from_ptr(*ptr) };
            assert_eq!(seen, owned.as_c_str());
        }
    }

    #[test]
    fn test_rejects_nul_in_command() {
        let result = ExecImage::new("/bin/e\0cho", &[] as &[&str]);
        assert!(matches!(result, Err(SpawnError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_nul_in_argument() {
        let result = ExecImage::new("/bin/echo", &["ok", "bad\0arg"]);
        assert!(matches!(result, Err(SpawnError::InvalidArgument(_))));
    }
}
