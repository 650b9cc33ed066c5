//! Text crossing the ABI: reading narrow/wide string arguments and writing
//! null-terminated output buffers with the ODBC truncation contract.
//!
//! Narrow text is UTF-8, wide text is UTF-16 with surrogate pairs. Output
//! helpers always report the full (untruncated) length so the caller can
//! size a retry buffer, and tell the entry point whether truncation
//! happened.

use crate::types::*;
use widestring::U16CStr;

/// Read a narrow string argument with a 16-bit length (or `SQL_NTS`).
///
/// # Safety
/// `ptr` must be valid for `len` bytes, or null-terminated when `len` is
/// `SQL_NTS`/negative.
pub unsafe fn narrow_arg(ptr: *const SQLCHAR, len: SQLSMALLINT) -> String {
    unsafe { narrow_arg_isize(ptr, len as SQLLEN) }
}

/// Read a narrow string argument with a pointer-width length.
pub unsafe fn narrow_arg_isize(ptr: *const SQLCHAR, len: SQLLEN) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let count = if len < 0 {
        let mut n = 0usize;
        unsafe {
            while *ptr.add(n) != 0 {
                n += 1;
            }
        }
        n
    } else {
        len as usize
    };
    let slice = unsafe { std::slice::from_raw_parts(ptr, count) };
    String::from_utf8_lossy(slice).into_owned()
}

/// Read a wide string argument with a 16-bit length (or `SQL_NTS`).
pub unsafe fn wide_arg(ptr: *const SQLWCHAR, len: SQLSMALLINT) -> String {
    unsafe { wide_arg_isize(ptr, len as SQLLEN) }
}

/// Read a wide string argument with a pointer-width length.
pub unsafe fn wide_arg_isize(ptr: *const SQLWCHAR, len: SQLLEN) -> String {
    if ptr.is_null() {
        return String::new();
    }
    if len < 0 {
        let c_str = unsafe { U16CStr::from_ptr_str(ptr) };
        return c_str.to_string_lossy();
    }
    let slice = unsafe { std::slice::from_raw_parts(ptr, len as usize) };
    String::from_utf16_lossy(slice)
}

/// Number of UTF-16 code units `s` encodes to.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Write `s` into a narrow output buffer of `cap` bytes, null-terminated.
/// Returns `(full_byte_len, truncated)`.
pub unsafe fn put_narrow(s: &str, buf: *mut SQLCHAR, cap: usize) -> (usize, bool) {
    let bytes = s.as_bytes();
    if buf.is_null() || cap == 0 {
        return (bytes.len(), !bytes.is_empty());
    }
    let copy = bytes.len().min(cap - 1);
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf, copy);
        *buf.add(copy) = 0;
    }
    (bytes.len(), copy < bytes.len())
}

/// Write `s` into a wide output buffer of `cap_units` UTF-16 code units,
/// null-terminated. Returns `(full_unit_len, truncated)`.
pub unsafe fn put_wide(s: &str, buf: *mut SQLWCHAR, cap_units: usize) -> (usize, bool) {
    let units: Vec<u16> = s.encode_utf16().collect();
    if buf.is_null() || cap_units == 0 {
        return (units.len(), !units.is_empty());
    }
    let copy = units.len().min(cap_units - 1);
    unsafe {
        std::ptr::copy_nonoverlapping(units.as_ptr(), buf, copy);
        *buf.add(copy) = 0;
    }
    (units.len(), copy < units.len())
}

/// Store a 16-bit length through an optional out-pointer.
pub unsafe fn put_smallint(out: *mut SQLSMALLINT, v: usize) {
    if !out.is_null() {
        unsafe { *out = v as SQLSMALLINT };
    }
}

/// Store a 32-bit length through an optional out-pointer.
pub unsafe fn put_integer(out: *mut SQLINTEGER, v: usize) {
    if !out.is_null() {
        unsafe { *out = v as SQLINTEGER };
    }
}

/// Common shape for string-returning informational calls: copy narrow,
/// report byte length, never warn (informational truncation is silent).
pub unsafe fn info_narrow(
    s: &str,
    buf: SQLPOINTER,
    cap: SQLSMALLINT,
    len_out: *mut SQLSMALLINT,
) -> SQLRETURN {
    let (full, _) = unsafe { put_narrow(s, buf as *mut SQLCHAR, cap.max(0) as usize) };
    unsafe { put_smallint(len_out, full) };
    SQL_SUCCESS
}

/// Wide counterpart of [`info_narrow`]; `len_out` receives bytes, the
/// convention GetInfoW-style calls use.
pub unsafe fn info_wide(
    s: &str,
    buf: SQLPOINTER,
    cap_bytes: SQLSMALLINT,
    len_out: *mut SQLSMALLINT,
) -> SQLRETURN {
    let cap_units = (cap_bytes.max(0) as usize) / 2;
    let (full, _) = unsafe { put_wide(s, buf as *mut SQLWCHAR, cap_units) };
    unsafe { put_smallint(len_out, full * 2) };
    SQL_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_arg_reads_explicit_and_nts_lengths() {
        let s = b"Server=localhost\0";
        unsafe {
            assert_eq!("Server", narrow_arg(s.as_ptr(), 6));
            assert_eq!("Server=localhost", narrow_arg(s.as_ptr(), SQL_NTS as SQLSMALLINT));
            assert_eq!("", narrow_arg(std::ptr::null(), SQL_NTS as SQLSMALLINT));
        }
    }

    #[test]
    fn wide_arg_handles_surrogate_pairs() {
        // U+1F408 (cat) encodes as a surrogate pair.
        let units: Vec<u16> = "db\u{1F408}\0".encode_utf16().collect();
        let read = unsafe { wide_arg(units.as_ptr(), SQL_NTS as SQLSMALLINT) };
        assert_eq!("db\u{1F408}", read);
    }

    #[test]
    fn put_narrow_truncates_and_reports_full_length() {
        let mut buf = [0u8; 5];
        let (full, truncated) = unsafe { put_narrow("hello world", buf.as_mut_ptr(), buf.len()) };
        assert_eq!(11, full);
        assert!(truncated);
        assert_eq!(b"hell\0", &buf);
    }

    #[test]
    fn put_narrow_fits_exactly_with_terminator() {
        let mut buf = [0xffu8; 6];
        let (full, truncated) = unsafe { put_narrow("hello", buf.as_mut_ptr(), buf.len()) };
        assert_eq!(5, full);
        assert!(!truncated);
        assert_eq!(b"hello\0", &buf);
    }

    #[test]
    fn put_wide_counts_code_units() {
        let mut buf = [0u16; 8];
        let (full, truncated) = unsafe { put_wide("\u{4f60}\u{597d}", buf.as_mut_ptr(), buf.len()) };
        assert_eq!(2, full);
        assert!(!truncated);
        assert_eq!([0x4f60, 0x597d, 0], buf[..3]);
    }

    #[test]
    fn put_wide_with_null_buffer_only_measures() {
        let (full, truncated) = unsafe { put_wide("abc", std::ptr::null_mut(), 0) };
        assert_eq!(3, full);
        assert!(truncated);
    }

    #[test]
    fn utf16_len_counts_pairs() {
        assert_eq!(2, utf16_len("\u{1F408}"));
        assert_eq!(2, utf16_len("\u{4f60}\u{597d}"));
    }
}
