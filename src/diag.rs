//! Diagnostics: the per-handle record list, the internal error type and
//! the SQLSTATE taxonomy.
//!
//! Every failing operation pushes one [`DiagRecord`] on the owning handle
//! and returns `SQL_ERROR`; warnings push a record and return
//! `SQL_SUCCESS_WITH_INFO`. Records are retrieved by 1-based index and the
//! list is cleared at the start of the next operation that can produce
//! diagnostics.

use crate::conv;
use crate::types::*;
use thiserror::Error;

/// One diagnostic record: 5-character SQLSTATE, native error, message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagRecord {
    pub state: &'static str,
    pub native: i32,
    pub message: String,
}

impl DiagRecord {
    pub fn new(state: &'static str, native: i32, message: impl Into<String>) -> Self {
        DiagRecord {
            state,
            native,
            message: message.into(),
        }
    }

    /// Warning record for a server informational message.
    pub fn server_notice(number: u32, message: &str) -> Self {
        DiagRecord::new("01000", number as i32, message)
    }
}

/// Internal error type. Each variant owns its SQLSTATE so the taxonomy
/// lives in one place.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Unable to connect to data source: {0}")]
    Connect(#[source] tabby::error::Error),
    #[error("Connection does not exist or is not open")]
    NotConnected,
    #[error("Connection handle is already connected")]
    AlreadyConnected,
    #[error("{0}")]
    Tds(#[from] tabby::error::Error),
    #[error("Function sequence error: {0}")]
    Sequence(&'static str),
    #[error("Invalid cursor state")]
    CursorState,
    #[error("Invalid descriptor index {0}")]
    ColumnIndex(SQLUSMALLINT),
    #[error("Optional feature not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("{0}")]
    General(String),
}

impl DriverError {
    pub fn sqlstate(&self) -> &'static str {
        match self {
            DriverError::Connect(_) => "08001",
            DriverError::AlreadyConnected => "08002",
            DriverError::NotConnected => "08003",
            DriverError::Tds(e) => e.code().map(sqlstate_for_server).unwrap_or("HY000"),
            DriverError::Sequence(_) => "HY010",
            DriverError::CursorState => "24000",
            DriverError::ColumnIndex(_) => "07009",
            DriverError::NotImplemented(_) => "HYC00",
            DriverError::General(_) => "HY000",
        }
    }

    pub fn native(&self) -> i32 {
        match self {
            DriverError::Tds(e) | DriverError::Connect(e) => {
                e.code().map(|c| c as i32).unwrap_or(0)
            }
            _ => 0,
        }
    }

    pub fn into_record(self) -> DiagRecord {
        DiagRecord::new(self.sqlstate(), self.native(), self.to_string())
    }
}

/// Map a SQL Server error number to the SQLSTATE family it belongs to.
///
/// The table covers the errors applications routinely branch on; anything
/// else falls back to the general driver error class.
pub fn sqlstate_for_server(code: u32) -> &'static str {
    match code {
        // Integrity constraint violations: duplicate key, FK, NOT NULL.
        2601 | 2627 | 547 | 515 => "23000",
        // Object does not exist.
        208 | 3701 => "42S02",
        // Syntax and reference errors.
        102 | 105 | 156 | 207 | 209 | 1038 => "42000",
        // Arithmetic overflow / out of range.
        220 | 232 | 8115 => "22003",
        // String or binary data would be truncated.
        2628 | 8152 => "22001",
        // Conversion failures.
        241 | 242 => "22007",
        245 | 8114 => "22018",
        // Deadlock victim.
        1205 => "40001",
        _ => "HY000",
    }
}

/// Copy record `rec_number` (1-based) of `records` into narrow caller
/// buffers. Past-the-end indexes report `SQL_NO_DATA`.
pub fn fetch_record(
    records: &[DiagRecord],
    rec_number: SQLSMALLINT,
    sql_state: *mut SQLCHAR,
    native_error: *mut SQLINTEGER,
    message_text: *mut SQLCHAR,
    buffer_length: SQLSMALLINT,
    text_length: *mut SQLSMALLINT,
) -> SQLRETURN {
    let idx = (rec_number as usize).wrapping_sub(1);
    let Some(rec) = records.get(idx) else {
        return SQL_NO_DATA;
    };

    if !sql_state.is_null() {
        let state = rec.state.as_bytes();
        unsafe {
            std::ptr::copy_nonoverlapping(state.as_ptr(), sql_state, 5);
            *sql_state.add(5) = 0;
        }
    }
    if !native_error.is_null() {
        unsafe { *native_error = rec.native };
    }
    let (full, _) = unsafe {
        conv::put_narrow(
            &rec.message,
            message_text,
            buffer_length.max(0) as usize,
        )
    };
    unsafe { conv::put_smallint(text_length, full) };
    SQL_SUCCESS
}

/// Wide variant of [`fetch_record`]: each field of the canonical record is
/// widened to UTF-16 code units.
pub fn fetch_record_w(
    records: &[DiagRecord],
    rec_number: SQLSMALLINT,
    sql_state: *mut SQLWCHAR,
    native_error: *mut SQLINTEGER,
    message_text: *mut SQLWCHAR,
    buffer_length: SQLSMALLINT,
    text_length: *mut SQLSMALLINT,
) -> SQLRETURN {
    let idx = (rec_number as usize).wrapping_sub(1);
    let Some(rec) = records.get(idx) else {
        return SQL_NO_DATA;
    };

    if !sql_state.is_null() {
        for (i, b) in rec.state.bytes().take(5).enumerate() {
            unsafe { *sql_state.add(i) = b as u16 };
        }
        unsafe { *sql_state.add(5) = 0 };
    }
    if !native_error.is_null() {
        unsafe { *native_error = rec.native };
    }
    let (full, _) = unsafe {
        conv::put_wide(
            &rec.message,
            message_text,
            buffer_length.max(0) as usize,
        )
    };
    unsafe { conv::put_smallint(text_length, full) };
    SQL_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_codes_map_to_their_sqlstate_families() {
        assert_eq!("23000", sqlstate_for_server(2627));
        assert_eq!("23000", sqlstate_for_server(515));
        assert_eq!("42S02", sqlstate_for_server(208));
        assert_eq!("42000", sqlstate_for_server(156));
        assert_eq!("22003", sqlstate_for_server(8115));
        assert_eq!("40001", sqlstate_for_server(1205));
        assert_eq!("HY000", sqlstate_for_server(999_999));
    }

    #[test]
    fn driver_errors_carry_their_states() {
        assert_eq!("08003", DriverError::NotConnected.sqlstate());
        assert_eq!("HY010", DriverError::Sequence("no prepared statement").sqlstate());
        assert_eq!("24000", DriverError::CursorState.sqlstate());
        assert_eq!("07009", DriverError::ColumnIndex(0).sqlstate());
        assert_eq!("HYC00", DriverError::NotImplemented("SQLBindCol").sqlstate());
    }

    #[test]
    fn fetch_record_walks_by_one_based_index() {
        let records = vec![
            DiagRecord::new("42000", 102, "syntax"),
            DiagRecord::new("01004", 0, "truncated"),
        ];
        let mut state = [0u8; 6];
        let mut native = 0;
        let mut msg = [0u8; 32];
        let mut len = 0;

        let rc = fetch_record(
            &records,
            2,
            state.as_mut_ptr(),
            &mut native,
            msg.as_mut_ptr(),
            32,
            &mut len,
        );
        assert_eq!(SQL_SUCCESS, rc);
        assert_eq!(b"01004\0", &state);
        assert_eq!(9, len);

        let rc = fetch_record(
            &records,
            3,
            state.as_mut_ptr(),
            &mut native,
            msg.as_mut_ptr(),
            32,
            &mut len,
        );
        assert_eq!(SQL_NO_DATA, rc);
    }

    #[test]
    fn wide_retrieval_widens_bytes() {
        let records = vec![DiagRecord::new("08001", 0, "no route")];
        let mut state = [0u16; 6];
        let mut native = 0;
        let mut msg = [0u16; 16];
        let mut len = 0;

        let rc = fetch_record_w(
            &records,
            1,
            state.as_mut_ptr(),
            &mut native,
            msg.as_mut_ptr(),
            16,
            &mut len,
        );
        assert_eq!(SQL_SUCCESS, rc);
        assert_eq!('0' as u16, state[0]);
        assert_eq!('8' as u16, state[1]);
        assert_eq!('n' as u16, msg[0]);
        assert_eq!(8, len);
    }
}
