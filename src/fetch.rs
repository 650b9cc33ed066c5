//! The cursor and typed column retrieval: `SQLFetch` over the
//! materialized store and `SQLGetData` conversions from canonical text to
//! the requested C type.

use crate::conv;
use crate::diag::DriverError;
use crate::handle::{Statement, StmtState};
use crate::typemap;
use crate::types::*;
use std::ptr;

/// Advance the forward-only cursor. Past the last row the statement keeps
/// answering `SQL_NO_DATA`.
pub fn fetch(stmt: &mut Statement) -> SQLRETURN {
    stmt.diagnostics.clear();
    match stmt.state {
        StmtState::Executed | StmtState::Fetching => {}
        _ => return stmt.fail(DriverError::CursorState),
    }

    let next = stmt.row_index + 1;
    if next as usize >= stmt.rows.len() {
        stmt.row_index = stmt.rows.len() as isize;
        stmt.state = StmtState::Executed;
        return SQL_NO_DATA;
    }
    stmt.row_index = next;
    stmt.state = StmtState::Fetching;
    SQL_SUCCESS
}

/// `SQLFetchScroll`: only forward movement is supported.
pub fn fetch_scroll(stmt: &mut Statement, orientation: SQLSMALLINT) -> SQLRETURN {
    if orientation == SQL_FETCH_NEXT {
        return fetch(stmt);
    }
    stmt.diagnostics.clear();
    stmt.fail(DriverError::NotImplemented("scrollable fetch orientation"))
}

pub fn num_result_cols(stmt: &Statement) -> SQLSMALLINT {
    stmt.columns.len() as SQLSMALLINT
}

/// Retrieve column `col` of the current row as C type `target_type`.
/// `wide` marks the UTF-16 entry point, which turns character output into
/// UTF-16 code units.
pub fn get_data(
    stmt: &mut Statement,
    col: SQLUSMALLINT,
    target_type: SQLSMALLINT,
    target_value: SQLPOINTER,
    buffer_length: SQLLEN,
    str_len_or_ind: *mut SQLLEN,
    wide: bool,
) -> SQLRETURN {
    stmt.diagnostics.clear();

    if stmt.state != StmtState::Fetching
        || stmt.row_index < 0
        || stmt.row_index as usize >= stmt.rows.len()
    {
        return stmt.fail(DriverError::CursorState);
    }
    if col == 0 || col as usize > stmt.columns.len() {
        return stmt.fail(DriverError::ColumnIndex(col));
    }
    let col_idx = col as usize - 1;

    let Some(value) = stmt.rows[stmt.row_index as usize][col_idx].clone() else {
        // SQL NULL: signal through the indicator, leave the buffer alone.
        if !str_len_or_ind.is_null() {
            unsafe { *str_len_or_ind = SQL_NULL_DATA };
        }
        return SQL_SUCCESS;
    };

    let mut eff_type = if target_type == SQL_C_DEFAULT {
        typemap::default_c_type(stmt.columns[col_idx].sql_type)
    } else {
        target_type
    };
    if wide && eff_type == SQL_C_CHAR {
        eff_type = SQL_C_WCHAR;
    }

    match eff_type {
        SQL_C_WCHAR => {
            let cap_units = if buffer_length > 0 {
                buffer_length as usize / 2
            } else {
                0
            };
            let (full_units, truncated) = unsafe {
                conv::put_wide(&value, target_value as *mut SQLWCHAR, cap_units)
            };
            if !str_len_or_ind.is_null() {
                unsafe { *str_len_or_ind = (full_units * 2) as SQLLEN };
            }
            if truncated && !target_value.is_null() && buffer_length > 0 {
                stmt.warn("01004", "String data, right truncated");
                return SQL_SUCCESS_WITH_INFO;
            }
            SQL_SUCCESS
        }
        SQL_C_LONG | SQL_C_SLONG => {
            write_fixed(target_value, str_len_or_ind, value.parse::<i32>().unwrap_or(0))
        }
        SQL_C_ULONG => {
            write_fixed(target_value, str_len_or_ind, value.parse::<u32>().unwrap_or(0))
        }
        SQL_C_SHORT | SQL_C_SSHORT => {
            write_fixed(target_value, str_len_or_ind, value.parse::<i16>().unwrap_or(0))
        }
        SQL_C_USHORT => {
            write_fixed(target_value, str_len_or_ind, value.parse::<u16>().unwrap_or(0))
        }
        SQL_C_SBIGINT => {
            write_fixed(target_value, str_len_or_ind, value.parse::<i64>().unwrap_or(0))
        }
        SQL_C_UBIGINT => {
            write_fixed(target_value, str_len_or_ind, value.parse::<u64>().unwrap_or(0))
        }
        SQL_C_STINYINT => {
            write_fixed(target_value, str_len_or_ind, value.parse::<i8>().unwrap_or(0))
        }
        SQL_C_UTINYINT => {
            write_fixed(target_value, str_len_or_ind, value.parse::<u8>().unwrap_or(0))
        }
        SQL_C_DOUBLE => {
            write_fixed(target_value, str_len_or_ind, value.parse::<f64>().unwrap_or(0.0))
        }
        SQL_C_FLOAT => {
            write_fixed(target_value, str_len_or_ind, value.parse::<f32>().unwrap_or(0.0))
        }
        SQL_C_BIT => {
            let v: u8 = if value == "0" || value.is_empty() { 0 } else { 1 };
            write_fixed(target_value, str_len_or_ind, v)
        }
        SQL_C_TYPE_TIMESTAMP => {
            write_fixed(target_value, str_len_or_ind, parse_timestamp(&value))
        }
        SQL_C_TYPE_DATE => {
            let ts = parse_timestamp(&value);
            write_fixed(
                target_value,
                str_len_or_ind,
                SqlDateStruct {
                    year: ts.year,
                    month: ts.month,
                    day: ts.day,
                },
            )
        }
        SQL_C_TYPE_TIME => {
            let ts = parse_timestamp(&value);
            write_fixed(
                target_value,
                str_len_or_ind,
                SqlTimeStruct {
                    hour: ts.hour,
                    minute: ts.minute,
                    second: ts.second,
                },
            )
        }
        SQL_C_GUID => write_fixed(target_value, str_len_or_ind, parse_guid(&value)),
        SQL_C_BINARY => {
            let bytes = if value.len() % 2 == 0
                && !value.is_empty()
                && value.bytes().all(|b| b.is_ascii_hexdigit())
            {
                hex_decode(&value)
            } else {
                value.into_bytes()
            };
            if !str_len_or_ind.is_null() {
                unsafe { *str_len_or_ind = bytes.len() as SQLLEN };
            }
            if !target_value.is_null() && buffer_length > 0 {
                let copy = bytes.len().min(buffer_length as usize);
                unsafe {
                    ptr::copy_nonoverlapping(bytes.as_ptr(), target_value as *mut u8, copy);
                }
                if copy < bytes.len() {
                    stmt.warn("01004", "Binary data, right truncated");
                    return SQL_SUCCESS_WITH_INFO;
                }
            }
            SQL_SUCCESS
        }
        // SQL_C_CHAR and anything unrecognized: narrow text.
        _ => {
            let cap = if buffer_length > 0 {
                buffer_length as usize
            } else {
                0
            };
            let (full, truncated) =
                unsafe { conv::put_narrow(&value, target_value as *mut SQLCHAR, cap) };
            if !str_len_or_ind.is_null() {
                unsafe { *str_len_or_ind = full as SQLLEN };
            }
            if truncated && !target_value.is_null() && buffer_length > 0 {
                stmt.warn("01004", "String data, right truncated");
                return SQL_SUCCESS_WITH_INFO;
            }
            SQL_SUCCESS
        }
    }
}

fn write_fixed<T: Copy>(
    target_value: SQLPOINTER,
    str_len_or_ind: *mut SQLLEN,
    val: T,
) -> SQLRETURN {
    if !target_value.is_null() {
        unsafe { *(target_value as *mut T) = val };
    }
    if !str_len_or_ind.is_null() {
        unsafe { *str_len_or_ind = std::mem::size_of::<T>() as SQLLEN };
    }
    SQL_SUCCESS
}

/// `SQLDescribeCol`, narrow variant.
pub fn describe_col(
    stmt: &mut Statement,
    col_number: SQLUSMALLINT,
    col_name: *mut SQLCHAR,
    buffer_length: SQLSMALLINT,
    name_length: *mut SQLSMALLINT,
    data_type: *mut SQLSMALLINT,
    column_size: *mut SQLULEN,
    decimal_digits: *mut SQLSMALLINT,
    nullable: *mut SQLSMALLINT,
) -> SQLRETURN {
    stmt.diagnostics.clear();
    if col_number == 0 || col_number as usize > stmt.columns.len() {
        return stmt.fail(DriverError::ColumnIndex(col_number));
    }
    let col = &stmt.columns[col_number as usize - 1];
    unsafe {
        conv::put_narrow(&col.name, col_name, buffer_length.max(0) as usize);
        conv::put_smallint(name_length, col.name.len());
    }
    write_col_shape(col, data_type, column_size, decimal_digits, nullable);
    SQL_SUCCESS
}

/// `SQLDescribeColW`: the name goes out as UTF-16 code units.
pub fn describe_col_w(
    stmt: &mut Statement,
    col_number: SQLUSMALLINT,
    col_name: *mut SQLWCHAR,
    buffer_length: SQLSMALLINT,
    name_length: *mut SQLSMALLINT,
    data_type: *mut SQLSMALLINT,
    column_size: *mut SQLULEN,
    decimal_digits: *mut SQLSMALLINT,
    nullable: *mut SQLSMALLINT,
) -> SQLRETURN {
    stmt.diagnostics.clear();
    if col_number == 0 || col_number as usize > stmt.columns.len() {
        return stmt.fail(DriverError::ColumnIndex(col_number));
    }
    let col = &stmt.columns[col_number as usize - 1];
    unsafe {
        conv::put_wide(&col.name, col_name, buffer_length.max(0) as usize);
        conv::put_smallint(name_length, conv::utf16_len(&col.name));
    }
    write_col_shape(col, data_type, column_size, decimal_digits, nullable);
    SQL_SUCCESS
}

fn write_col_shape(
    col: &crate::rowset::ColumnDesc,
    data_type: *mut SQLSMALLINT,
    column_size: *mut SQLULEN,
    decimal_digits: *mut SQLSMALLINT,
    nullable: *mut SQLSMALLINT,
) {
    unsafe {
        if !data_type.is_null() {
            *data_type = col.sql_type;
        }
        if !column_size.is_null() {
            *column_size = col.size;
        }
        if !decimal_digits.is_null() {
            *decimal_digits = col.decimal_digits;
        }
        if !nullable.is_null() {
            *nullable = col.nullable;
        }
    }
}

/// `SQLColAttribute(W)`: one implementation behind both entry points;
/// `wide` selects the encoding of string-valued fields.
pub fn col_attribute(
    stmt: &mut Statement,
    col_number: SQLUSMALLINT,
    field_identifier: SQLUSMALLINT,
    char_attr: SQLPOINTER,
    buffer_length: SQLSMALLINT,
    string_length: *mut SQLSMALLINT,
    numeric_attr: *mut SQLLEN,
    wide: bool,
) -> SQLRETURN {
    // SQL_DESC_COUNT is asked with column number 0.
    if field_identifier == SQL_DESC_COUNT {
        if !numeric_attr.is_null() {
            unsafe { *numeric_attr = stmt.columns.len() as SQLLEN };
        }
        return SQL_SUCCESS;
    }

    if col_number == 0 || col_number as usize > stmt.columns.len() {
        return stmt.fail(DriverError::ColumnIndex(col_number));
    }
    let col = &stmt.columns[col_number as usize - 1];

    let put_str = |s: &str| -> SQLRETURN {
        if wide {
            let cap = (buffer_length.max(0) as usize) / 2;
            let (full, _) = unsafe { conv::put_wide(s, char_attr as *mut SQLWCHAR, cap) };
            unsafe { conv::put_smallint(string_length, full * 2) };
        } else {
            let (full, _) =
                unsafe { conv::put_narrow(s, char_attr as *mut SQLCHAR, buffer_length.max(0) as usize) };
            unsafe { conv::put_smallint(string_length, full) };
        }
        SQL_SUCCESS
    };
    let put_num = |v: SQLLEN| -> SQLRETURN {
        if !numeric_attr.is_null() {
            unsafe { *numeric_attr = v };
        }
        SQL_SUCCESS
    };

    match field_identifier {
        SQL_DESC_NAME | SQL_COLUMN_NAME | SQL_DESC_LABEL => put_str(&col.name),
        SQL_DESC_CONCISE_TYPE | SQL_DESC_TYPE => put_num(col.sql_type as SQLLEN),
        SQL_DESC_LENGTH | SQL_COLUMN_LENGTH => put_num(col.size as SQLLEN),
        SQL_DESC_DISPLAY_SIZE => put_num(typemap::display_size(col)),
        SQL_DESC_OCTET_LENGTH => put_num(col.size as SQLLEN),
        SQL_DESC_PRECISION => put_num(col.size as SQLLEN),
        SQL_DESC_SCALE => put_num(col.decimal_digits as SQLLEN),
        SQL_DESC_NULLABLE | SQL_COLUMN_NULLABLE => put_num(col.nullable as SQLLEN),
        SQL_DESC_UNNAMED => put_num(0),
        SQL_DESC_AUTO_UNIQUE_VALUE => put_num(0),
        SQL_DESC_CASE_SENSITIVE => put_num(0),
        SQL_DESC_FIXED_PREC_SCALE => put_num(0),
        SQL_DESC_SEARCHABLE => put_num(3),
        SQL_DESC_UNSIGNED => put_num(0),
        SQL_DESC_UPDATABLE => put_num(0),
        SQL_DESC_TABLE_NAME => put_str(""),
        SQL_DESC_TYPE_NAME => put_str(typemap::type_name(col.sql_type)),
        _ => put_num(0),
    }
}

/// Parse the canonical `YYYY-MM-DD[ HH:MM:SS[.fff]]` form. Missing or
/// malformed components fall back to zero.
fn parse_timestamp(s: &str) -> SqlTimestampStruct {
    let mut ts = SqlTimestampStruct::default();
    let mut parts = s.splitn(2, [' ', 'T']);

    if let Some(date_part) = parts.next() {
        let mut d = date_part.split('-');
        ts.year = d.next().and_then(|v| v.parse().ok()).unwrap_or(0);
        ts.month = d.next().and_then(|v| v.parse().ok()).unwrap_or(0);
        ts.day = d.next().and_then(|v| v.parse().ok()).unwrap_or(0);
    }
    if let Some(time_part) = parts.next() {
        // Ignore a trailing timezone offset.
        let time_str = time_part.split(['+', '-']).next().unwrap_or(time_part);
        let mut t = time_str.trim().split(':');
        ts.hour = t.next().and_then(|v| v.parse().ok()).unwrap_or(0);
        ts.minute = t.next().and_then(|v| v.parse().ok()).unwrap_or(0);
        if let Some(secs) = t.next() {
            let mut sp = secs.split('.');
            ts.second = sp.next().and_then(|v| v.parse().ok()).unwrap_or(0);
            if let Some(frac) = sp.next() {
                // Normalize to nanoseconds.
                let padded = format!("{:0<9}", frac);
                ts.fraction = padded[..9].parse().unwrap_or(0);
            }
        }
    }
    ts
}

fn parse_guid(s: &str) -> SqlGuid {
    match uuid::Uuid::parse_str(s.trim()) {
        Ok(u) => {
            let (data1, data2, data3, data4) = u.as_fields();
            SqlGuid {
                data1,
                data2,
                data3,
                data4: *data4,
            }
        }
        Err(_) => SqlGuid::default(),
    }
}

fn hex_decode(s: &str) -> Vec<u8> {
    fn nibble(b: u8) -> u8 {
        match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => 0,
        }
    }
    s.as_bytes()
        .chunks_exact(2)
        .map(|c| (nibble(c[0]) << 4) | nibble(c[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle;
    use crate::rowset::ColumnDesc;
    use std::ptr;

    fn statement_with_rows(
        columns: Vec<ColumnDesc>,
        rows: Vec<Vec<Option<String>>>,
    ) -> (SQLHANDLE, &'static mut Statement) {
        let mut env: SQLHANDLE = ptr::null_mut();
        let mut dbc: SQLHANDLE = ptr::null_mut();
        let mut hstmt: SQLHANDLE = ptr::null_mut();
        handle::alloc_env(&mut env);
        handle::alloc_connection(env, &mut dbc);
        handle::alloc_statement(dbc, &mut hstmt);
        let stmt = handle::stmt_mut(hstmt).unwrap();
        stmt.columns = columns;
        stmt.rows = rows;
        stmt.state = StmtState::Executed;
        (env, stmt)
    }

    fn int_col(name: &str) -> ColumnDesc {
        ColumnDesc {
            name: name.into(),
            sql_type: SQL_INTEGER,
            size: 10,
            decimal_digits: 0,
            nullable: SQL_NULLABLE,
        }
    }

    fn text_col(name: &str) -> ColumnDesc {
        ColumnDesc {
            name: name.into(),
            sql_type: SQL_WVARCHAR,
            size: 100,
            decimal_digits: 0,
            nullable: SQL_NULLABLE,
        }
    }

    #[test]
    fn fetch_walks_rows_then_sticks_at_no_data() {
        let (env, stmt) = statement_with_rows(
            vec![int_col("n")],
            vec![vec![Some("1".into())], vec![Some("2".into())]],
        );
        assert_eq!(SQL_SUCCESS, fetch(stmt));
        assert_eq!(SQL_SUCCESS, fetch(stmt));
        assert_eq!(SQL_NO_DATA, fetch(stmt));
        assert_eq!(SQL_NO_DATA, fetch(stmt));
        handle::free_env(env);
    }

    #[test]
    fn fetch_before_execute_reports_invalid_cursor() {
        let (env, stmt) = statement_with_rows(vec![], vec![]);
        stmt.state = StmtState::Idle;
        assert_eq!(SQL_ERROR, fetch(stmt));
        assert_eq!("24000", stmt.diagnostics[0].state);
        handle::free_env(env);
    }

    #[test]
    fn get_data_without_a_current_row_reports_invalid_cursor() {
        let (env, stmt) = statement_with_rows(vec![int_col("n")], vec![vec![Some("1".into())]]);
        let mut v = 0i32;
        let rc = get_data(
            stmt,
            1,
            SQL_C_SLONG,
            &mut v as *mut i32 as SQLPOINTER,
            4,
            ptr::null_mut(),
            false,
        );
        assert_eq!(SQL_ERROR, rc);
        assert_eq!("24000", stmt.diagnostics[0].state);
        handle::free_env(env);
    }

    #[test]
    fn column_zero_and_out_of_range_report_07009() {
        let (env, stmt) = statement_with_rows(vec![int_col("n")], vec![vec![Some("1".into())]]);
        fetch(stmt);
        let mut v = 0i32;
        let out = &mut v as *mut i32 as SQLPOINTER;
        assert_eq!(SQL_ERROR, get_data(stmt, 0, SQL_C_SLONG, out, 4, ptr::null_mut(), false));
        assert_eq!("07009", stmt.diagnostics[0].state);
        assert_eq!(SQL_ERROR, get_data(stmt, 2, SQL_C_SLONG, out, 4, ptr::null_mut(), false));
        assert_eq!("07009", stmt.diagnostics[0].state);
        handle::free_env(env);
    }

    #[test]
    fn null_cells_set_the_indicator_and_leave_the_buffer() {
        let (env, stmt) = statement_with_rows(vec![text_col("s")], vec![vec![None]]);
        fetch(stmt);
        let mut buf = *b"sentinel";
        let mut ind: SQLLEN = 0;
        let rc = get_data(
            stmt,
            1,
            SQL_C_CHAR,
            buf.as_mut_ptr() as SQLPOINTER,
            8,
            &mut ind,
            false,
        );
        assert_eq!(SQL_SUCCESS, rc);
        assert_eq!(SQL_NULL_DATA, ind);
        assert_eq!(b"sentinel", &buf);
        handle::free_env(env);
    }

    #[test]
    fn narrow_truncation_warns_and_reports_full_length() {
        let (env, stmt) =
            statement_with_rows(vec![text_col("s")], vec![vec![Some("0123456789".into())]]);
        fetch(stmt);
        let mut buf = [0u8; 5];
        let mut ind: SQLLEN = 0;
        let rc = get_data(
            stmt,
            1,
            SQL_C_CHAR,
            buf.as_mut_ptr() as SQLPOINTER,
            5,
            &mut ind,
            false,
        );
        assert_eq!(SQL_SUCCESS_WITH_INFO, rc);
        assert_eq!(10, ind);
        assert_eq!(b"0123\0", &buf);
        assert_eq!("01004", stmt.diagnostics[0].state);
        handle::free_env(env);
    }

    #[test]
    fn wide_retrieval_reports_byte_lengths() {
        let (env, stmt) =
            statement_with_rows(vec![text_col("s")], vec![vec![Some("\u{4f60}\u{597d}".into())]]);
        fetch(stmt);
        let mut buf = [0u16; 8];
        let mut ind: SQLLEN = 0;
        let rc = get_data(
            stmt,
            1,
            SQL_C_WCHAR,
            buf.as_mut_ptr() as SQLPOINTER,
            16,
            &mut ind,
            true,
        );
        assert_eq!(SQL_SUCCESS, rc);
        assert_eq!(4, ind);
        assert_eq!([0x4f60, 0x597d, 0], buf[..3]);
        handle::free_env(env);
    }

    #[test]
    fn integers_parse_and_bad_digits_become_zero() {
        let (env, stmt) = statement_with_rows(
            vec![int_col("a"), int_col("b")],
            vec![vec![Some("-42".into()), Some("bogus".into())]],
        );
        fetch(stmt);
        let mut v = 1i32;
        let mut ind: SQLLEN = 0;
        get_data(stmt, 1, SQL_C_SLONG, &mut v as *mut i32 as SQLPOINTER, 4, &mut ind, false);
        assert_eq!(-42, v);
        assert_eq!(4, ind);
        get_data(stmt, 2, SQL_C_SLONG, &mut v as *mut i32 as SQLPOINTER, 4, &mut ind, false);
        assert_eq!(0, v);
        handle::free_env(env);
    }

    #[test]
    fn timestamps_parse_into_odbc_structs() {
        let ts = parse_timestamp("2024-02-29 13:14:15.120");
        assert_eq!(2024, ts.year);
        assert_eq!(2, ts.month);
        assert_eq!(29, ts.day);
        assert_eq!(13, ts.hour);
        assert_eq!(15, ts.second);
        assert_eq!(120_000_000, ts.fraction);

        let date_only = parse_timestamp("2024-07-01");
        assert_eq!((2024, 7, 1), (date_only.year, date_only.month, date_only.day));
        assert_eq!(0, date_only.fraction);
    }

    #[test]
    fn guid_bytes_follow_the_mixed_endian_layout() {
        let g = parse_guid("01234567-89AB-CDEF-0123-456789ABCDEF");
        assert_eq!(0x0123_4567, g.data1);
        assert_eq!(0x89ab, g.data2);
        assert_eq!(0xcdef, g.data3);
        assert_eq!([0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef], g.data4);
        assert_eq!(SqlGuid::default(), parse_guid("not-a-guid"));
    }

    #[test]
    fn binary_hex_text_is_decoded() {
        let (env, stmt) = statement_with_rows(
            vec![ColumnDesc {
                name: "b".into(),
                sql_type: SQL_VARBINARY,
                size: 16,
                decimal_digits: 0,
                nullable: SQL_NULLABLE,
            }],
            vec![vec![Some("deadbeef".into())]],
        );
        fetch(stmt);
        let mut buf = [0u8; 8];
        let mut ind: SQLLEN = 0;
        let rc = get_data(
            stmt,
            1,
            SQL_C_BINARY,
            buf.as_mut_ptr() as SQLPOINTER,
            8,
            &mut ind,
            false,
        );
        assert_eq!(SQL_SUCCESS, rc);
        assert_eq!(4, ind);
        assert_eq!([0xde, 0xad, 0xbe, 0xef], buf[..4]);
        handle::free_env(env);
    }

    #[test]
    fn default_type_dispatches_through_the_column_sql_type() {
        let (env, stmt) = statement_with_rows(vec![int_col("n")], vec![vec![Some("9".into())]]);
        fetch(stmt);
        let mut v = 0i32;
        let mut ind: SQLLEN = 0;
        let rc = get_data(
            stmt,
            1,
            SQL_C_DEFAULT,
            &mut v as *mut i32 as SQLPOINTER,
            4,
            &mut ind,
            false,
        );
        assert_eq!(SQL_SUCCESS, rc);
        assert_eq!(9, v);
        handle::free_env(env);
    }
}
