//! Bound parameters: binding records, literal rendering, placeholder
//! substitution and the data-at-execution exchange.
//!
//! Parameters are not sent as server-side RPC arguments; each `?` is
//! replaced by the bound value's literal form before the batch goes out.
//! The placeholder scanner understands single-quoted strings (with `''`
//! escapes and the `N` prefix), bracketed identifiers and both comment
//! forms, so a `?` inside quoted text is never substituted.

use crate::types::*;

/// One application parameter binding, 1-based position. Rebinding a
/// position replaces the record.
#[allow(dead_code)]
pub struct BoundParam {
    pub number: u16,
    pub c_type: SQLSMALLINT,
    pub sql_type: SQLSMALLINT,
    pub column_size: SQLULEN,
    pub decimal_digits: SQLSMALLINT,
    pub value_ptr: SQLPOINTER,
    pub buffer_length: SQLLEN,
    pub indicator: *mut SQLLEN,
}

impl BoundParam {
    pub fn indicator_value(&self) -> Option<SQLLEN> {
        if self.indicator.is_null() {
            None
        } else {
            Some(unsafe { *self.indicator })
        }
    }

    /// True when the application deferred this parameter's value to the
    /// `SQLParamData`/`SQLPutData` exchange.
    pub fn wants_data_at_exec(&self) -> bool {
        self.indicator_value().is_some_and(is_data_at_exec)
    }

    /// The token handed back by `SQLParamData`: the application's own
    /// value pointer, reinterpreted as an opaque marker.
    pub fn app_token(&self) -> SQLPOINTER {
        self.value_ptr
    }
}

/// Progress of one data-at-execution exchange. Created when execute sees
/// a deferred parameter; consumed by the final `SQLParamData`.
pub struct DaeExchange {
    /// The statement text to run once every deferred value has arrived.
    pub sql: String,
    /// Parameter numbers awaiting data, in placeholder order.
    pub pending: Vec<u16>,
    /// Collected bytes, parallel to `pending`. A parameter fed no bytes
    /// stays an empty (not NULL) value.
    pub buffers: Vec<Vec<u8>>,
    /// Index of the parameter whose token was last handed out.
    pub current: usize,
    /// Whether the token for `current` has been delivered yet.
    pub delivered: bool,
}

impl DaeExchange {
    pub fn new(sql: String, pending: Vec<u16>) -> Self {
        let buffers = pending.iter().map(|_| Vec::new()).collect();
        DaeExchange {
            sql,
            pending,
            buffers,
            current: 0,
            delivered: false,
        }
    }

    /// Value bytes collected for parameter `number`, if it was deferred.
    pub fn collected(&self, number: u16) -> Option<&[u8]> {
        self.pending
            .iter()
            .position(|&n| n == number)
            .map(|i| self.buffers[i].as_slice())
    }
}

// ── Placeholder scanner ─────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
enum Lex {
    Plain,
    Quoted,
    Bracketed,
    LineComment,
    BlockComment(u32),
}

/// Rewrite every top-level `?` via `lookup` (1-based placeholder number);
/// a `None` keeps the `?` untouched. Returns the rewritten text and the
/// number of placeholders seen.
pub fn rewrite_placeholders(
    sql: &str,
    mut lookup: impl FnMut(u16) -> Option<String>,
) -> (String, usize) {
    let mut out = String::with_capacity(sql.len() + 32);
    let mut count = 0usize;
    let mut state = Lex::Plain;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Lex::Plain => match c {
                '?' => {
                    count += 1;
                    match lookup(count as u16) {
                        Some(lit) => out.push_str(&lit),
                        None => out.push('?'),
                    }
                    continue;
                }
                '\'' => state = Lex::Quoted,
                '[' => state = Lex::Bracketed,
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    out.push_str("--");
                    state = Lex::LineComment;
                    continue;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("/*");
                    state = Lex::BlockComment(1);
                    continue;
                }
                _ => {}
            },
            Lex::Quoted => {
                if c == '\'' {
                    // A doubled quote stays inside the literal.
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        out.push_str("''");
                        continue;
                    }
                    state = Lex::Plain;
                }
            }
            Lex::Bracketed => {
                if c == ']' {
                    state = Lex::Plain;
                }
            }
            Lex::LineComment => {
                if c == '\n' {
                    state = Lex::Plain;
                }
            }
            Lex::BlockComment(depth) => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("*/");
                    state = if depth == 1 {
                        Lex::Plain
                    } else {
                        Lex::BlockComment(depth - 1)
                    };
                    continue;
                }
                if c == '/' && chars.peek() == Some(&'*') {
                    chars.next();
                    out.push_str("/*");
                    state = Lex::BlockComment(depth + 1);
                    continue;
                }
            }
        }
        out.push(c);
    }
    (out, count)
}

/// Count the `?` placeholders that lie outside string literals, brackets
/// and comments.
pub fn placeholder_count(sql: &str) -> usize {
    rewrite_placeholders(sql, |_| None).1
}

// ── Literal rendering ───────────────────────────────────────────────

fn quote(s: &str, wide: bool) -> String {
    let prefix = if wide { "N" } else { "" };
    format!("{}'{}'", prefix, s.replace('\'', "''"))
}

fn numeric_sql_type(sql_type: SQLSMALLINT) -> bool {
    matches!(
        sql_type,
        SQL_INTEGER
            | SQL_SMALLINT
            | SQL_BIGINT
            | SQL_TINYINT
            | SQL_DOUBLE
            | SQL_FLOAT
            | SQL_REAL
            | SQL_DECIMAL
            | SQL_NUMERIC
            | SQL_BIT
    )
}

/// Character data arriving as text: numeric target types pass through
/// unquoted so `"42"` binds into an INT column, everything else becomes a
/// quoted literal. Wide C types carry the `N` prefix.
fn text_literal(s: &str, sql_type: SQLSMALLINT, wide: bool) -> String {
    if numeric_sql_type(sql_type) {
        s.to_string()
    } else {
        quote(s, wide)
    }
}

fn guid_literal(g: &SqlGuid) -> String {
    format!(
        "'{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}'",
        g.data1,
        g.data2,
        g.data3,
        g.data4[0],
        g.data4[1],
        g.data4[2],
        g.data4[3],
        g.data4[4],
        g.data4[5],
        g.data4[6],
        g.data4[7]
    )
}

fn binary_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        use std::fmt::Write;
        let _ = write!(out, "{:02x}", b);
    }
    out
}

fn timestamp_literal(ts: &SqlTimestampStruct) -> String {
    let millis = ts.fraction / 1_000_000;
    if millis > 0 {
        format!(
            "'{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}'",
            ts.year, ts.month, ts.day, ts.hour, ts.minute, ts.second, millis
        )
    } else {
        format!(
            "'{:04}-{:02}-{:02} {:02}:{:02}:{:02}'",
            ts.year, ts.month, ts.day, ts.hour, ts.minute, ts.second
        )
    }
}

/// Render a directly bound parameter as a SQL literal.
///
/// # Safety
/// `param.value_ptr`/`param.indicator` must still point at the
/// application buffers supplied to `SQLBindParameter`.
pub unsafe fn render_literal(param: &BoundParam) -> String {
    if param.indicator_value() == Some(SQL_NULL_DATA) || param.value_ptr.is_null() {
        return "NULL".to_string();
    }

    let p = param.value_ptr;
    unsafe {
        match param.c_type {
            SQL_C_LONG | SQL_C_SLONG => (*(p as *const i32)).to_string(),
            SQL_C_ULONG => (*(p as *const u32)).to_string(),
            SQL_C_SHORT | SQL_C_SSHORT => (*(p as *const i16)).to_string(),
            SQL_C_USHORT => (*(p as *const u16)).to_string(),
            SQL_C_STINYINT => (*(p as *const i8)).to_string(),
            SQL_C_UTINYINT => (*(p as *const u8)).to_string(),
            SQL_C_SBIGINT => (*(p as *const i64)).to_string(),
            SQL_C_UBIGINT => (*(p as *const u64)).to_string(),
            SQL_C_BIT => {
                let v = if *(p as *const u8) == 0 { "0" } else { "1" };
                v.to_string()
            }
            SQL_C_DOUBLE => (*(p as *const f64)).to_string(),
            SQL_C_FLOAT => (*(p as *const f32)).to_string(),
            SQL_C_TYPE_DATE => {
                let d = &*(p as *const SqlDateStruct);
                format!("'{:04}-{:02}-{:02}'", d.year, d.month, d.day)
            }
            SQL_C_TYPE_TIME => {
                let t = &*(p as *const SqlTimeStruct);
                format!("'{:02}:{:02}:{:02}'", t.hour, t.minute, t.second)
            }
            SQL_C_TYPE_TIMESTAMP => timestamp_literal(&*(p as *const SqlTimestampStruct)),
            SQL_C_GUID => guid_literal(&*(p as *const SqlGuid)),
            SQL_C_BINARY => {
                let len = match param.indicator_value() {
                    Some(n) if n >= 0 => n as usize,
                    _ => param.buffer_length.max(0) as usize,
                };
                binary_literal(std::slice::from_raw_parts(p as *const u8, len))
            }
            SQL_C_WCHAR => {
                let ptr = p as *const u16;
                let units = match param.indicator_value() {
                    Some(n) if n >= 0 => (n as usize) / 2,
                    _ => {
                        let mut n = 0usize;
                        while *ptr.add(n) != 0 {
                            n += 1;
                        }
                        n
                    }
                };
                let s = String::from_utf16_lossy(std::slice::from_raw_parts(ptr, units));
                text_literal(&s, param.sql_type, true)
            }
            // SQL_C_CHAR and anything unrecognized: treat as narrow text.
            _ => {
                let ptr = p as *const u8;
                let len = match param.indicator_value() {
                    Some(n) if n >= 0 => n as usize,
                    _ => {
                        let mut n = 0usize;
                        while *ptr.add(n) != 0 {
                            n += 1;
                        }
                        n
                    }
                };
                let s = String::from_utf8_lossy(std::slice::from_raw_parts(ptr, len));
                text_literal(&s, param.sql_type, false)
            }
        }
    }
}

/// Render a value collected through `SQLPutData` as a SQL literal. The
/// bytes are interpreted according to the parameter's C type; zero bytes
/// collected means the empty value, never NULL.
pub fn render_collected(param: &BoundParam, bytes: &[u8]) -> String {
    match param.c_type {
        SQL_C_WCHAR => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_ne_bytes([c[0], c[1]]))
                .collect();
            text_literal(&String::from_utf16_lossy(&units), param.sql_type, true)
        }
        SQL_C_BINARY => binary_literal(bytes),
        _ => text_literal(&String::from_utf8_lossy(bytes), param.sql_type, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    fn bound(number: u16, c_type: SQLSMALLINT, sql_type: SQLSMALLINT) -> BoundParam {
        BoundParam {
            number,
            c_type,
            sql_type,
            column_size: 0,
            decimal_digits: 0,
            value_ptr: ptr::null_mut(),
            buffer_length: 0,
            indicator: ptr::null_mut(),
        }
    }

    #[test]
    fn placeholders_inside_literals_do_not_count() {
        assert_eq!(2, placeholder_count("INSERT INTO t VALUES (?, ?)"));
        assert_eq!(1, placeholder_count("SELECT '?' , ? FROM t"));
        assert_eq!(0, placeholder_count("SELECT 'it''s a ?' FROM t"));
        assert_eq!(0, placeholder_count("SELECT [a?b] FROM t"));
        assert_eq!(1, placeholder_count("SELECT ? -- and ? in a comment"));
        assert_eq!(1, placeholder_count("SELECT /* ? /* ? */ ? */ ? "));
        assert_eq!(0, placeholder_count("SELECT N'?'"));
    }

    #[test]
    fn substitution_is_left_to_right() {
        let (out, n) = rewrite_placeholders("VALUES (?, '?', ?)", |i| Some(i.to_string()));
        assert_eq!("VALUES (1, '?', 2)", out);
        assert_eq!(2, n);
    }

    #[test]
    fn unresolved_placeholders_stay_put() {
        let (out, n) = rewrite_placeholders("VALUES (?)", |_| None);
        assert_eq!("VALUES (?)", out);
        assert_eq!(1, n);
    }

    #[test]
    fn integer_literals_render_in_decimal() {
        let mut v = 42i32;
        let mut p = bound(1, SQL_C_SLONG, SQL_INTEGER);
        p.value_ptr = &mut v as *mut i32 as SQLPOINTER;
        assert_eq!("42", unsafe { render_literal(&p) });
    }

    #[test]
    fn null_indicator_renders_null() {
        let mut v = 42i32;
        let mut ind = SQL_NULL_DATA;
        let mut p = bound(1, SQL_C_SLONG, SQL_INTEGER);
        p.value_ptr = &mut v as *mut i32 as SQLPOINTER;
        p.indicator = &mut ind;
        assert_eq!("NULL", unsafe { render_literal(&p) });
    }

    #[test]
    fn wide_strings_double_quotes_and_take_the_n_prefix() {
        let mut units: Vec<u16> = "it's".encode_utf16().chain([0]).collect();
        let mut p = bound(1, SQL_C_WCHAR, SQL_WVARCHAR);
        p.value_ptr = units.as_mut_ptr() as SQLPOINTER;
        assert_eq!("N'it''s'", unsafe { render_literal(&p) });
    }

    #[test]
    fn narrow_text_bound_to_numeric_targets_stays_raw() {
        let mut s = *b"42\0";
        let mut p = bound(1, SQL_C_CHAR, SQL_INTEGER);
        p.value_ptr = s.as_mut_ptr() as SQLPOINTER;
        assert_eq!("42", unsafe { render_literal(&p) });
    }

    #[test]
    fn narrow_strings_quote_without_the_n_prefix() {
        let mut s = *b"abc\0";
        let mut p = bound(1, SQL_C_CHAR, SQL_VARCHAR);
        p.value_ptr = s.as_mut_ptr() as SQLPOINTER;
        assert_eq!("'abc'", unsafe { render_literal(&p) });
    }

    #[test]
    fn binary_renders_as_hex_blob() {
        let mut data = [0xdeu8, 0xad, 0xbe, 0xef];
        let mut ind: SQLLEN = 4;
        let mut p = bound(1, SQL_C_BINARY, SQL_VARBINARY);
        p.value_ptr = data.as_mut_ptr() as SQLPOINTER;
        p.indicator = &mut ind;
        assert_eq!("0xdeadbeef", unsafe { render_literal(&p) });
    }

    #[test]
    fn timestamp_literal_keeps_millis_only_when_present() {
        let ts = SqlTimestampStruct {
            year: 2024,
            month: 7,
            day: 15,
            hour: 10,
            minute: 4,
            second: 9,
            fraction: 120_000_000,
        };
        assert_eq!("'2024-07-15 10:04:09.120'", timestamp_literal(&ts));
        let plain = SqlTimestampStruct { fraction: 0, ..ts };
        assert_eq!("'2024-07-15 10:04:09'", timestamp_literal(&plain));
    }

    #[test]
    fn guid_literal_is_hyphenated_uppercase() {
        let g = SqlGuid {
            data1: 0x0123_4567,
            data2: 0x89ab,
            data3: 0xcdef,
            data4: [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef],
        };
        assert_eq!("'01234567-89AB-CDEF-0123-456789ABCDEF'", guid_literal(&g));
    }

    #[test]
    fn collected_empty_wide_value_is_the_empty_string() {
        let p = bound(1, SQL_C_WCHAR, SQL_WVARCHAR);
        assert_eq!("N''", render_collected(&p, &[]));
    }

    #[test]
    fn collected_wide_bytes_decode_as_utf16() {
        let p = bound(1, SQL_C_WCHAR, SQL_WVARCHAR);
        let bytes: Vec<u8> = "hi".encode_utf16().flat_map(u16::to_ne_bytes).collect();
        assert_eq!("N'hi'", render_collected(&p, &bytes));
    }

    #[test]
    fn dae_exchange_tracks_buffers_by_parameter_number() {
        let mut dae = DaeExchange::new("INSERT INTO t VALUES (?, ?)".into(), vec![1, 2]);
        dae.buffers[0].extend_from_slice(b"abc");
        assert_eq!(Some(&b"abc"[..]), dae.collected(1));
        assert_eq!(Some(&[][..]), dae.collected(2));
        assert_eq!(None, dae.collected(3));
    }
}
