//! Attribute handling and the driver-info surface: environment,
//! connection and statement attributes, `SQLGetInfo` and
//! `SQLGetFunctions`.

use crate::connect;
use crate::conv;
use crate::handle::{Connection, Environment, Statement};
use crate::types::*;

pub fn set_env_attr(
    env: &mut Environment,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    _string_length: SQLINTEGER,
) -> SQLRETURN {
    match attribute {
        SQL_ATTR_ODBC_VERSION => {
            env.odbc_version = value as SQLINTEGER;
            SQL_SUCCESS
        }
        // Unknown environment attributes are accepted and ignored.
        _ => SQL_SUCCESS,
    }
}

pub fn get_env_attr(
    env: &Environment,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    _buffer_length: SQLINTEGER,
    string_length: *mut SQLINTEGER,
) -> SQLRETURN {
    match attribute {
        SQL_ATTR_ODBC_VERSION => {
            if !value.is_null() {
                unsafe { *(value as *mut SQLINTEGER) = env.odbc_version };
            }
            unsafe { conv::put_integer(string_length, std::mem::size_of::<SQLINTEGER>()) };
            SQL_SUCCESS
        }
        _ => SQL_SUCCESS,
    }
}

pub fn set_connect_attr(
    conn: &mut Connection,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    _string_length: SQLINTEGER,
) -> SQLRETURN {
    match attribute {
        SQL_ATTR_AUTOCOMMIT => {
            let enable = value as SQLULEN != SQL_AUTOCOMMIT_OFF;
            connect::set_autocommit(conn, enable)
        }
        // Accepted and ignored; there are no driver-level deadlines.
        SQL_ATTR_LOGIN_TIMEOUT | SQL_ATTR_CONNECTION_TIMEOUT => SQL_SUCCESS,
        _ => SQL_SUCCESS,
    }
}

/// Shared by the narrow and wide entry points; both expose the autocommit
/// flag.
pub fn get_connect_attr(
    conn: &Connection,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    _buffer_length: SQLINTEGER,
    string_length: *mut SQLINTEGER,
) -> SQLRETURN {
    match attribute {
        SQL_ATTR_AUTOCOMMIT => {
            if !value.is_null() {
                unsafe {
                    *(value as *mut SQLULEN) = if conn.autocommit {
                        SQL_AUTOCOMMIT_ON
                    } else {
                        SQL_AUTOCOMMIT_OFF
                    };
                }
            }
            unsafe { conv::put_integer(string_length, std::mem::size_of::<SQLULEN>()) };
            SQL_SUCCESS
        }
        _ => SQL_SUCCESS,
    }
}

/// Cursor-shape and array-binding attributes arrive from every driver
/// manager; the driver runs a single-row forward cursor, so they are
/// accepted without effect.
pub fn set_stmt_attr(
    _stmt: &mut Statement,
    _attribute: SQLINTEGER,
    _value: SQLPOINTER,
    _string_length: SQLINTEGER,
) -> SQLRETURN {
    SQL_SUCCESS
}

pub fn get_stmt_attr(
    _stmt: &Statement,
    _attribute: SQLINTEGER,
    _value: SQLPOINTER,
    _buffer_length: SQLINTEGER,
    _string_length: *mut SQLINTEGER,
) -> SQLRETURN {
    SQL_SUCCESS
}

// ── SQLGetInfo ──────────────────────────────────────────────────────

enum InfoValue {
    Str(String),
    U16(u16),
    U32(u32),
}

/// One table answers both the narrow and the wide entry point.
fn info_value(conn: &Connection, info_type: SQLUSMALLINT) -> InfoValue {
    use InfoValue::*;
    match info_type {
        SQL_DRIVER_NAME => Str("libfurball.so".into()),
        SQL_DRIVER_VER => Str(driver_version()),
        SQL_ODBC_VER => Str("03.80.0000".into()),
        SQL_DBMS_NAME => Str("Microsoft SQL Server".into()),
        SQL_DBMS_VER => Str("16.00.0000".into()),
        SQL_SERVER_NAME => Str(conn.server.clone()),
        SQL_DATABASE_NAME => Str(conn.database.clone()),
        SQL_USER_NAME => Str(conn.uid.clone()),
        SQL_DATA_SOURCE_NAME => Str(String::new()),
        SQL_SEARCH_PATTERN_ESCAPE => Str("\\".into()),
        SQL_IDENTIFIER_QUOTE_CHAR => Str("\"".into()),
        SQL_CATALOG_NAME_SEPARATOR => Str(".".into()),
        SQL_CATALOG_TERM => Str("catalog".into()),
        SQL_SCHEMA_TERM => Str("schema".into()),
        SQL_TABLE_TERM => Str("table".into()),
        SQL_NEED_LONG_DATA_LEN => Str("N".into()),
        SQL_ACCESSIBLE_TABLES => Str("Y".into()),
        SQL_ACCESSIBLE_PROCEDURES => Str("Y".into()),
        SQL_MULT_RESULT_SETS => Str("Y".into()),
        SQL_MULTIPLE_ACTIVE_TXN => Str("Y".into()),
        SQL_DESCRIBE_PARAMETER => Str("Y".into()),
        SQL_PROCEDURES => Str("Y".into()),
        SQL_COLUMN_ALIAS => Str("Y".into()),
        SQL_EXPRESSIONS_IN_ORDERBY => Str("Y".into()),
        SQL_OUTER_JOINS => Str("Y".into()),
        SQL_ORDER_BY_COLUMNS_IN_SELECT => Str("Y".into()),
        SQL_SPECIAL_CHARACTERS => Str("_@#$".into()),
        SQL_MAX_DRIVER_CONNECTIONS => U16(0),
        SQL_CURSOR_COMMIT_BEHAVIOR => U16(0),
        SQL_CURSOR_ROLLBACK_BEHAVIOR => U16(0),
        SQL_TXN_CAPABLE => U16(SQL_TC_ALL),
        SQL_CONCAT_NULL_BEHAVIOR => U16(0),
        SQL_CORRELATION_NAME => U16(2),
        SQL_GROUP_BY => U16(2),
        SQL_QUOTED_IDENTIFIER_CASE => U16(3),
        SQL_NON_NULLABLE_COLUMNS => U16(1),
        SQL_NULL_COLLATION => U16(0),
        SQL_MAX_COLUMNS_IN_GROUP_BY => U16(0),
        SQL_MAX_COLUMNS_IN_ORDER_BY => U16(0),
        SQL_MAX_COLUMNS_IN_SELECT => U16(0),
        SQL_MAX_CATALOG_NAME_LEN => U16(128),
        SQL_MAX_SCHEMA_NAME_LEN => U16(128),
        SQL_MAX_TABLE_NAME_LEN => U16(128),
        SQL_MAX_COLUMN_NAME_LEN => U16(128),
        SQL_MAX_IDENTIFIER_LEN => U16(128),
        SQL_GETDATA_EXTENSIONS => U32(SQL_GD_ANY_COLUMN | SQL_GD_ANY_ORDER),
        SQL_TXN_ISOLATION_OPTION => U32(0x0F),
        SQL_DEFAULT_TXN_ISOLATION => U32(SQL_TXN_READ_COMMITTED),
        SQL_SUBQUERIES => U32(0x1F),
        SQL_UNION => U32(3),
        _ => Str(String::new()),
    }
}

fn driver_version() -> String {
    // "MM.mm.pppp" as ODBC expects it.
    let mut parts = env!("CARGO_PKG_VERSION").split('.');
    let major: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minor: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let patch: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    format!("{:02}.{:02}.{:04}", major, minor, patch)
}

pub fn get_info(
    conn: &Connection,
    info_type: SQLUSMALLINT,
    info_value_ptr: SQLPOINTER,
    buffer_length: SQLSMALLINT,
    string_length: *mut SQLSMALLINT,
) -> SQLRETURN {
    match info_value(conn, info_type) {
        InfoValue::Str(s) => unsafe {
            conv::info_narrow(&s, info_value_ptr, buffer_length, string_length)
        },
        InfoValue::U16(v) => write_scalar(info_value_ptr, string_length, v),
        InfoValue::U32(v) => write_scalar(info_value_ptr, string_length, v),
    }
}

pub fn get_info_w(
    conn: &Connection,
    info_type: SQLUSMALLINT,
    info_value_ptr: SQLPOINTER,
    buffer_length: SQLSMALLINT,
    string_length: *mut SQLSMALLINT,
) -> SQLRETURN {
    match info_value(conn, info_type) {
        InfoValue::Str(s) => unsafe {
            conv::info_wide(&s, info_value_ptr, buffer_length, string_length)
        },
        InfoValue::U16(v) => write_scalar(info_value_ptr, string_length, v),
        InfoValue::U32(v) => write_scalar(info_value_ptr, string_length, v),
    }
}

fn write_scalar<T: Copy>(
    out: SQLPOINTER,
    string_length: *mut SQLSMALLINT,
    v: T,
) -> SQLRETURN {
    if !out.is_null() {
        unsafe { *(out as *mut T) = v };
    }
    unsafe { conv::put_smallint(string_length, std::mem::size_of::<T>()) };
    SQL_SUCCESS
}

// ── SQLGetFunctions ─────────────────────────────────────────────────

/// Function ids (sql.h) for everything this driver exports.
const SUPPORTED_FUNCTIONS: &[u16] = &[
    1,    // SQLAllocConnect
    2,    // SQLAllocEnv
    3,    // SQLAllocStmt
    4,    // SQLBindCol
    5,    // SQLCancel
    6,    // SQLColAttribute
    7,    // SQLConnect
    8,    // SQLDescribeCol
    9,    // SQLDisconnect
    10,   // SQLError
    11,   // SQLExecDirect
    12,   // SQLExecute
    13,   // SQLFetch
    14,   // SQLFreeConnect
    15,   // SQLFreeEnv
    16,   // SQLFreeStmt
    18,   // SQLNumResultCols
    19,   // SQLPrepare
    20,   // SQLRowCount
    40,   // SQLColumns
    41,   // SQLDriverConnect
    43,   // SQLGetData
    44,   // SQLGetFunctions
    45,   // SQLGetInfo
    47,   // SQLGetTypeInfo
    48,   // SQLParamData
    49,   // SQLPutData
    52,   // SQLSpecialColumns
    53,   // SQLStatistics
    54,   // SQLTables
    60,   // SQLForeignKeys
    61,   // SQLMoreResults
    62,   // SQLNativeSql
    63,   // SQLNumParams
    65,   // SQLPrimaryKeys
    67,   // SQLProcedures
    72,   // SQLBindParameter
    1001, // SQLAllocHandle
    1003, // SQLCloseCursor
    1005, // SQLEndTran
    1006, // SQLFreeHandle
    1007, // SQLGetConnectAttr
    1010, // SQLGetDiagField
    1011, // SQLGetDiagRec
    1012, // SQLGetEnvAttr
    1014, // SQLGetStmtAttr
    1016, // SQLSetConnectAttr
    1019, // SQLSetEnvAttr
    1020, // SQLSetStmtAttr
    1021, // SQLFetchScroll
];

pub fn get_functions(function_id: SQLUSMALLINT, supported: *mut SQLUSMALLINT) -> SQLRETURN {
    if supported.is_null() {
        return SQL_SUCCESS;
    }
    if function_id == SQL_API_ODBC3_ALL_FUNCTIONS {
        let bitmap = unsafe {
            std::slice::from_raw_parts_mut(supported, SQL_API_ODBC3_ALL_FUNCTIONS_SIZE)
        };
        bitmap.fill(0);
        for &f in SUPPORTED_FUNCTIONS {
            let word = (f >> 4) as usize;
            if word < bitmap.len() {
                bitmap[word] |= 1 << (f & 0xF);
            }
        }
        return SQL_SUCCESS;
    }
    unsafe {
        *supported = SUPPORTED_FUNCTIONS.contains(&function_id) as SQLUSMALLINT;
    }
    SQL_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_connection() -> Connection {
        Connection {
            env: std::ptr::null_mut(),
            client: None,
            server: "db1:1433".into(),
            database: "sales".into(),
            uid: "reader".into(),
            connected: false,
            autocommit: true,
            in_transaction: false,
            diagnostics: Vec::new(),
            statements: Vec::new(),
        }
    }

    // Every id must hit its own arm; a mistyped constant in the match
    // would turn into a catch-all binding and shadow everything below it.
    #[test]
    fn info_ids_resolve_to_their_own_values() {
        let conn = open_connection();
        assert!(matches!(info_value(&conn, SQL_SERVER_NAME), InfoValue::Str(s) if s == "db1:1433"));
        assert!(matches!(info_value(&conn, SQL_DATABASE_NAME), InfoValue::Str(s) if s == "sales"));
        assert!(matches!(info_value(&conn, SQL_USER_NAME), InfoValue::Str(s) if s == "reader"));
        assert!(matches!(info_value(&conn, SQL_DATA_SOURCE_NAME), InfoValue::Str(s) if s.is_empty()));
        assert!(
            matches!(info_value(&conn, SQL_IDENTIFIER_QUOTE_CHAR), InfoValue::Str(s) if s == "\"")
        );
    }

    #[test]
    fn numeric_capabilities_are_scalars_not_strings() {
        let conn = open_connection();
        assert!(matches!(info_value(&conn, SQL_TXN_CAPABLE), InfoValue::U16(SQL_TC_ALL)));
        assert!(matches!(info_value(&conn, SQL_MAX_IDENTIFIER_LEN), InfoValue::U16(128)));
        assert!(matches!(
            info_value(&conn, SQL_GETDATA_EXTENSIONS),
            InfoValue::U32(v) if v == SQL_GD_ANY_COLUMN | SQL_GD_ANY_ORDER
        ));
        assert!(matches!(
            info_value(&conn, SQL_DEFAULT_TXN_ISOLATION),
            InfoValue::U32(SQL_TXN_READ_COMMITTED)
        ));
    }

    #[test]
    fn driver_version_has_the_odbc_shape() {
        let v = driver_version();
        let parts: Vec<&str> = v.split('.').collect();
        assert_eq!(3, parts.len());
        assert_eq!(2, parts[0].len());
        assert_eq!(2, parts[1].len());
        assert_eq!(4, parts[2].len());
    }

    #[test]
    fn functions_bitmap_covers_the_export_set() {
        let mut bitmap = [0u16; SQL_API_ODBC3_ALL_FUNCTIONS_SIZE];
        assert_eq!(
            SQL_SUCCESS,
            get_functions(SQL_API_ODBC3_ALL_FUNCTIONS, bitmap.as_mut_ptr())
        );
        for &f in SUPPORTED_FUNCTIONS {
            let word = (f >> 4) as usize;
            assert_ne!(0, bitmap[word] & (1 << (f & 0xF)), "function {} missing", f);
        }
        // SQLBrowseConnect is not exported.
        assert_eq!(0, bitmap[55 >> 4] & (1 << (55 & 0xF)));
    }

    #[test]
    fn individual_function_queries_answer_yes_and_no() {
        let mut flag: SQLUSMALLINT = 0xff;
        get_functions(12, &mut flag);
        assert_eq!(1, flag);
        get_functions(55, &mut flag);
        assert_eq!(0, flag);
    }
}
