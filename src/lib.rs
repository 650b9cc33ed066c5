//! # furball
//!
//! An ODBC driver for Microsoft SQL Server, implemented as a synchronous
//! façade over the asynchronous `tabby` TDS client. The driver manager
//! loads this library and dispatches the standard `SQL*` entry points
//! exported below; everything that touches the network crosses the
//! process-wide bridge in [`runtime`] and blocks the calling thread until
//! the TDS operation completes.
//!
//! Layering, leaves first: [`types`] (the C ABI), [`conv`] (UTF-8⇄UTF-16
//! at the boundary), [`diag`] (SQLSTATE taxonomy), [`rowset`]/[`typemap`]
//! (materialized results), [`handle`] (the Environment → Connection →
//! Statement tree), [`connect`]/[`execute`]/[`params`]/[`fetch`]
//! (the statement machinery), [`attr`] and [`catalog`] (driver info and
//! metadata queries).
#![allow(non_snake_case)]

mod attr;
mod catalog;
mod connect;
mod conv;
mod diag;
mod execute;
mod fetch;
mod handle;
mod params;
mod rowset;
mod runtime;
mod typemap;
pub mod types;

use handle::{StmtState, conn_mut, env_mut, stmt_mut};
use params::BoundParam;
use types::*;

// ── Handle management ───────────────────────────────────────────────

#[unsafe(no_mangle)]
pub extern "C" fn SQLAllocHandle(
    handle_type: SQLSMALLINT,
    input_handle: SQLHANDLE,
    output_handle: *mut SQLHANDLE,
) -> SQLRETURN {
    match handle_type {
        SQL_HANDLE_ENV => handle::alloc_env(output_handle),
        SQL_HANDLE_DBC => handle::alloc_connection(input_handle, output_handle),
        SQL_HANDLE_STMT => handle::alloc_statement(input_handle, output_handle),
        _ => SQL_ERROR,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLFreeHandle(handle_type: SQLSMALLINT, handle: SQLHANDLE) -> SQLRETURN {
    match handle_type {
        SQL_HANDLE_ENV => handle::free_env(handle),
        SQL_HANDLE_DBC => handle::free_connection(handle),
        SQL_HANDLE_STMT => handle::free_statement(handle),
        _ => SQL_ERROR,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLFreeStmt(hstmt: SQLHSTMT, option: SQLUSMALLINT) -> SQLRETURN {
    if option == SQL_DROP {
        return handle::free_statement(hstmt);
    }
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    match option {
        SQL_CLOSE => {
            stmt.close_cursor();
            SQL_SUCCESS
        }
        SQL_UNBIND => SQL_SUCCESS,
        SQL_RESET_PARAMS => {
            stmt.params.clear();
            stmt.dae = None;
            if stmt.state == StmtState::NeedData {
                stmt.state = StmtState::Prepared;
            }
            SQL_SUCCESS
        }
        _ => SQL_ERROR,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLCloseCursor(hstmt: SQLHSTMT) -> SQLRETURN {
    SQLFreeStmt(hstmt, SQL_CLOSE)
}

// ODBC 2.x allocation aliases.

#[unsafe(no_mangle)]
pub extern "C" fn SQLAllocEnv(phenv: *mut SQLHENV) -> SQLRETURN {
    handle::alloc_env(phenv)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLAllocConnect(henv: SQLHENV, phdbc: *mut SQLHDBC) -> SQLRETURN {
    handle::alloc_connection(henv, phdbc)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLAllocStmt(hdbc: SQLHDBC, phstmt: *mut SQLHSTMT) -> SQLRETURN {
    handle::alloc_statement(hdbc, phstmt)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLFreeEnv(henv: SQLHENV) -> SQLRETURN {
    handle::free_env(henv)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLFreeConnect(hdbc: SQLHDBC) -> SQLRETURN {
    handle::free_connection(hdbc)
}

// ── Connect / disconnect ────────────────────────────────────────────

fn driver_connect_common(hdbc: SQLHDBC, conn_str: &str) -> (SQLRETURN, String) {
    let Some(conn) = conn_mut(hdbc) else {
        return (SQL_INVALID_HANDLE, String::new());
    };
    let params = connect::parse_connection_string(conn_str);
    let canonical = params.canonical();
    (connect::open(conn, &params), canonical)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLDriverConnect(
    hdbc: SQLHDBC,
    _hwnd: SQLHWND,
    conn_str_in: *const SQLCHAR,
    conn_str_in_len: SQLSMALLINT,
    conn_str_out: *mut SQLCHAR,
    conn_str_out_max: SQLSMALLINT,
    conn_str_out_len: *mut SQLSMALLINT,
    _driver_completion: SQLUSMALLINT,
) -> SQLRETURN {
    let conn_str = unsafe { conv::narrow_arg(conn_str_in, conn_str_in_len) };
    let (rc, canonical) = driver_connect_common(hdbc, &conn_str);
    if sql_succeeded(rc) {
        let (full, _) = unsafe {
            conv::put_narrow(&canonical, conn_str_out, conn_str_out_max.max(0) as usize)
        };
        unsafe { conv::put_smallint(conn_str_out_len, full) };
    }
    rc
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLDriverConnectW(
    hdbc: SQLHDBC,
    _hwnd: SQLHWND,
    conn_str_in: *const SQLWCHAR,
    conn_str_in_len: SQLSMALLINT,
    conn_str_out: *mut SQLWCHAR,
    conn_str_out_max: SQLSMALLINT,
    conn_str_out_len: *mut SQLSMALLINT,
    _driver_completion: SQLUSMALLINT,
) -> SQLRETURN {
    let conn_str = unsafe { conv::wide_arg(conn_str_in, conn_str_in_len) };
    let (rc, canonical) = driver_connect_common(hdbc, &conn_str);
    if sql_succeeded(rc) {
        let (full, _) = unsafe {
            conv::put_wide(&canonical, conn_str_out, conn_str_out_max.max(0) as usize)
        };
        unsafe { conv::put_smallint(conn_str_out_len, full) };
    }
    rc
}

fn dsn_connect_common(hdbc: SQLHDBC, dsn: &str, uid: &str, pwd: &str) -> SQLRETURN {
    let Some(conn) = conn_mut(hdbc) else {
        return SQL_INVALID_HANDLE;
    };
    let mut params = connect::resolve_dsn(dsn);
    // Explicit credentials override the DSN file.
    if !uid.is_empty() {
        params.uid = uid.to_string();
    }
    if !pwd.is_empty() {
        params.pwd = pwd.to_string();
    }
    connect::open(conn, &params)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLConnect(
    hdbc: SQLHDBC,
    dsn: *const SQLCHAR,
    dsn_len: SQLSMALLINT,
    uid: *const SQLCHAR,
    uid_len: SQLSMALLINT,
    pwd: *const SQLCHAR,
    pwd_len: SQLSMALLINT,
) -> SQLRETURN {
    let dsn = unsafe { conv::narrow_arg(dsn, dsn_len) };
    let uid = unsafe { conv::narrow_arg(uid, uid_len) };
    let pwd = unsafe { conv::narrow_arg(pwd, pwd_len) };
    dsn_connect_common(hdbc, &dsn, &uid, &pwd)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLConnectW(
    hdbc: SQLHDBC,
    dsn: *const SQLWCHAR,
    dsn_len: SQLSMALLINT,
    uid: *const SQLWCHAR,
    uid_len: SQLSMALLINT,
    pwd: *const SQLWCHAR,
    pwd_len: SQLSMALLINT,
) -> SQLRETURN {
    let dsn = unsafe { conv::wide_arg(dsn, dsn_len) };
    let uid = unsafe { conv::wide_arg(uid, uid_len) };
    let pwd = unsafe { conv::wide_arg(pwd, pwd_len) };
    dsn_connect_common(hdbc, &dsn, &uid, &pwd)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLDisconnect(hdbc: SQLHDBC) -> SQLRETURN {
    let Some(conn) = conn_mut(hdbc) else {
        return SQL_INVALID_HANDLE;
    };
    connect::disconnect(conn)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLEndTran(
    handle_type: SQLSMALLINT,
    handle: SQLHANDLE,
    completion_type: SQLSMALLINT,
) -> SQLRETURN {
    match handle_type {
        SQL_HANDLE_DBC => {
            let Some(conn) = conn_mut(handle) else {
                return SQL_INVALID_HANDLE;
            };
            connect::end_tran(conn, completion_type)
        }
        SQL_HANDLE_ENV => {
            let Some(env) = env_mut(handle) else {
                return SQL_INVALID_HANDLE;
            };
            let mut rc = SQL_SUCCESS;
            for &conn in &env.connections {
                let conn = unsafe { &mut *conn };
                if connect::end_tran(conn, completion_type) == SQL_ERROR {
                    rc = SQL_ERROR;
                }
            }
            rc
        }
        _ => SQL_INVALID_HANDLE,
    }
}

// ── Attributes & driver info ────────────────────────────────────────

#[unsafe(no_mangle)]
pub extern "C" fn SQLSetEnvAttr(
    henv: SQLHENV,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    string_length: SQLINTEGER,
) -> SQLRETURN {
    let Some(env) = env_mut(henv) else {
        return SQL_INVALID_HANDLE;
    };
    attr::set_env_attr(env, attribute, value, string_length)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetEnvAttr(
    henv: SQLHENV,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    buffer_length: SQLINTEGER,
    string_length: *mut SQLINTEGER,
) -> SQLRETURN {
    let Some(env) = env_mut(henv) else {
        return SQL_INVALID_HANDLE;
    };
    attr::get_env_attr(env, attribute, value, buffer_length, string_length)
}

fn set_connect_attr_common(
    hdbc: SQLHDBC,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    string_length: SQLINTEGER,
) -> SQLRETURN {
    let Some(conn) = conn_mut(hdbc) else {
        return SQL_INVALID_HANDLE;
    };
    attr::set_connect_attr(conn, attribute, value, string_length)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLSetConnectAttr(
    hdbc: SQLHDBC,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    string_length: SQLINTEGER,
) -> SQLRETURN {
    set_connect_attr_common(hdbc, attribute, value, string_length)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLSetConnectAttrW(
    hdbc: SQLHDBC,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    string_length: SQLINTEGER,
) -> SQLRETURN {
    set_connect_attr_common(hdbc, attribute, value, string_length)
}

fn get_connect_attr_common(
    hdbc: SQLHDBC,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    buffer_length: SQLINTEGER,
    string_length: *mut SQLINTEGER,
) -> SQLRETURN {
    let Some(conn) = conn_mut(hdbc) else {
        return SQL_INVALID_HANDLE;
    };
    attr::get_connect_attr(conn, attribute, value, buffer_length, string_length)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetConnectAttr(
    hdbc: SQLHDBC,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    buffer_length: SQLINTEGER,
    string_length: *mut SQLINTEGER,
) -> SQLRETURN {
    get_connect_attr_common(hdbc, attribute, value, buffer_length, string_length)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetConnectAttrW(
    hdbc: SQLHDBC,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    buffer_length: SQLINTEGER,
    string_length: *mut SQLINTEGER,
) -> SQLRETURN {
    get_connect_attr_common(hdbc, attribute, value, buffer_length, string_length)
}

fn set_stmt_attr_common(
    hstmt: SQLHSTMT,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    string_length: SQLINTEGER,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    attr::set_stmt_attr(stmt, attribute, value, string_length)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLSetStmtAttr(
    hstmt: SQLHSTMT,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    string_length: SQLINTEGER,
) -> SQLRETURN {
    set_stmt_attr_common(hstmt, attribute, value, string_length)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLSetStmtAttrW(
    hstmt: SQLHSTMT,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    string_length: SQLINTEGER,
) -> SQLRETURN {
    set_stmt_attr_common(hstmt, attribute, value, string_length)
}

fn get_stmt_attr_common(
    hstmt: SQLHSTMT,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    buffer_length: SQLINTEGER,
    string_length: *mut SQLINTEGER,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    attr::get_stmt_attr(stmt, attribute, value, buffer_length, string_length)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetStmtAttr(
    hstmt: SQLHSTMT,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    buffer_length: SQLINTEGER,
    string_length: *mut SQLINTEGER,
) -> SQLRETURN {
    get_stmt_attr_common(hstmt, attribute, value, buffer_length, string_length)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetStmtAttrW(
    hstmt: SQLHSTMT,
    attribute: SQLINTEGER,
    value: SQLPOINTER,
    buffer_length: SQLINTEGER,
    string_length: *mut SQLINTEGER,
) -> SQLRETURN {
    get_stmt_attr_common(hstmt, attribute, value, buffer_length, string_length)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetInfo(
    hdbc: SQLHDBC,
    info_type: SQLUSMALLINT,
    info_value: SQLPOINTER,
    buffer_length: SQLSMALLINT,
    string_length: *mut SQLSMALLINT,
) -> SQLRETURN {
    let Some(conn) = conn_mut(hdbc) else {
        return SQL_INVALID_HANDLE;
    };
    attr::get_info(conn, info_type, info_value, buffer_length, string_length)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetInfoW(
    hdbc: SQLHDBC,
    info_type: SQLUSMALLINT,
    info_value: SQLPOINTER,
    buffer_length: SQLSMALLINT,
    string_length: *mut SQLSMALLINT,
) -> SQLRETURN {
    let Some(conn) = conn_mut(hdbc) else {
        return SQL_INVALID_HANDLE;
    };
    attr::get_info_w(conn, info_type, info_value, buffer_length, string_length)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetFunctions(
    hdbc: SQLHDBC,
    function_id: SQLUSMALLINT,
    supported: *mut SQLUSMALLINT,
) -> SQLRETURN {
    if conn_mut(hdbc).is_none() {
        return SQL_INVALID_HANDLE;
    }
    attr::get_functions(function_id, supported)
}

// ── Prepare / execute ───────────────────────────────────────────────

#[unsafe(no_mangle)]
pub extern "C" fn SQLPrepare(
    hstmt: SQLHSTMT,
    statement_text: *const SQLCHAR,
    text_length: SQLINTEGER,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let sql = unsafe { conv::narrow_arg_isize(statement_text, text_length as SQLLEN) };
    execute::prepare(stmt, &sql)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLPrepareW(
    hstmt: SQLHSTMT,
    statement_text: *const SQLWCHAR,
    text_length: SQLINTEGER,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let sql = unsafe { conv::wide_arg_isize(statement_text, text_length as SQLLEN) };
    execute::prepare(stmt, &sql)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLExecute(hstmt: SQLHSTMT) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    execute::execute_prepared(stmt)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLExecDirect(
    hstmt: SQLHSTMT,
    statement_text: *const SQLCHAR,
    text_length: SQLINTEGER,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let sql = unsafe { conv::narrow_arg_isize(statement_text, text_length as SQLLEN) };
    execute::exec_direct(stmt, &sql)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLExecDirectW(
    hstmt: SQLHSTMT,
    statement_text: *const SQLWCHAR,
    text_length: SQLINTEGER,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let sql = unsafe { conv::wide_arg_isize(statement_text, text_length as SQLLEN) };
    execute::exec_direct(stmt, &sql)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLBindParameter(
    hstmt: SQLHSTMT,
    param_number: SQLUSMALLINT,
    _input_output_type: SQLSMALLINT,
    value_type: SQLSMALLINT,
    parameter_type: SQLSMALLINT,
    column_size: SQLULEN,
    decimal_digits: SQLSMALLINT,
    parameter_value: SQLPOINTER,
    buffer_length: SQLLEN,
    str_len_or_ind: *mut SQLLEN,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let param = BoundParam {
        number: param_number,
        c_type: value_type,
        sql_type: parameter_type,
        column_size,
        decimal_digits,
        value_ptr: parameter_value,
        buffer_length,
        indicator: str_len_or_ind,
    };
    match stmt.params.iter_mut().find(|p| p.number == param_number) {
        Some(existing) => *existing = param,
        None => stmt.params.push(param),
    }
    SQL_SUCCESS
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLParamData(hstmt: SQLHSTMT, value: *mut SQLPOINTER) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    execute::param_data(stmt, value)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLPutData(
    hstmt: SQLHSTMT,
    data: SQLPOINTER,
    str_len_or_ind: SQLLEN,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    execute::put_data(stmt, data, str_len_or_ind)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLNumParams(hstmt: SQLHSTMT, param_count: *mut SQLSMALLINT) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    unsafe { conv::put_smallint(param_count, stmt.param_count) };
    SQL_SUCCESS
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLNativeSql(
    hdbc: SQLHDBC,
    in_statement: *const SQLCHAR,
    text_length: SQLINTEGER,
    out_statement: *mut SQLCHAR,
    buffer_length: SQLINTEGER,
    text_length_ptr: *mut SQLINTEGER,
) -> SQLRETURN {
    if conn_mut(hdbc).is_none() {
        return SQL_INVALID_HANDLE;
    }
    // Parameters are substituted at execute time; the text passes through.
    let sql = unsafe { conv::narrow_arg_isize(in_statement, text_length as SQLLEN) };
    let (full, _) = unsafe { conv::put_narrow(&sql, out_statement, buffer_length.max(0) as usize) };
    unsafe { conv::put_integer(text_length_ptr, full) };
    SQL_SUCCESS
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLNativeSqlW(
    hdbc: SQLHDBC,
    in_statement: *const SQLWCHAR,
    text_length: SQLINTEGER,
    out_statement: *mut SQLWCHAR,
    buffer_length: SQLINTEGER,
    text_length_ptr: *mut SQLINTEGER,
) -> SQLRETURN {
    if conn_mut(hdbc).is_none() {
        return SQL_INVALID_HANDLE;
    }
    let sql = unsafe { conv::wide_arg_isize(in_statement, text_length as SQLLEN) };
    let (full, _) = unsafe { conv::put_wide(&sql, out_statement, buffer_length.max(0) as usize) };
    unsafe { conv::put_integer(text_length_ptr, full) };
    SQL_SUCCESS
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLCancel(hstmt: SQLHSTMT) -> SQLRETURN {
    // Accepted without effect; there is nothing asynchronous to cancel.
    if stmt_mut(hstmt).is_none() {
        return SQL_INVALID_HANDLE;
    }
    SQL_SUCCESS
}

// ── Results ─────────────────────────────────────────────────────────

#[unsafe(no_mangle)]
pub extern "C" fn SQLNumResultCols(hstmt: SQLHSTMT, column_count: *mut SQLSMALLINT) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    if !column_count.is_null() {
        unsafe { *column_count = fetch::num_result_cols(stmt) };
    }
    SQL_SUCCESS
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLRowCount(hstmt: SQLHSTMT, row_count: *mut SQLLEN) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    if !row_count.is_null() {
        unsafe { *row_count = stmt.row_count };
    }
    SQL_SUCCESS
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLDescribeCol(
    hstmt: SQLHSTMT,
    col_number: SQLUSMALLINT,
    col_name: *mut SQLCHAR,
    buffer_length: SQLSMALLINT,
    name_length: *mut SQLSMALLINT,
    data_type: *mut SQLSMALLINT,
    column_size: *mut SQLULEN,
    decimal_digits: *mut SQLSMALLINT,
    nullable: *mut SQLSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    fetch::describe_col(
        stmt,
        col_number,
        col_name,
        buffer_length,
        name_length,
        data_type,
        column_size,
        decimal_digits,
        nullable,
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLDescribeColW(
    hstmt: SQLHSTMT,
    col_number: SQLUSMALLINT,
    col_name: *mut SQLWCHAR,
    buffer_length: SQLSMALLINT,
    name_length: *mut SQLSMALLINT,
    data_type: *mut SQLSMALLINT,
    column_size: *mut SQLULEN,
    decimal_digits: *mut SQLSMALLINT,
    nullable: *mut SQLSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    fetch::describe_col_w(
        stmt,
        col_number,
        col_name,
        buffer_length,
        name_length,
        data_type,
        column_size,
        decimal_digits,
        nullable,
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLColAttribute(
    hstmt: SQLHSTMT,
    col_number: SQLUSMALLINT,
    field_identifier: SQLUSMALLINT,
    char_attr: SQLPOINTER,
    buffer_length: SQLSMALLINT,
    string_length: *mut SQLSMALLINT,
    numeric_attr: *mut SQLLEN,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    fetch::col_attribute(
        stmt,
        col_number,
        field_identifier,
        char_attr,
        buffer_length,
        string_length,
        numeric_attr,
        false,
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLColAttributeW(
    hstmt: SQLHSTMT,
    col_number: SQLUSMALLINT,
    field_identifier: SQLUSMALLINT,
    char_attr: SQLPOINTER,
    buffer_length: SQLSMALLINT,
    string_length: *mut SQLSMALLINT,
    numeric_attr: *mut SQLLEN,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    fetch::col_attribute(
        stmt,
        col_number,
        field_identifier,
        char_attr,
        buffer_length,
        string_length,
        numeric_attr,
        true,
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLFetch(hstmt: SQLHSTMT) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    fetch::fetch(stmt)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLFetchScroll(
    hstmt: SQLHSTMT,
    fetch_orientation: SQLSMALLINT,
    _fetch_offset: SQLLEN,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    fetch::fetch_scroll(stmt, fetch_orientation)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetData(
    hstmt: SQLHSTMT,
    col: SQLUSMALLINT,
    target_type: SQLSMALLINT,
    target_value: SQLPOINTER,
    buffer_length: SQLLEN,
    str_len_or_ind: *mut SQLLEN,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    fetch::get_data(
        stmt,
        col,
        target_type,
        target_value,
        buffer_length,
        str_len_or_ind,
        false,
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetDataW(
    hstmt: SQLHSTMT,
    col: SQLUSMALLINT,
    target_type: SQLSMALLINT,
    target_value: SQLPOINTER,
    buffer_length: SQLLEN,
    str_len_or_ind: *mut SQLLEN,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    fetch::get_data(
        stmt,
        col,
        target_type,
        target_value,
        buffer_length,
        str_len_or_ind,
        true,
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLBindCol(
    hstmt: SQLHSTMT,
    _col_number: SQLUSMALLINT,
    _target_type: SQLSMALLINT,
    _target_value: SQLPOINTER,
    _buffer_length: SQLLEN,
    _str_len_or_ind: *mut SQLLEN,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    stmt.diagnostics.clear();
    stmt.fail(diag::DriverError::NotImplemented(
        "column binding; use SQLGetData",
    ))
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLMoreResults(hstmt: SQLHSTMT) -> SQLRETURN {
    // Only the first result set of a batch is materialized.
    if stmt_mut(hstmt).is_none() {
        return SQL_INVALID_HANDLE;
    }
    SQL_NO_DATA
}

// ── Diagnostics ─────────────────────────────────────────────────────

fn diag_records<'a>(
    handle_type: SQLSMALLINT,
    handle: SQLHANDLE,
) -> Result<&'a [diag::DiagRecord], SQLRETURN> {
    match handle_type {
        // Environment handles hold no diagnostics.
        SQL_HANDLE_ENV => {
            if env_mut(handle).is_none() {
                Err(SQL_INVALID_HANDLE)
            } else {
                Err(SQL_NO_DATA)
            }
        }
        SQL_HANDLE_DBC => match conn_mut(handle) {
            Some(conn) => Ok(&conn.diagnostics),
            None => Err(SQL_INVALID_HANDLE),
        },
        SQL_HANDLE_STMT => match stmt_mut(handle) {
            Some(stmt) => Ok(&stmt.diagnostics),
            None => Err(SQL_INVALID_HANDLE),
        },
        _ => Err(SQL_INVALID_HANDLE),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetDiagRec(
    handle_type: SQLSMALLINT,
    handle: SQLHANDLE,
    rec_number: SQLSMALLINT,
    sql_state: *mut SQLCHAR,
    native_error: *mut SQLINTEGER,
    message_text: *mut SQLCHAR,
    buffer_length: SQLSMALLINT,
    text_length: *mut SQLSMALLINT,
) -> SQLRETURN {
    match diag_records(handle_type, handle) {
        Ok(records) => diag::fetch_record(
            records,
            rec_number,
            sql_state,
            native_error,
            message_text,
            buffer_length,
            text_length,
        ),
        Err(rc) => rc,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetDiagRecW(
    handle_type: SQLSMALLINT,
    handle: SQLHANDLE,
    rec_number: SQLSMALLINT,
    sql_state: *mut SQLWCHAR,
    native_error: *mut SQLINTEGER,
    message_text: *mut SQLWCHAR,
    buffer_length: SQLSMALLINT,
    text_length: *mut SQLSMALLINT,
) -> SQLRETURN {
    match diag_records(handle_type, handle) {
        Ok(records) => diag::fetch_record_w(
            records,
            rec_number,
            sql_state,
            native_error,
            message_text,
            buffer_length,
            text_length,
        ),
        Err(rc) => rc,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetDiagField(
    _handle_type: SQLSMALLINT,
    _handle: SQLHANDLE,
    _rec_number: SQLSMALLINT,
    _diag_identifier: SQLSMALLINT,
    _diag_info: SQLPOINTER,
    _buffer_length: SQLSMALLINT,
    _string_length: *mut SQLSMALLINT,
) -> SQLRETURN {
    SQL_NO_DATA
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetDiagFieldW(
    handle_type: SQLSMALLINT,
    handle: SQLHANDLE,
    rec_number: SQLSMALLINT,
    diag_identifier: SQLSMALLINT,
    diag_info: SQLPOINTER,
    buffer_length: SQLSMALLINT,
    string_length: *mut SQLSMALLINT,
) -> SQLRETURN {
    SQLGetDiagField(
        handle_type,
        handle,
        rec_number,
        diag_identifier,
        diag_info,
        buffer_length,
        string_length,
    )
}

/// ODBC 2.x error retrieval: statement first, then connection, then
/// environment.
#[unsafe(no_mangle)]
pub extern "C" fn SQLError(
    henv: SQLHENV,
    hdbc: SQLHDBC,
    hstmt: SQLHSTMT,
    sql_state: *mut SQLCHAR,
    native_error: *mut SQLINTEGER,
    message_text: *mut SQLCHAR,
    buffer_length: SQLSMALLINT,
    text_length: *mut SQLSMALLINT,
) -> SQLRETURN {
    for (kind, h) in [
        (SQL_HANDLE_STMT, hstmt),
        (SQL_HANDLE_DBC, hdbc),
        (SQL_HANDLE_ENV, henv),
    ] {
        if !h.is_null() {
            return SQLGetDiagRec(
                kind,
                h,
                1,
                sql_state,
                native_error,
                message_text,
                buffer_length,
                text_length,
            );
        }
    }
    SQL_NO_DATA
}

// ── Catalog functions ───────────────────────────────────────────────

#[unsafe(no_mangle)]
pub extern "C" fn SQLTables(
    hstmt: SQLHSTMT,
    catalog: *const SQLCHAR,
    catalog_len: SQLSMALLINT,
    schema: *const SQLCHAR,
    schema_len: SQLSMALLINT,
    table: *const SQLCHAR,
    table_len: SQLSMALLINT,
    table_type: *const SQLCHAR,
    table_type_len: SQLSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let cat = unsafe { conv::narrow_arg(catalog, catalog_len) };
    let sch = unsafe { conv::narrow_arg(schema, schema_len) };
    let tbl = unsafe { conv::narrow_arg(table, table_len) };
    let tt = unsafe { conv::narrow_arg(table_type, table_type_len) };
    catalog::tables(stmt, &cat, &sch, &tbl, &tt)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLTablesW(
    hstmt: SQLHSTMT,
    catalog: *const SQLWCHAR,
    catalog_len: SQLSMALLINT,
    schema: *const SQLWCHAR,
    schema_len: SQLSMALLINT,
    table: *const SQLWCHAR,
    table_len: SQLSMALLINT,
    table_type: *const SQLWCHAR,
    table_type_len: SQLSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let cat = unsafe { conv::wide_arg(catalog, catalog_len) };
    let sch = unsafe { conv::wide_arg(schema, schema_len) };
    let tbl = unsafe { conv::wide_arg(table, table_len) };
    let tt = unsafe { conv::wide_arg(table_type, table_type_len) };
    catalog::tables(stmt, &cat, &sch, &tbl, &tt)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLColumns(
    hstmt: SQLHSTMT,
    catalog: *const SQLCHAR,
    catalog_len: SQLSMALLINT,
    schema: *const SQLCHAR,
    schema_len: SQLSMALLINT,
    table: *const SQLCHAR,
    table_len: SQLSMALLINT,
    column: *const SQLCHAR,
    column_len: SQLSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let cat = unsafe { conv::narrow_arg(catalog, catalog_len) };
    let sch = unsafe { conv::narrow_arg(schema, schema_len) };
    let tbl = unsafe { conv::narrow_arg(table, table_len) };
    let col = unsafe { conv::narrow_arg(column, column_len) };
    catalog::columns(stmt, &cat, &sch, &tbl, &col)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLColumnsW(
    hstmt: SQLHSTMT,
    catalog: *const SQLWCHAR,
    catalog_len: SQLSMALLINT,
    schema: *const SQLWCHAR,
    schema_len: SQLSMALLINT,
    table: *const SQLWCHAR,
    table_len: SQLSMALLINT,
    column: *const SQLWCHAR,
    column_len: SQLSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let cat = unsafe { conv::wide_arg(catalog, catalog_len) };
    let sch = unsafe { conv::wide_arg(schema, schema_len) };
    let tbl = unsafe { conv::wide_arg(table, table_len) };
    let col = unsafe { conv::wide_arg(column, column_len) };
    catalog::columns(stmt, &cat, &sch, &tbl, &col)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLPrimaryKeys(
    hstmt: SQLHSTMT,
    catalog: *const SQLCHAR,
    catalog_len: SQLSMALLINT,
    schema: *const SQLCHAR,
    schema_len: SQLSMALLINT,
    table: *const SQLCHAR,
    table_len: SQLSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let cat = unsafe { conv::narrow_arg(catalog, catalog_len) };
    let sch = unsafe { conv::narrow_arg(schema, schema_len) };
    let tbl = unsafe { conv::narrow_arg(table, table_len) };
    catalog::primary_keys(stmt, &cat, &sch, &tbl)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLPrimaryKeysW(
    hstmt: SQLHSTMT,
    catalog: *const SQLWCHAR,
    catalog_len: SQLSMALLINT,
    schema: *const SQLWCHAR,
    schema_len: SQLSMALLINT,
    table: *const SQLWCHAR,
    table_len: SQLSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let cat = unsafe { conv::wide_arg(catalog, catalog_len) };
    let sch = unsafe { conv::wide_arg(schema, schema_len) };
    let tbl = unsafe { conv::wide_arg(table, table_len) };
    catalog::primary_keys(stmt, &cat, &sch, &tbl)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLStatistics(
    hstmt: SQLHSTMT,
    catalog: *const SQLCHAR,
    catalog_len: SQLSMALLINT,
    schema: *const SQLCHAR,
    schema_len: SQLSMALLINT,
    table: *const SQLCHAR,
    table_len: SQLSMALLINT,
    unique: SQLUSMALLINT,
    _reserved: SQLUSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let cat = unsafe { conv::narrow_arg(catalog, catalog_len) };
    let sch = unsafe { conv::narrow_arg(schema, schema_len) };
    let tbl = unsafe { conv::narrow_arg(table, table_len) };
    catalog::statistics(stmt, &cat, &sch, &tbl, unique)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLStatisticsW(
    hstmt: SQLHSTMT,
    catalog: *const SQLWCHAR,
    catalog_len: SQLSMALLINT,
    schema: *const SQLWCHAR,
    schema_len: SQLSMALLINT,
    table: *const SQLWCHAR,
    table_len: SQLSMALLINT,
    unique: SQLUSMALLINT,
    _reserved: SQLUSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let cat = unsafe { conv::wide_arg(catalog, catalog_len) };
    let sch = unsafe { conv::wide_arg(schema, schema_len) };
    let tbl = unsafe { conv::wide_arg(table, table_len) };
    catalog::statistics(stmt, &cat, &sch, &tbl, unique)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLSpecialColumns(
    hstmt: SQLHSTMT,
    id_type: SQLUSMALLINT,
    catalog: *const SQLCHAR,
    catalog_len: SQLSMALLINT,
    schema: *const SQLCHAR,
    schema_len: SQLSMALLINT,
    table: *const SQLCHAR,
    table_len: SQLSMALLINT,
    _scope: SQLUSMALLINT,
    _nullable: SQLUSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let cat = unsafe { conv::narrow_arg(catalog, catalog_len) };
    let sch = unsafe { conv::narrow_arg(schema, schema_len) };
    let tbl = unsafe { conv::narrow_arg(table, table_len) };
    catalog::special_columns(stmt, id_type, &cat, &sch, &tbl)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLSpecialColumnsW(
    hstmt: SQLHSTMT,
    id_type: SQLUSMALLINT,
    catalog: *const SQLWCHAR,
    catalog_len: SQLSMALLINT,
    schema: *const SQLWCHAR,
    schema_len: SQLSMALLINT,
    table: *const SQLWCHAR,
    table_len: SQLSMALLINT,
    _scope: SQLUSMALLINT,
    _nullable: SQLUSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let cat = unsafe { conv::wide_arg(catalog, catalog_len) };
    let sch = unsafe { conv::wide_arg(schema, schema_len) };
    let tbl = unsafe { conv::wide_arg(table, table_len) };
    catalog::special_columns(stmt, id_type, &cat, &sch, &tbl)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLForeignKeys(
    hstmt: SQLHSTMT,
    pk_catalog: *const SQLCHAR,
    pk_catalog_len: SQLSMALLINT,
    pk_schema: *const SQLCHAR,
    pk_schema_len: SQLSMALLINT,
    pk_table: *const SQLCHAR,
    pk_table_len: SQLSMALLINT,
    fk_catalog: *const SQLCHAR,
    fk_catalog_len: SQLSMALLINT,
    fk_schema: *const SQLCHAR,
    fk_schema_len: SQLSMALLINT,
    fk_table: *const SQLCHAR,
    fk_table_len: SQLSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let pk_cat = unsafe { conv::narrow_arg(pk_catalog, pk_catalog_len) };
    let pk_sch = unsafe { conv::narrow_arg(pk_schema, pk_schema_len) };
    let pk_tbl = unsafe { conv::narrow_arg(pk_table, pk_table_len) };
    let fk_cat = unsafe { conv::narrow_arg(fk_catalog, fk_catalog_len) };
    let fk_sch = unsafe { conv::narrow_arg(fk_schema, fk_schema_len) };
    let fk_tbl = unsafe { conv::narrow_arg(fk_table, fk_table_len) };
    catalog::foreign_keys(stmt, &pk_cat, &pk_sch, &pk_tbl, &fk_cat, &fk_sch, &fk_tbl)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLForeignKeysW(
    hstmt: SQLHSTMT,
    pk_catalog: *const SQLWCHAR,
    pk_catalog_len: SQLSMALLINT,
    pk_schema: *const SQLWCHAR,
    pk_schema_len: SQLSMALLINT,
    pk_table: *const SQLWCHAR,
    pk_table_len: SQLSMALLINT,
    fk_catalog: *const SQLWCHAR,
    fk_catalog_len: SQLSMALLINT,
    fk_schema: *const SQLWCHAR,
    fk_schema_len: SQLSMALLINT,
    fk_table: *const SQLWCHAR,
    fk_table_len: SQLSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    let pk_cat = unsafe { conv::wide_arg(pk_catalog, pk_catalog_len) };
    let pk_sch = unsafe { conv::wide_arg(pk_schema, pk_schema_len) };
    let pk_tbl = unsafe { conv::wide_arg(pk_table, pk_table_len) };
    let fk_cat = unsafe { conv::wide_arg(fk_catalog, fk_catalog_len) };
    let fk_sch = unsafe { conv::wide_arg(fk_schema, fk_schema_len) };
    let fk_tbl = unsafe { conv::wide_arg(fk_table, fk_table_len) };
    catalog::foreign_keys(stmt, &pk_cat, &pk_sch, &pk_tbl, &fk_cat, &fk_sch, &fk_tbl)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLProcedures(
    hstmt: SQLHSTMT,
    _catalog: *const SQLCHAR,
    _catalog_len: SQLSMALLINT,
    _schema: *const SQLCHAR,
    _schema_len: SQLSMALLINT,
    _proc: *const SQLCHAR,
    _proc_len: SQLSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    catalog::procedures(stmt)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLProceduresW(
    hstmt: SQLHSTMT,
    _catalog: *const SQLWCHAR,
    _catalog_len: SQLSMALLINT,
    _schema: *const SQLWCHAR,
    _schema_len: SQLSMALLINT,
    _proc: *const SQLWCHAR,
    _proc_len: SQLSMALLINT,
) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    catalog::procedures(stmt)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetTypeInfo(hstmt: SQLHSTMT, data_type: SQLSMALLINT) -> SQLRETURN {
    let Some(stmt) = stmt_mut(hstmt) else {
        return SQL_INVALID_HANDLE;
    };
    catalog::type_info(stmt, data_type)
}

#[unsafe(no_mangle)]
pub extern "C" fn SQLGetTypeInfoW(hstmt: SQLHSTMT, data_type: SQLSMALLINT) -> SQLRETURN {
    SQLGetTypeInfo(hstmt, data_type)
}
