//! Statement execution: the bridge call into the TDS client, direct
//! execution, prepare/execute with textual parameter substitution, and the
//! data-at-execution exchange.

use crate::diag::{DiagRecord, DriverError};
use crate::handle::{Connection, Statement, StmtState};
use crate::params;
use crate::rowset::{RowSet, RowSetWriter};
use crate::runtime;
use crate::types::*;
use tracing::{Level, event};

/// Run one SQL batch on the connection's TDS client and materialize the
/// first result set.
pub fn run_batch(conn: &mut Connection, sql: &str) -> Result<RowSet, DriverError> {
    let client = conn.client.as_mut().ok_or(DriverError::NotConnected)?;
    event!(Level::DEBUG, sql_len = sql.len(), "dispatching batch");
    let mut writer = RowSetWriter::new();
    runtime::block_on(client.batch_into(sql, &mut writer))?;
    Ok(writer.into_row_set())
}

/// Open a transaction if autocommit is off and none is active yet. The
/// next COMMIT (explicit or from re-enabling autocommit) closes it.
fn begin_transaction_if_needed(conn: &mut Connection) -> Result<(), DriverError> {
    if conn.autocommit || conn.in_transaction {
        return Ok(());
    }
    run_batch(conn, "BEGIN TRANSACTION")?;
    conn.in_transaction = true;
    Ok(())
}

/// Execute `sql` on the statement's connection and install the result.
pub fn exec_direct(stmt: &mut Statement, sql: &str) -> SQLRETURN {
    stmt.diagnostics.clear();
    run_on_statement(stmt, sql)
}

fn run_on_statement(stmt: &mut Statement, sql: &str) -> SQLRETURN {
    let conn = unsafe { &mut *stmt.conn };

    if let Err(e) = begin_transaction_if_needed(conn) {
        return stmt.fail(e);
    }

    match run_batch(conn, sql) {
        Ok(rs) => {
            stmt.row_count = if rs.columns.is_empty() {
                rs.rows_affected as SQLLEN
            } else {
                -1
            };
            stmt.columns = rs.columns;
            stmt.rows = rs.rows;
            stmt.row_index = -1;
            stmt.state = StmtState::Executed;
            for (number, message) in rs.notices {
                stmt.diagnostics.push(DiagRecord::server_notice(number, &message));
            }
            SQL_SUCCESS
        }
        Err(e) => stmt.fail(e),
    }
}

/// Store the statement text and count its placeholders.
pub fn prepare(stmt: &mut Statement, sql: &str) -> SQLRETURN {
    stmt.diagnostics.clear();
    stmt.close_cursor();
    stmt.param_count = params::placeholder_count(sql);
    stmt.prepared_sql = Some(sql.to_string());
    stmt.state = StmtState::Prepared;
    SQL_SUCCESS
}

/// Execute the prepared statement. Deferred (data-at-execution)
/// parameters switch the statement into the `SQL_NEED_DATA` exchange
/// instead of running anything.
pub fn execute_prepared(stmt: &mut Statement) -> SQLRETURN {
    stmt.diagnostics.clear();

    if stmt.state == StmtState::NeedData {
        return stmt.fail(DriverError::Sequence(
            "SQLExecute called while data-at-execution is in progress",
        ));
    }
    let Some(sql) = stmt.prepared_sql.clone() else {
        return stmt.fail(DriverError::Sequence("statement is not prepared"));
    };

    let mut deferred: Vec<u16> = stmt
        .params
        .iter()
        .filter(|p| p.wants_data_at_exec())
        .map(|p| p.number)
        .collect();
    deferred.sort_unstable();

    if !deferred.is_empty() {
        stmt.dae = Some(params::DaeExchange::new(sql, deferred));
        stmt.state = StmtState::NeedData;
        return SQL_NEED_DATA;
    }

    let final_sql = substituted_sql(stmt, &sql);
    run_on_statement(stmt, &final_sql)
}

/// Replace every placeholder with its literal form. Deferred parameters
/// take their collected bytes; unbound positions become NULL.
fn substituted_sql(stmt: &Statement, sql: &str) -> String {
    let (out, _) = params::rewrite_placeholders(sql, |number| {
        let Some(param) = stmt.params.iter().find(|p| p.number == number) else {
            return Some("NULL".to_string());
        };
        if let Some(bytes) = stmt.dae.as_ref().and_then(|d| d.collected(number)) {
            return Some(params::render_collected(param, bytes));
        }
        Some(unsafe { params::render_literal(param) })
    });
    out
}

/// `SQLParamData`: hand out the next deferred parameter's token, or, once
/// every parameter has been fed, substitute and run the statement.
pub fn param_data(stmt: &mut Statement, token_out: *mut SQLPOINTER) -> SQLRETURN {
    stmt.diagnostics.clear();
    if stmt.state != StmtState::NeedData {
        return stmt.fail(DriverError::Sequence(
            "SQLParamData outside a data-at-execution exchange",
        ));
    }
    let Some(dae) = stmt.dae.as_mut() else {
        return stmt.fail(DriverError::Sequence(
            "SQLParamData outside a data-at-execution exchange",
        ));
    };

    if dae.delivered {
        dae.current += 1;
    } else {
        dae.delivered = true;
    }

    if dae.current < dae.pending.len() {
        let number = dae.pending[dae.current];
        if let Some(param) = stmt.params.iter().find(|p| p.number == number) {
            if !token_out.is_null() {
                unsafe { *token_out = param.app_token() };
            }
        }
        return SQL_NEED_DATA;
    }

    // Every deferred value is in; build the final text and execute.
    let sql = dae.sql.clone();
    let final_sql = substituted_sql(stmt, &sql);
    stmt.dae = None;
    let rc = run_on_statement(stmt, &final_sql);
    if rc == SQL_ERROR {
        stmt.state = StmtState::Prepared;
    }
    rc
}

/// `SQLPutData`: append bytes to the deferred parameter whose token was
/// last returned. A zero-length append is preserved as the empty value.
pub fn put_data(stmt: &mut Statement, data: SQLPOINTER, length: SQLLEN) -> SQLRETURN {
    stmt.diagnostics.clear();
    if stmt.state != StmtState::NeedData {
        return stmt.fail(DriverError::Sequence(
            "SQLPutData outside a data-at-execution exchange",
        ));
    }
    let c_type = stmt
        .dae
        .as_ref()
        .filter(|d| d.delivered && d.current < d.pending.len())
        .and_then(|d| {
            let number = d.pending[d.current];
            stmt.params.iter().find(|p| p.number == number)
        })
        .map(|p| p.c_type);
    let Some(c_type) = c_type else {
        return stmt.fail(DriverError::Sequence(
            "SQLPutData before SQLParamData returned a token",
        ));
    };

    let byte_len = if length >= 0 {
        length as usize
    } else if length == SQL_NTS {
        unsafe { terminated_length(data, c_type) }
    } else {
        return stmt.fail(DriverError::General(format!(
            "invalid SQLPutData length {}",
            length
        )));
    };

    if byte_len > 0 {
        if data.is_null() {
            return stmt.fail(DriverError::General(
                "SQLPutData with null data pointer".to_string(),
            ));
        }
        let bytes = unsafe { std::slice::from_raw_parts(data as *const u8, byte_len) };
        if let Some(dae) = stmt.dae.as_mut() {
            dae.buffers[dae.current].extend_from_slice(bytes);
        }
    }
    SQL_SUCCESS
}

/// Byte length of a null-terminated value fed to `SQLPutData`.
unsafe fn terminated_length(data: SQLPOINTER, c_type: SQLSMALLINT) -> usize {
    if data.is_null() {
        return 0;
    }
    if c_type == SQL_C_WCHAR {
        let ptr = data as *const u16;
        let mut n = 0usize;
        unsafe {
            while *ptr.add(n) != 0 {
                n += 1;
            }
        }
        n * 2
    } else {
        let ptr = data as *const u8;
        let mut n = 0usize;
        unsafe {
            while *ptr.add(n) != 0 {
                n += 1;
            }
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle;
    use std::ptr;

    fn fresh_statement() -> (SQLHANDLE, SQLHANDLE, &'static mut Statement) {
        let mut env: SQLHANDLE = ptr::null_mut();
        let mut dbc: SQLHANDLE = ptr::null_mut();
        let mut stmt: SQLHANDLE = ptr::null_mut();
        handle::alloc_env(&mut env);
        handle::alloc_connection(env, &mut dbc);
        handle::alloc_statement(dbc, &mut stmt);
        let s = handle::stmt_mut(stmt).unwrap();
        (env, stmt, s)
    }

    #[test]
    fn prepare_counts_placeholders_outside_literals() {
        let (env, _, stmt) = fresh_statement();
        prepare(stmt, "INSERT INTO t VALUES (?, '?', ?)");
        assert_eq!(2, stmt.param_count);
        assert_eq!(StmtState::Prepared, stmt.state);
        handle::free_env(env);
    }

    #[test]
    fn execute_without_prepare_is_a_sequence_error() {
        let (env, _, stmt) = fresh_statement();
        assert_eq!(SQL_ERROR, execute_prepared(stmt));
        assert_eq!("HY010", stmt.diagnostics[0].state);
        handle::free_env(env);
    }

    #[test]
    fn deferred_parameters_switch_into_need_data() {
        let (env, _, stmt) = fresh_statement();
        prepare(stmt, "INSERT INTO t VALUES (?)");
        let mut ind = SQL_DATA_AT_EXEC;
        stmt.params.push(crate::params::BoundParam {
            number: 1,
            c_type: SQL_C_WCHAR,
            sql_type: SQL_WVARCHAR,
            column_size: 100,
            decimal_digits: 0,
            value_ptr: 7usize as SQLPOINTER,
            buffer_length: 0,
            indicator: &mut ind,
        });

        assert_eq!(SQL_NEED_DATA, execute_prepared(stmt));
        assert_eq!(StmtState::NeedData, stmt.state);

        // First SQLParamData yields the application token.
        let mut token: SQLPOINTER = ptr::null_mut();
        assert_eq!(SQL_NEED_DATA, param_data(stmt, &mut token));
        assert_eq!(7usize as SQLPOINTER, token);

        // Zero-length put keeps the empty value.
        assert_eq!(SQL_SUCCESS, put_data(stmt, ptr::null_mut(), 0));
        assert_eq!(Some(&[][..]), stmt.dae.as_ref().unwrap().collected(1));

        // Finalizing executes, which fails here: nothing is connected.
        assert_eq!(SQL_ERROR, param_data(stmt, &mut token));
        assert_eq!("08003", stmt.diagnostics[0].state);
        assert_eq!(StmtState::Prepared, stmt.state);
        handle::free_env(env);
    }

    #[test]
    fn put_data_before_a_token_is_a_sequence_error() {
        let (env, _, stmt) = fresh_statement();
        assert_eq!(SQL_ERROR, put_data(stmt, ptr::null_mut(), 0));
        assert_eq!("HY010", stmt.diagnostics[0].state);
        handle::free_env(env);
    }

    #[test]
    fn exec_direct_without_a_session_reports_not_connected() {
        let (env, _, stmt) = fresh_statement();
        assert_eq!(SQL_ERROR, exec_direct(stmt, "SELECT 1"));
        assert_eq!("08003", stmt.diagnostics[0].state);
        handle::free_env(env);
    }

    #[test]
    fn substitution_reads_bound_values_and_collected_bytes() {
        let (env, _, stmt) = fresh_statement();
        prepare(stmt, "INSERT INTO t VALUES (?, ?)");

        let mut id = 5i32;
        stmt.params.push(crate::params::BoundParam {
            number: 1,
            c_type: SQL_C_SLONG,
            sql_type: SQL_INTEGER,
            column_size: 0,
            decimal_digits: 0,
            value_ptr: &mut id as *mut i32 as SQLPOINTER,
            buffer_length: 0,
            indicator: ptr::null_mut(),
        });
        stmt.params.push(crate::params::BoundParam {
            number: 2,
            c_type: SQL_C_WCHAR,
            sql_type: SQL_WVARCHAR,
            column_size: 0,
            decimal_digits: 0,
            value_ptr: ptr::null_mut(),
            buffer_length: 0,
            indicator: ptr::null_mut(),
        });
        let mut dae = crate::params::DaeExchange::new(String::new(), vec![2]);
        dae.buffers[0] = "x'y".encode_utf16().flat_map(u16::to_ne_bytes).collect();
        stmt.dae = Some(dae);

        let out = substituted_sql(stmt, "INSERT INTO t VALUES (?, ?)");
        assert_eq!("INSERT INTO t VALUES (5, N'x''y')", out);
        handle::free_env(env);
    }
}
