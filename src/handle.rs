//! The handle layer: Environment → Connection → Statement with explicit
//! parent/child tracking, cascading free and a registry that validates
//! every pointer arriving over the ABI.
//!
//! Applications keep raw pointers; the registry is what lets the driver
//! answer `SQL_INVALID_HANDLE` for a stale or double-freed handle instead
//! of dereferencing garbage. Parents own their children through the child
//! lists; the back-pointers exist only for diagnostics routing and
//! transaction state, never for ownership.

use crate::diag::{DiagRecord, DriverError};
use crate::params::{BoundParam, DaeExchange};
use crate::rowset::ColumnDesc;
use crate::types::*;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};
use tracing::{Level, event};

pub type TdsClient = tabby::Client<tokio_util::compat::Compat<tokio::net::TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Env,
    Dbc,
    Stmt,
}

static LIVE_HANDLES: LazyLock<Mutex<HashMap<usize, HandleKind>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn register(ptr: usize, kind: HandleKind) {
    LIVE_HANDLES.lock().unwrap().insert(ptr, kind);
}

fn unregister(ptr: usize) {
    LIVE_HANDLES.lock().unwrap().remove(&ptr);
}

fn is_live(ptr: SQLHANDLE, kind: HandleKind) -> bool {
    !ptr.is_null() && LIVE_HANDLES.lock().unwrap().get(&(ptr as usize)) == Some(&kind)
}

/// Process-level ODBC state: the declared API version and the set of
/// connections allocated under this environment.
pub struct Environment {
    pub odbc_version: SQLINTEGER,
    pub connections: Vec<*mut Connection>,
}

/// One logical session to one server.
pub struct Connection {
    pub env: *mut Environment,
    pub client: Option<TdsClient>,
    pub server: String,
    pub database: String,
    pub uid: String,
    pub connected: bool,
    pub autocommit: bool,
    pub in_transaction: bool,
    pub diagnostics: Vec<DiagRecord>,
    pub statements: Vec<*mut Statement>,
}

/// Execution progress of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmtState {
    Idle,
    Prepared,
    NeedData,
    Executed,
    Fetching,
}

/// One executable context: prepared text, bound parameters, the
/// materialized result and the cursor over it.
pub struct Statement {
    pub conn: *mut Connection,
    pub state: StmtState,
    pub columns: Vec<ColumnDesc>,
    pub rows: Vec<Vec<Option<String>>>,
    pub row_index: isize,
    pub row_count: SQLLEN,
    pub prepared_sql: Option<String>,
    pub param_count: usize,
    pub params: Vec<BoundParam>,
    pub dae: Option<DaeExchange>,
    pub diagnostics: Vec<DiagRecord>,
}

impl Statement {
    /// Drop the materialized result and leave execution state
    /// (SQL_CLOSE semantics). Prepared text and bindings survive.
    pub fn close_cursor(&mut self) {
        self.columns.clear();
        self.rows.clear();
        self.row_index = -1;
        self.row_count = -1;
        self.dae = None;
        self.state = if self.prepared_sql.is_some() {
            StmtState::Prepared
        } else {
            StmtState::Idle
        };
    }

    /// Record a failure on this statement and produce the matching return
    /// code.
    pub fn fail(&mut self, err: DriverError) -> SQLRETURN {
        self.diagnostics.push(err.into_record());
        SQL_ERROR
    }

    pub fn warn(&mut self, state: &'static str, message: impl Into<String>) {
        self.diagnostics.push(DiagRecord::new(state, 0, message));
    }
}

impl Connection {
    pub fn fail(&mut self, err: DriverError) -> SQLRETURN {
        self.diagnostics.push(err.into_record());
        SQL_ERROR
    }
}

// ── Validated access ────────────────────────────────────────────────

pub fn env_mut<'a>(h: SQLHANDLE) -> Option<&'a mut Environment> {
    is_live(h, HandleKind::Env).then(|| unsafe { &mut *(h as *mut Environment) })
}

pub fn conn_mut<'a>(h: SQLHANDLE) -> Option<&'a mut Connection> {
    is_live(h, HandleKind::Dbc).then(|| unsafe { &mut *(h as *mut Connection) })
}

pub fn stmt_mut<'a>(h: SQLHANDLE) -> Option<&'a mut Statement> {
    is_live(h, HandleKind::Stmt).then(|| unsafe { &mut *(h as *mut Statement) })
}

// ── Allocation ──────────────────────────────────────────────────────

pub fn alloc_env(output: *mut SQLHANDLE) -> SQLRETURN {
    if output.is_null() {
        return SQL_ERROR;
    }
    let env = Box::into_raw(Box::new(Environment {
        odbc_version: SQL_OV_ODBC3,
        connections: Vec::new(),
    }));
    register(env as usize, HandleKind::Env);
    unsafe { *output = env as SQLHANDLE };
    SQL_SUCCESS
}

pub fn alloc_connection(parent: SQLHANDLE, output: *mut SQLHANDLE) -> SQLRETURN {
    if output.is_null() {
        return SQL_ERROR;
    }
    let Some(env) = env_mut(parent) else {
        return SQL_INVALID_HANDLE;
    };
    let conn = Box::into_raw(Box::new(Connection {
        env: parent as *mut Environment,
        client: None,
        server: String::new(),
        database: String::new(),
        uid: String::new(),
        connected: false,
        autocommit: true,
        in_transaction: false,
        diagnostics: Vec::new(),
        statements: Vec::new(),
    }));
    env.connections.push(conn);
    register(conn as usize, HandleKind::Dbc);
    unsafe { *output = conn as SQLHANDLE };
    SQL_SUCCESS
}

pub fn alloc_statement(parent: SQLHANDLE, output: *mut SQLHANDLE) -> SQLRETURN {
    if output.is_null() {
        return SQL_ERROR;
    }
    let Some(conn) = conn_mut(parent) else {
        return SQL_INVALID_HANDLE;
    };
    let stmt = Box::into_raw(Box::new(Statement {
        conn: parent as *mut Connection,
        state: StmtState::Idle,
        columns: Vec::new(),
        rows: Vec::new(),
        row_index: -1,
        row_count: -1,
        prepared_sql: None,
        param_count: 0,
        params: Vec::new(),
        dae: None,
        diagnostics: Vec::new(),
    }));
    conn.statements.push(stmt);
    register(stmt as usize, HandleKind::Stmt);
    unsafe { *output = stmt as SQLHANDLE };
    SQL_SUCCESS
}

// ── Free, cascading ─────────────────────────────────────────────────

pub fn free_env(h: SQLHANDLE) -> SQLRETURN {
    if !is_live(h, HandleKind::Env) {
        return SQL_INVALID_HANDLE;
    }
    let env = unsafe { Box::from_raw(h as *mut Environment) };
    unregister(h as usize);
    event!(
        Level::DEBUG,
        connections = env.connections.len(),
        "freeing environment"
    );
    for conn in &env.connections {
        free_connection_contents(*conn);
    }
    SQL_SUCCESS
}

pub fn free_connection(h: SQLHANDLE) -> SQLRETURN {
    if !is_live(h, HandleKind::Dbc) {
        return SQL_INVALID_HANDLE;
    }
    // Detach from the parent's child list before dropping.
    let env = unsafe { (*(h as *mut Connection)).env };
    if !env.is_null() {
        unsafe { (*env).connections.retain(|&p| p as SQLHANDLE != h) };
    }
    free_connection_contents(h as *mut Connection);
    SQL_SUCCESS
}

fn free_connection_contents(conn: *mut Connection) {
    unregister(conn as usize);
    let conn = unsafe { Box::from_raw(conn) };
    for stmt in &conn.statements {
        free_statement_contents(*stmt);
    }
}

pub fn free_statement(h: SQLHANDLE) -> SQLRETURN {
    if !is_live(h, HandleKind::Stmt) {
        return SQL_INVALID_HANDLE;
    }
    let conn = unsafe { (*(h as *mut Statement)).conn };
    if !conn.is_null() {
        unsafe { (*conn).statements.retain(|&p| p as SQLHANDLE != h) };
    }
    free_statement_contents(h as *mut Statement);
    SQL_SUCCESS
}

fn free_statement_contents(stmt: *mut Statement) {
    unregister(stmt as usize);
    drop(unsafe { Box::from_raw(stmt) });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    fn alloc_all() -> (SQLHANDLE, SQLHANDLE, SQLHANDLE) {
        let mut env: SQLHANDLE = ptr::null_mut();
        let mut dbc: SQLHANDLE = ptr::null_mut();
        let mut stmt: SQLHANDLE = ptr::null_mut();
        assert_eq!(SQL_SUCCESS, alloc_env(&mut env));
        assert_eq!(SQL_SUCCESS, alloc_connection(env, &mut dbc));
        assert_eq!(SQL_SUCCESS, alloc_statement(dbc, &mut stmt));
        (env, dbc, stmt)
    }

    // The whole lifecycle lives in one sequential test: a freed handle's
    // address may be recycled by a concurrent allocation, which would make
    // staleness checks race if the cases ran in separate test threads.
    #[test]
    fn free_cascades_detaches_and_rejects_reuse() {
        let mut out: SQLHANDLE = ptr::null_mut();
        assert_eq!(SQL_INVALID_HANDLE, alloc_connection(ptr::null_mut(), &mut out));
        assert_eq!(SQL_INVALID_HANDLE, alloc_statement(ptr::null_mut(), &mut out));

        let (env, dbc, stmt) = alloc_all();
        // A live handle of one kind is not a handle of another.
        assert!(conn_mut(env).is_none());
        assert!(stmt_mut(dbc).is_none());
        assert!(env_mut(stmt).is_none());
        assert_eq!(SQL_SUCCESS, free_statement(stmt));
        assert_eq!(SQL_INVALID_HANDLE, free_statement(stmt));
        let conn = conn_mut(dbc).unwrap();
        assert!(conn.statements.is_empty());

        let mut stmt2: SQLHANDLE = ptr::null_mut();
        assert_eq!(SQL_SUCCESS, alloc_statement(dbc, &mut stmt2));
        assert_eq!(SQL_SUCCESS, free_env(env));
        // The whole tree is gone, children included.
        assert!(env_mut(env).is_none());
        assert!(conn_mut(dbc).is_none());
        assert!(stmt_mut(stmt2).is_none());
        assert_eq!(SQL_INVALID_HANDLE, free_connection(dbc));
        assert_eq!(SQL_INVALID_HANDLE, free_env(env));
    }
}
