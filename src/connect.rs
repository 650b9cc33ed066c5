//! Connection establishment and session state: connection-string and DSN
//! parsing, TDS client construction, autocommit policy and transaction
//! completion.

use crate::diag::DriverError;
use crate::execute::run_batch;
use crate::handle::Connection;
use crate::runtime;
use crate::types::*;
use tabby::{AuthMethod, Config, EncryptionLevel};
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::{Level, event};

/// Everything a session needs, parsed out of a connection string or a DSN
/// section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub uid: String,
    pub pwd: String,
    pub trust_cert: bool,
}

impl Default for ConnectParams {
    fn default() -> Self {
        ConnectParams {
            host: "localhost".to_string(),
            port: 1433,
            database: "master".to_string(),
            uid: String::new(),
            pwd: String::new(),
            trust_cert: false,
        }
    }
}

impl ConnectParams {
    /// The canonical `Key=Value;` form written back to the application on
    /// a successful `SQLDriverConnect`.
    pub fn canonical(&self) -> String {
        format!(
            "Server={},{};Database={};UID={};PWD={};TrustServerCertificate={}",
            self.host,
            self.port,
            self.database,
            self.uid,
            self.pwd,
            if self.trust_cert { "yes" } else { "no" }
        )
    }
}

/// Parse a `Key=Value;` connection string. Keys are trimmed and
/// case-insensitive; unknown keys are ignored.
pub fn parse_connection_string(conn_str: &str) -> ConnectParams {
    let mut params = ConnectParams::default();

    for part in conn_str.split(';') {
        let part = part.trim();
        let Some(idx) = part.find('=') else { continue };
        let key = part[..idx].trim().to_lowercase();
        let val = part[idx + 1..].trim();
        match key.as_str() {
            "server" => {
                if let Some(comma) = val.find(',') {
                    params.host = val[..comma].trim().to_string();
                    if let Ok(p) = val[comma + 1..].trim().parse() {
                        params.port = p;
                    }
                } else {
                    params.host = val.to_string();
                }
            }
            "database" | "initial catalog" => params.database = val.to_string(),
            "uid" | "user id" => params.uid = val.to_string(),
            "pwd" | "password" => params.pwd = val.to_string(),
            "trustservercertificate" => {
                params.trust_cert = val.eq_ignore_ascii_case("yes")
                    || val.eq_ignore_ascii_case("true")
                    || val == "1";
            }
            _ => {}
        }
    }
    params
}

/// Extract the body of `[section]` from odbc.ini-style content as a
/// connection string.
fn ini_section(content: &str, section: &str) -> Option<String> {
    let mut in_section = false;
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') && line.ends_with(']') {
            if in_section {
                break;
            }
            in_section = line[1..line.len() - 1].eq_ignore_ascii_case(section);
        } else if in_section && !line.is_empty() && !line.starts_with(['#', ';']) {
            if let Some(idx) = line.find('=') {
                let key = line[..idx].trim();
                if key.eq_ignore_ascii_case("driver") || key.eq_ignore_ascii_case("description") {
                    continue;
                }
                pairs.push(format!("{}={}", key, line[idx + 1..].trim()));
            }
        }
    }
    if pairs.is_empty() && !in_section {
        None
    } else {
        Some(pairs.join(";"))
    }
}

/// Resolve a DSN name through `$HOME/.odbc.ini` then `/etc/odbc.ini`;
/// the first file containing the section wins.
pub fn resolve_dsn(dsn: &str) -> ConnectParams {
    let home = std::env::var("HOME").unwrap_or_default();
    for path in [format!("{}/.odbc.ini", home), "/etc/odbc.ini".to_string()] {
        if let Ok(content) = std::fs::read_to_string(&path) {
            if let Some(section) = ini_section(&content, dsn) {
                event!(Level::DEBUG, dsn, path = %path, "resolved DSN");
                return parse_connection_string(&section);
            }
        }
    }
    ConnectParams::default()
}

/// Establish the TDS session described by `params`.
pub fn open(conn: &mut Connection, params: &ConnectParams) -> SQLRETURN {
    conn.diagnostics.clear();
    if conn.connected {
        return conn.fail(DriverError::AlreadyConnected);
    }
    conn.server = format!("{}:{}", params.host, params.port);
    conn.database = params.database.clone();
    conn.uid = params.uid.clone();

    let result = runtime::block_on(async {
        let mut config = Config::new();
        config.host(&params.host);
        config.port(params.port);
        config.database(&params.database);
        config.authentication(AuthMethod::sql_server(&params.uid, &params.pwd));
        if params.trust_cert {
            config.trust_cert();
        }
        config.encryption(EncryptionLevel::Required);

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| tabby::error::Error::Io {
                kind: e.kind(),
                message: e.to_string(),
            })?;
        tcp.set_nodelay(true).map_err(|e| tabby::error::Error::Io {
            kind: e.kind(),
            message: e.to_string(),
        })?;

        tabby::Client::connect(config, tcp.compat_write()).await
    });

    match result {
        Ok(client) => {
            event!(Level::DEBUG, server = %conn.server, database = %conn.database, "session established");
            conn.client = Some(client);
            conn.connected = true;
            SQL_SUCCESS
        }
        Err(e) => {
            event!(Level::WARN, server = %conn.server, error = %e, "connect failed");
            conn.fail(DriverError::Connect(e))
        }
    }
}

/// Drop the TDS session. Allocated statements survive but any operation
/// on them reports `08003` until the connection is reopened.
pub fn disconnect(conn: &mut Connection) -> SQLRETURN {
    if let Some(client) = conn.client.take() {
        let _ = runtime::block_on(client.close());
    }
    conn.connected = false;
    conn.in_transaction = false;
    SQL_SUCCESS
}

/// Autocommit transitions. Turning it OFF sends nothing (the next
/// execution opens the transaction); turning it back ON commits any open
/// transaction first.
pub fn set_autocommit(conn: &mut Connection, enable: bool) -> SQLRETURN {
    if conn.autocommit == enable {
        return SQL_SUCCESS;
    }
    if enable && conn.in_transaction {
        match run_batch(conn, "COMMIT") {
            Ok(_) => conn.in_transaction = false,
            Err(e) => return conn.fail(e),
        }
    }
    conn.autocommit = enable;
    SQL_SUCCESS
}

/// `SQLEndTran` on one connection: COMMIT or ROLLBACK the open
/// transaction. Nothing to do when no transaction is active.
pub fn end_tran(conn: &mut Connection, completion: SQLSMALLINT) -> SQLRETURN {
    conn.diagnostics.clear();
    if !conn.in_transaction {
        return SQL_SUCCESS;
    }
    let sql = if completion == SQL_COMMIT {
        "COMMIT"
    } else {
        "ROLLBACK"
    };
    let result = run_batch(conn, sql);
    conn.in_transaction = false;
    match result {
        Ok(_) => SQL_SUCCESS,
        Err(e) => conn.fail(e),
    }
}
