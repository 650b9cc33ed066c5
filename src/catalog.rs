//! Catalog functions: metadata requests become SQL against the server's
//! system views, executed through the normal statement path so the result
//! is an ordinary fetchable result set with the ODBC column layout.
//!
//! Empty pattern arguments match everything. Identifier patterns are
//! embedded as quoted literals with their quotes doubled.

use crate::execute;
use crate::handle::{Statement, StmtState};
use crate::types::*;

fn escaped(pattern: &str) -> String {
    pattern.replace('\'', "''")
}

fn like_filter(conditions: &mut Vec<String>, column: &str, pattern: &str) {
    if !pattern.is_empty() && pattern != "%" {
        conditions.push(format!("{} LIKE N'{}'", column, escaped(pattern)));
    }
}

fn exact_filter(conditions: &mut Vec<String>, column: &str, name: &str) {
    if !name.is_empty() {
        conditions.push(format!("{} = N'{}'", column, escaped(name)));
    }
}

fn where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {} ", conditions.join(" AND "))
    }
}

/// ODBC type codes from the server's type-name spelling, shared by every
/// catalog result that carries a DATA_TYPE column.
const DATA_TYPE_CASE: &str = "CASE tp.name \
     WHEN 'int' THEN 4 WHEN 'smallint' THEN 5 WHEN 'tinyint' THEN -6 \
     WHEN 'bigint' THEN -5 WHEN 'float' THEN 8 WHEN 'real' THEN 7 \
     WHEN 'bit' THEN -7 WHEN 'datetime' THEN 93 WHEN 'smalldatetime' THEN 93 \
     WHEN 'datetime2' THEN 93 WHEN 'datetimeoffset' THEN 93 \
     WHEN 'date' THEN 91 WHEN 'time' THEN 92 \
     WHEN 'varchar' THEN 12 WHEN 'nvarchar' THEN -9 \
     WHEN 'char' THEN 1 WHEN 'nchar' THEN -8 \
     WHEN 'text' THEN -1 WHEN 'ntext' THEN -10 \
     WHEN 'binary' THEN -2 WHEN 'varbinary' THEN -3 WHEN 'image' THEN -4 \
     WHEN 'decimal' THEN 3 WHEN 'numeric' THEN 2 \
     WHEN 'money' THEN 3 WHEN 'smallmoney' THEN 3 \
     WHEN 'uniqueidentifier' THEN -11 \
     WHEN 'timestamp' THEN -2 WHEN 'rowversion' THEN -2 \
     WHEN 'xml' THEN -10 \
     ELSE 12 END";

/// `SQLTables`.
pub fn tables(
    stmt: &mut Statement,
    _catalog: &str,
    schema: &str,
    table: &str,
    table_type: &str,
) -> SQLRETURN {
    let mut conditions = Vec::new();
    like_filter(&mut conditions, "o.name", table);
    like_filter(&mut conditions, "s.name", schema);

    if !table_type.is_empty() && table_type != "%" {
        let mut parts = Vec::new();
        for t in table_type.split(',') {
            match t.trim().trim_matches('\'') {
                "TABLE" => parts.push("o.type = 'U'"),
                "VIEW" => parts.push("o.type = 'V'"),
                "SYSTEM TABLE" => parts.push("o.type = 'S'"),
                _ => {}
            }
        }
        if !parts.is_empty() {
            conditions.push(format!("({})", parts.join(" OR ")));
        }
    }

    let sql = format!(
        "SELECT DB_NAME() AS TABLE_CAT, s.name AS TABLE_SCHEM, o.name AS TABLE_NAME, \
         CASE o.type WHEN 'U' THEN 'TABLE' WHEN 'V' THEN 'VIEW' WHEN 'S' THEN 'SYSTEM TABLE' ELSE 'TABLE' END AS TABLE_TYPE, \
         CAST(NULL AS NVARCHAR(1)) AS REMARKS \
         FROM sys.objects o JOIN sys.schemas s ON o.schema_id = s.schema_id \
         {}ORDER BY TABLE_TYPE, TABLE_SCHEM, TABLE_NAME",
        where_clause(&conditions)
    );
    execute::exec_direct(stmt, &sql)
}

/// `SQLColumns`. DATA_TYPE carries ODBC type codes.
pub fn columns(
    stmt: &mut Statement,
    _catalog: &str,
    schema: &str,
    table: &str,
    column: &str,
) -> SQLRETURN {
    let mut conditions = Vec::new();
    like_filter(&mut conditions, "o.name", table);
    like_filter(&mut conditions, "s.name", schema);
    like_filter(&mut conditions, "c.name", column);

    let sql = format!(
        "SELECT DB_NAME() AS TABLE_CAT, s.name AS TABLE_SCHEM, o.name AS TABLE_NAME, \
         c.name AS COLUMN_NAME, \
         CAST({data_type} AS SMALLINT) AS DATA_TYPE, \
         tp.name AS TYPE_NAME, \
         COALESCE(c.max_length, 0) AS COLUMN_SIZE, \
         COALESCE(c.max_length, 0) AS BUFFER_LENGTH, \
         CAST(c.scale AS SMALLINT) AS DECIMAL_DIGITS, \
         CAST(10 AS SMALLINT) AS NUM_PREC_RADIX, \
         CAST(CASE c.is_nullable WHEN 1 THEN 1 ELSE 0 END AS SMALLINT) AS NULLABLE, \
         CAST(NULL AS NVARCHAR(1)) AS REMARKS, \
         CAST(NULL AS NVARCHAR(1)) AS COLUMN_DEF, \
         CAST({data_type} AS SMALLINT) AS SQL_DATA_TYPE, \
         CAST(NULL AS SMALLINT) AS SQL_DATETIME_SUB, \
         COALESCE(c.max_length, 0) AS CHAR_OCTET_LENGTH, \
         c.column_id AS ORDINAL_POSITION, \
         CASE c.is_nullable WHEN 1 THEN 'YES' ELSE 'NO' END AS IS_NULLABLE \
         FROM sys.all_columns c \
         JOIN sys.all_objects o ON c.object_id = o.object_id \
         JOIN sys.schemas s ON o.schema_id = s.schema_id \
         JOIN sys.types tp ON c.system_type_id = tp.system_type_id AND tp.system_type_id = tp.user_type_id \
         {where_clause}ORDER BY TABLE_SCHEM, TABLE_NAME, ORDINAL_POSITION",
        data_type = DATA_TYPE_CASE,
        where_clause = where_clause(&conditions)
    );
    execute::exec_direct(stmt, &sql)
}

/// `SQLPrimaryKeys`.
pub fn primary_keys(stmt: &mut Statement, _catalog: &str, schema: &str, table: &str) -> SQLRETURN {
    let mut conditions = vec!["i.is_primary_key = 1".to_string()];
    exact_filter(&mut conditions, "t.name", table);
    exact_filter(&mut conditions, "s.name", schema);

    let sql = format!(
        "SELECT DB_NAME() AS TABLE_CAT, s.name AS TABLE_SCHEM, t.name AS TABLE_NAME, \
         c.name AS COLUMN_NAME, ic.key_ordinal AS KEY_SEQ, i.name AS PK_NAME \
         FROM sys.indexes i \
         JOIN sys.index_columns ic ON i.object_id = ic.object_id AND i.index_id = ic.index_id \
         JOIN sys.columns c ON ic.object_id = c.object_id AND ic.column_id = c.column_id \
         JOIN sys.tables t ON i.object_id = t.object_id \
         JOIN sys.schemas s ON t.schema_id = s.schema_id \
         {}ORDER BY TABLE_SCHEM, TABLE_NAME, KEY_SEQ",
        where_clause(&conditions)
    );
    execute::exec_direct(stmt, &sql)
}

/// `SQLStatistics`.
pub fn statistics(
    stmt: &mut Statement,
    _catalog: &str,
    schema: &str,
    table: &str,
    unique: SQLUSMALLINT,
) -> SQLRETURN {
    let mut conditions = vec!["i.type > 0".to_string()];
    exact_filter(&mut conditions, "t.name", table);
    exact_filter(&mut conditions, "s.name", schema);
    if unique == SQL_INDEX_UNIQUE {
        conditions.push("i.is_unique = 1".to_string());
    }

    let sql = format!(
        "SELECT DB_NAME() AS TABLE_CAT, s.name AS TABLE_SCHEM, t.name AS TABLE_NAME, \
         CASE WHEN i.is_unique = 1 THEN 0 ELSE 1 END AS NON_UNIQUE, \
         DB_NAME() AS INDEX_QUALIFIER, i.name AS INDEX_NAME, \
         CASE WHEN i.type_desc = 'CLUSTERED' THEN 1 ELSE 3 END AS TYPE, \
         ic.key_ordinal AS ORDINAL_POSITION, \
         c.name AS COLUMN_NAME, \
         CASE WHEN ic.is_descending_key = 1 THEN 'D' ELSE 'A' END AS ASC_OR_DESC, \
         CAST(NULL AS INT) AS CARDINALITY, \
         CAST(NULL AS INT) AS PAGES, \
         CAST(NULL AS VARCHAR(1)) AS FILTER_CONDITION \
         FROM sys.indexes i \
         JOIN sys.index_columns ic ON i.object_id = ic.object_id AND i.index_id = ic.index_id \
         JOIN sys.columns c ON ic.object_id = c.object_id AND ic.column_id = c.column_id \
         JOIN sys.tables t ON i.object_id = t.object_id \
         JOIN sys.schemas s ON t.schema_id = s.schema_id \
         {}ORDER BY NON_UNIQUE, TYPE, INDEX_NAME, ORDINAL_POSITION",
        where_clause(&conditions)
    );
    execute::exec_direct(stmt, &sql)
}

/// `SQLSpecialColumns`: identity columns for SQL_BEST_ROWID, rowversion
/// columns for SQL_ROWVER.
pub fn special_columns(
    stmt: &mut Statement,
    id_type: SQLUSMALLINT,
    _catalog: &str,
    schema: &str,
    table: &str,
) -> SQLRETURN {
    let mut conditions = Vec::new();
    exact_filter(&mut conditions, "t.name", table);
    exact_filter(&mut conditions, "s.name", schema);
    conditions.push(if id_type == SQL_ROWVER {
        "tp.name IN ('timestamp','rowversion')".to_string()
    } else {
        "c.is_identity = 1".to_string()
    });

    let sql = format!(
        "SELECT CAST(2 AS SMALLINT) AS SCOPE, c.name AS COLUMN_NAME, \
         CAST({data_type} AS SMALLINT) AS DATA_TYPE, \
         tp.name AS TYPE_NAME, \
         COALESCE(c.max_length, 0) AS COLUMN_SIZE, \
         COALESCE(c.max_length, 0) AS BUFFER_LENGTH, \
         CAST(c.scale AS SMALLINT) AS DECIMAL_DIGITS, \
         CAST(1 AS SMALLINT) AS PSEUDO_COLUMN \
         FROM sys.columns c \
         JOIN sys.tables t ON c.object_id = t.object_id \
         JOIN sys.schemas s ON t.schema_id = s.schema_id \
         JOIN sys.types tp ON c.system_type_id = tp.system_type_id AND tp.system_type_id = tp.user_type_id \
         {where_clause}",
        data_type = DATA_TYPE_CASE,
        where_clause = where_clause(&conditions)
    );
    execute::exec_direct(stmt, &sql)
}

/// `SQLForeignKeys`. The update/delete rules come from the server's
/// referential-action metadata mapped to the ODBC rule codes.
pub fn foreign_keys(
    stmt: &mut Statement,
    _pk_catalog: &str,
    pk_schema: &str,
    pk_table: &str,
    _fk_catalog: &str,
    fk_schema: &str,
    fk_table: &str,
) -> SQLRETURN {
    let mut conditions = Vec::new();
    exact_filter(&mut conditions, "pk_t.name", pk_table);
    exact_filter(&mut conditions, "pk_s.name", pk_schema);
    exact_filter(&mut conditions, "fk_t.name", fk_table);
    exact_filter(&mut conditions, "fk_s.name", fk_schema);

    // sys.foreign_keys referential actions: 0 NO ACTION, 1 CASCADE,
    // 2 SET NULL, 3 SET DEFAULT. ODBC: CASCADE 0, SET NULL 2,
    // NO ACTION 3, SET DEFAULT 4.
    let rule = |col: &str| {
        format!(
            "CAST(CASE fk.{col} WHEN 1 THEN {cascade} WHEN 2 THEN {set_null} \
             WHEN 3 THEN {set_default} ELSE {no_action} END AS SMALLINT)",
            col = col,
            cascade = SQL_CASCADE,
            set_null = SQL_SET_NULL,
            set_default = SQL_SET_DEFAULT,
            no_action = SQL_NO_ACTION
        )
    };

    let sql = format!(
        "SELECT DB_NAME() AS PKTABLE_CAT, pk_s.name AS PKTABLE_SCHEM, pk_t.name AS PKTABLE_NAME, \
         pk_c.name AS PKCOLUMN_NAME, \
         DB_NAME() AS FKTABLE_CAT, fk_s.name AS FKTABLE_SCHEM, fk_t.name AS FKTABLE_NAME, \
         fk_c.name AS FKCOLUMN_NAME, \
         fkc.constraint_column_id AS KEY_SEQ, \
         {update_rule} AS UPDATE_RULE, \
         {delete_rule} AS DELETE_RULE, \
         fk.name AS FK_NAME, \
         pk_i.name AS PK_NAME, \
         CAST(7 AS SMALLINT) AS DEFERRABILITY \
         FROM sys.foreign_keys fk \
         JOIN sys.foreign_key_columns fkc ON fk.object_id = fkc.constraint_object_id \
         JOIN sys.tables fk_t ON fk.parent_object_id = fk_t.object_id \
         JOIN sys.schemas fk_s ON fk_t.schema_id = fk_s.schema_id \
         JOIN sys.columns fk_c ON fkc.parent_object_id = fk_c.object_id AND fkc.parent_column_id = fk_c.column_id \
         JOIN sys.tables pk_t ON fk.referenced_object_id = pk_t.object_id \
         JOIN sys.schemas pk_s ON pk_t.schema_id = pk_s.schema_id \
         JOIN sys.columns pk_c ON fkc.referenced_object_id = pk_c.object_id AND fkc.referenced_column_id = pk_c.column_id \
         LEFT JOIN sys.indexes pk_i ON pk_t.object_id = pk_i.object_id AND pk_i.is_primary_key = 1 \
         {where_clause}ORDER BY FKTABLE_CAT, FKTABLE_SCHEM, FKTABLE_NAME, KEY_SEQ",
        update_rule = rule("update_referential_action"),
        delete_rule = rule("delete_referential_action"),
        where_clause = where_clause(&conditions)
    );
    execute::exec_direct(stmt, &sql)
}

/// `SQLGetTypeInfo`, optionally filtered to one ODBC type code.
pub fn type_info(stmt: &mut Statement, data_type: SQLSMALLINT) -> SQLRETURN {
    let filter = if data_type == SQL_ALL_TYPES {
        String::new()
    } else {
        format!("AND {} = {} ", DATA_TYPE_CASE, data_type)
    };

    let sql = format!(
        "SELECT \
         tp.name AS TYPE_NAME, \
         CAST({data_type} AS SMALLINT) AS DATA_TYPE, \
         CASE \
           WHEN tp.name = 'int' THEN 10 \
           WHEN tp.name = 'smallint' THEN 5 \
           WHEN tp.name = 'tinyint' THEN 3 \
           WHEN tp.name = 'bigint' THEN 19 \
           WHEN tp.name = 'float' THEN 53 \
           WHEN tp.name = 'real' THEN 24 \
           WHEN tp.name = 'bit' THEN 1 \
           WHEN tp.name IN ('datetime','datetime2','smalldatetime') THEN 23 \
           WHEN tp.name = 'date' THEN 10 \
           WHEN tp.name = 'time' THEN 16 \
           WHEN tp.name = 'uniqueidentifier' THEN 36 \
           ELSE tp.max_length END AS COLUMN_SIZE, \
         CASE WHEN tp.name IN ('varchar','nvarchar','char','nchar','text','ntext','datetime','datetime2','date','time','uniqueidentifier') THEN '''' WHEN tp.name IN ('binary','varbinary','image') THEN '0x' ELSE NULL END AS LITERAL_PREFIX, \
         CASE WHEN tp.name IN ('varchar','nvarchar','char','nchar','text','ntext','datetime','datetime2','date','time','uniqueidentifier') THEN '''' ELSE NULL END AS LITERAL_SUFFIX, \
         CASE WHEN tp.name IN ('varchar','nvarchar','char','nchar','binary','varbinary') THEN 'max length' WHEN tp.name IN ('decimal','numeric') THEN 'precision,scale' ELSE NULL END AS CREATE_PARAMS, \
         CAST(1 AS SMALLINT) AS NULLABLE, \
         CAST(0 AS SMALLINT) AS CASE_SENSITIVE, \
         CAST(3 AS SMALLINT) AS SEARCHABLE, \
         CAST(CASE WHEN tp.name = 'tinyint' THEN 1 ELSE 0 END AS SMALLINT) AS UNSIGNED_ATTRIBUTE, \
         CAST(CASE WHEN tp.name IN ('money','smallmoney') THEN 1 ELSE 0 END AS SMALLINT) AS FIXED_PREC_SCALE, \
         CAST(0 AS SMALLINT) AS AUTO_UNIQUE_VALUE, \
         tp.name AS LOCAL_TYPE_NAME, \
         CAST(0 AS SMALLINT) AS MINIMUM_SCALE, \
         CAST(CASE WHEN tp.name IN ('decimal','numeric') THEN 38 WHEN tp.name IN ('datetime2','time') THEN 7 ELSE 0 END AS SMALLINT) AS MAXIMUM_SCALE, \
         CAST({data_type} AS SMALLINT) AS SQL_DATA_TYPE, \
         CAST(NULL AS SMALLINT) AS SQL_DATETIME_SUB, \
         CASE WHEN tp.name IN ('int','smallint','tinyint','bigint','decimal','numeric','money','smallmoney') THEN 10 WHEN tp.name IN ('float','real') THEN 2 ELSE NULL END AS NUM_PREC_RADIX, \
         CAST(NULL AS SMALLINT) AS INTERVAL_PRECISION \
         FROM sys.types tp WHERE tp.system_type_id = tp.user_type_id {filter}\
         ORDER BY DATA_TYPE",
        data_type = DATA_TYPE_CASE,
        filter = filter
    );
    execute::exec_direct(stmt, &sql)
}

/// `SQLProcedures`: an empty result set with no columns.
pub fn procedures(stmt: &mut Statement) -> SQLRETURN {
    stmt.diagnostics.clear();
    stmt.columns.clear();
    stmt.rows.clear();
    stmt.row_index = -1;
    stmt.row_count = -1;
    stmt.state = StmtState::Executed;
    SQL_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patterns_add_no_filters() {
        let mut conditions = Vec::new();
        like_filter(&mut conditions, "o.name", "");
        like_filter(&mut conditions, "o.name", "%");
        assert!(conditions.is_empty());
        assert_eq!("", where_clause(&conditions));
    }

    #[test]
    fn patterns_are_quoted_and_escaped() {
        let mut conditions = Vec::new();
        like_filter(&mut conditions, "o.name", "o'brien%");
        assert_eq!(vec!["o.name LIKE N'o''brien%'".to_string()], conditions);
        assert_eq!("WHERE o.name LIKE N'o''brien%' ", where_clause(&conditions));
    }

    #[test]
    fn procedures_is_an_empty_executed_result() {
        let mut env: SQLHANDLE = std::ptr::null_mut();
        let mut dbc: SQLHANDLE = std::ptr::null_mut();
        let mut hstmt: SQLHANDLE = std::ptr::null_mut();
        crate::handle::alloc_env(&mut env);
        crate::handle::alloc_connection(env, &mut dbc);
        crate::handle::alloc_statement(dbc, &mut hstmt);
        let stmt = crate::handle::stmt_mut(hstmt).unwrap();

        assert_eq!(SQL_SUCCESS, procedures(stmt));
        assert_eq!(StmtState::Executed, stmt.state);
        assert!(stmt.columns.is_empty());
        // An immediate fetch finds no rows.
        assert_eq!(SQL_NO_DATA, crate::fetch::fetch(stmt));
        crate::handle::free_env(env);
    }
}
