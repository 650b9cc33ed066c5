//! Type mapping tables: TDS column types to exported SQL type codes,
//! SQL types to default C types, and the presentation attributes
//! (display size, type name) derived from a SQL type.

use crate::rowset::ColumnDesc;
use crate::types::*;
use tabby::{ColumnType, DataType};

/// Build the exported descriptor for one TDS result column.
pub fn describe_column(col: &tabby::Column) -> ColumnDesc {
    let sql_type = sql_type_for(col.column_type());
    let nullable = if col.nullable().unwrap_or(true) {
        SQL_NULLABLE
    } else {
        SQL_NO_NULLS
    };
    let (size, decimal_digits) = column_size(sql_type, col.type_info());
    ColumnDesc {
        name: col.name().to_string(),
        sql_type,
        size,
        decimal_digits,
        nullable,
    }
}

/// TDS column type → exported SQL type code.
pub fn sql_type_for(ty: ColumnType) -> SQLSMALLINT {
    match ty {
        ColumnType::Int4 => SQL_INTEGER,
        ColumnType::Int2 => SQL_SMALLINT,
        ColumnType::Int1 => SQL_TINYINT,
        ColumnType::Int8 | ColumnType::Intn => SQL_BIGINT,
        ColumnType::Float8 | ColumnType::Floatn => SQL_DOUBLE,
        ColumnType::Float4 => SQL_REAL,
        ColumnType::Bit | ColumnType::Bitn => SQL_BIT,
        ColumnType::BigVarChar => SQL_VARCHAR,
        ColumnType::BigChar => SQL_CHAR,
        ColumnType::NVarchar => SQL_WVARCHAR,
        ColumnType::NChar => SQL_WCHAR,
        ColumnType::Text => SQL_LONGVARCHAR,
        ColumnType::NText | ColumnType::Xml => SQL_WLONGVARCHAR,
        ColumnType::BigBinary => SQL_BINARY,
        ColumnType::BigVarBin => SQL_VARBINARY,
        ColumnType::Image => SQL_LONGVARBINARY,
        ColumnType::Decimaln | ColumnType::Numericn | ColumnType::Money | ColumnType::Money4 => {
            SQL_DECIMAL
        }
        ColumnType::Datetime
        | ColumnType::Datetimen
        | ColumnType::Datetime4
        | ColumnType::Datetime2
        | ColumnType::DatetimeOffsetn => SQL_TYPE_TIMESTAMP,
        ColumnType::Daten => SQL_TYPE_DATE,
        ColumnType::Timen => SQL_TYPE_TIME,
        ColumnType::Guid => SQL_GUID,
        _ => SQL_VARCHAR,
    }
}

/// Declared column size and decimal digits for a SQL type, refined with
/// the wire type descriptor when the server sent one. PLP "max" lengths
/// (`varchar(max)` and friends) report zero.
fn column_size(sql_type: SQLSMALLINT, info: Option<&DataType>) -> (SQLULEN, SQLSMALLINT) {
    match sql_type {
        SQL_INTEGER => (10, 0),
        SQL_SMALLINT => (5, 0),
        SQL_TINYINT => (3, 0),
        SQL_BIGINT => (19, 0),
        SQL_DOUBLE => (53, 0),
        SQL_REAL => (24, 0),
        SQL_BIT => (1, 0),
        SQL_TYPE_TIMESTAMP => (23, 3),
        SQL_TYPE_DATE => (10, 0),
        SQL_TYPE_TIME => (16, 7),
        SQL_GUID => (36, 0),
        SQL_DECIMAL | SQL_NUMERIC => match info {
            Some(DataType::VarLenSizedPrecision {
                precision, scale, ..
            }) => (*precision as SQLULEN, *scale as SQLSMALLINT),
            _ => (38, 0),
        },
        SQL_WCHAR | SQL_WVARCHAR | SQL_WLONGVARCHAR => (varlen_size(info, 2), 0),
        _ => (varlen_size(info, 1), 0),
    }
}

fn varlen_size(info: Option<&DataType>, unit: usize) -> SQLULEN {
    match info {
        Some(DataType::VarLenSized(desc)) => {
            let len = desc.len();
            if len >= 0xffff_fffe { 0 } else { len / unit }
        }
        _ => 256,
    }
}

/// The C type a `SQL_C_DEFAULT` retrieval resolves to for a SQL type.
pub fn default_c_type(sql_type: SQLSMALLINT) -> SQLSMALLINT {
    match sql_type {
        SQL_INTEGER => SQL_C_LONG,
        SQL_SMALLINT => SQL_C_SHORT,
        SQL_BIGINT => SQL_C_SBIGINT,
        SQL_DOUBLE | SQL_FLOAT => SQL_C_DOUBLE,
        SQL_REAL => SQL_C_FLOAT,
        SQL_BIT => SQL_C_BIT,
        SQL_TINYINT => SQL_C_UTINYINT,
        SQL_TYPE_TIMESTAMP => SQL_C_TYPE_TIMESTAMP,
        SQL_TYPE_DATE => SQL_C_TYPE_DATE,
        SQL_TYPE_TIME => SQL_C_TYPE_TIME,
        SQL_BINARY | SQL_VARBINARY | SQL_LONGVARBINARY => SQL_C_BINARY,
        SQL_GUID => SQL_C_GUID,
        _ => SQL_C_CHAR,
    }
}

/// Character width a value of this type needs for display.
pub fn display_size(col: &ColumnDesc) -> SQLLEN {
    let base = match col.sql_type {
        SQL_INTEGER => 11,
        SQL_SMALLINT => 6,
        SQL_TINYINT => 4,
        SQL_BIGINT => 20,
        SQL_BIT => 1,
        SQL_DOUBLE | SQL_FLOAT => 24,
        SQL_REAL => 14,
        SQL_TYPE_TIMESTAMP => 23,
        SQL_TYPE_DATE => 10,
        SQL_TYPE_TIME => 16,
        SQL_GUID => 36,
        SQL_DECIMAL | SQL_NUMERIC => 40,
        _ => col.size as SQLLEN,
    };
    base.max(col.name.len() as SQLLEN)
}

/// SQL Server's spelling of the type, as reported by SQLColAttribute.
pub fn type_name(sql_type: SQLSMALLINT) -> &'static str {
    match sql_type {
        SQL_INTEGER => "int",
        SQL_SMALLINT => "smallint",
        SQL_TINYINT => "tinyint",
        SQL_BIGINT => "bigint",
        SQL_BIT => "bit",
        SQL_DOUBLE | SQL_FLOAT => "float",
        SQL_REAL => "real",
        SQL_VARCHAR => "varchar",
        SQL_CHAR => "char",
        SQL_WVARCHAR => "nvarchar",
        SQL_WCHAR => "nchar",
        SQL_LONGVARCHAR => "text",
        SQL_WLONGVARCHAR => "ntext",
        SQL_TYPE_TIMESTAMP => "datetime",
        SQL_TYPE_DATE => "date",
        SQL_TYPE_TIME => "time",
        SQL_DECIMAL | SQL_NUMERIC => "decimal",
        SQL_BINARY => "binary",
        SQL_VARBINARY => "varbinary",
        SQL_LONGVARBINARY => "image",
        SQL_GUID => "uniqueidentifier",
        _ => "varchar",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tds_types_map_to_their_sql_codes() {
        assert_eq!(SQL_INTEGER, sql_type_for(ColumnType::Int4));
        assert_eq!(SQL_WVARCHAR, sql_type_for(ColumnType::NVarchar));
        assert_eq!(SQL_TYPE_TIMESTAMP, sql_type_for(ColumnType::Datetime2));
        assert_eq!(SQL_DECIMAL, sql_type_for(ColumnType::Money));
        assert_eq!(SQL_GUID, sql_type_for(ColumnType::Guid));
        assert_eq!(SQL_BIGINT, sql_type_for(ColumnType::Intn));
    }

    #[test]
    fn default_c_types_follow_the_sql_type() {
        assert_eq!(SQL_C_LONG, default_c_type(SQL_INTEGER));
        assert_eq!(SQL_C_UTINYINT, default_c_type(SQL_TINYINT));
        assert_eq!(SQL_C_BINARY, default_c_type(SQL_VARBINARY));
        assert_eq!(SQL_C_CHAR, default_c_type(SQL_WVARCHAR));
    }

    #[test]
    fn display_size_never_shrinks_below_the_name() {
        let col = ColumnDesc {
            name: "a_rather_long_column_name".into(),
            sql_type: SQL_BIT,
            size: 1,
            decimal_digits: 0,
            nullable: SQL_NULLABLE,
        };
        assert_eq!(25, display_size(&col));
    }

    #[test]
    fn described_column_carries_type_and_nullability() {
        let col = tabby::Column::new("id".into(), ColumnType::Int4);
        let desc = describe_column(&col);
        assert_eq!("id", desc.name);
        assert_eq!(SQL_INTEGER, desc.sql_type);
        assert_eq!(10, desc.size);
        // Unknown nullability is reported as nullable.
        assert_eq!(SQL_NULLABLE, desc.nullable);
    }
}
