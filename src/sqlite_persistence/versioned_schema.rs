use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // Allow unused_mut because the variable is only mutated when optional
            // field assignments are passed to the macro (e.g., `non_null = true`)
            #[allow(unused_mut)]
            let mut column = $crate::sqlite_persistence::Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }

    fn from_sql(s: &str) -> Option<&'static SqlType> {
        match s {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            "REAL" => Some(&SqlType::Real),
            _ => None,
        }
    }
}

pub enum ForeignKeyOnChange {
    NoAction,
    Cascade,
}

impl ForeignKeyOnChange {
    fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyOnChange::NoAction => "NO ACTION",
            ForeignKeyOnChange::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
    pub on_update: ForeignKeyOnChange,
}

impl ForeignKey {
    /// The column-constraint clause, in the same shape `foreign_key_list`
    /// reports back.
    fn references_sql(&self) -> String {
        render_references(
            self.foreign_table,
            self.foreign_column,
            self.on_delete.as_sql(),
            self.on_update.as_sql(),
        )
    }
}

fn render_references(table: &str, column: &str, on_delete: &str, on_update: &str) -> String {
    format!(
        "REFERENCES {}({}) ON DELETE {} ON UPDATE {}",
        table, column, on_delete, on_update
    )
}

pub struct Column<'a, S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub foreign_key: Option<&'a ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static, &'static str>],
}

impl Table {
    /// Renders the `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(column_sql).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            self.name,
            columns.join(", ")
        )
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.name)
    }

    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute(&self.create_sql(), params![])
            .with_context(|| format!("Failed to create table {}", self.name))?;
        Ok(())
    }

    pub fn drop(&self, conn: &Connection) -> Result<()> {
        conn.execute(&self.drop_sql(), params![])
            .with_context(|| format!("Failed to drop table {}", self.name))?;
        Ok(())
    }
}

fn column_sql(column: &Column<'static, &'static str>) -> String {
    let mut sql = format!("{} {}", column.name, column.sql_type.as_sql());
    if column.is_primary_key {
        sql.push_str(" PRIMARY KEY");
    }
    if column.non_null {
        sql.push_str(" NOT NULL");
    }
    if let Some(foreign_key) = column.foreign_key {
        sql.push(' ');
        sql.push_str(&foreign_key.references_sql());
    }
    sql
}

/// An ordered set of tables. Tables are created in declaration order and
/// dropped in reverse, so referenced tables must be declared first.
pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", params![])?;
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    pub fn drop(&self, conn: &Connection) -> Result<()> {
        for table in self.tables.iter().rev() {
            table.drop(conn)?;
        }
        conn.execute("PRAGMA user_version = 0", [])?;
        Ok(())
    }

    pub fn reset(&self, conn: &Connection) -> Result<()> {
        self.drop(conn)?;
        self.create(conn)
    }

    /// Checks that `conn` holds exactly this schema: version stamp, column
    /// layout and foreign keys of every table.
    pub fn validate(&self, conn: &Connection) -> Result<()> {
        let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        let expected_version = (BASE_DB_VERSION + self.version) as i64;
        if db_version != expected_version {
            bail!(
                "Database schema version is {}, expected {}",
                db_version,
                expected_version
            );
        }

        for table in self.tables {
            validate_columns(conn, table)?;
            validate_foreign_keys(conn, table)?;
        }
        Ok(())
    }
}

/// One row of `PRAGMA table_info`.
struct ColumnInfo {
    name: String,
    declared_type: String,
    non_null: bool,
    is_primary_key: bool,
}

fn validate_columns(conn: &Connection, table: &Table) -> Result<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table.name))?;
    let actual: Vec<ColumnInfo> = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                declared_type: row.get(2)?,
                non_null: row.get::<_, i64>(3)? != 0,
                is_primary_key: row.get::<_, i64>(5)? > 0,
            })
        })?
        .collect::<Result<_, _>>()
        .with_context(|| format!("Error reading columns of table {}", table.name))?;

    if actual.is_empty() {
        bail!("Table {} does not exist", table.name);
    }

    let expected_names: Vec<&str> = table.columns.iter().map(|c| c.name).collect();
    let actual_names: Vec<&str> = actual.iter().map(|c| c.name.as_str()).collect();
    if expected_names != actual_names {
        bail!(
            "Table {} has columns [{}], expected [{}]",
            table.name,
            actual_names.join(", "),
            expected_names.join(", ")
        );
    }

    for (expected, found) in table.columns.iter().zip(&actual) {
        let column = format!("{}.{}", table.name, expected.name);
        if SqlType::from_sql(&found.declared_type) != Some(expected.sql_type) {
            bail!(
                "{} type mismatch: expected {}, got {}",
                column,
                expected.sql_type.as_sql(),
                found.declared_type
            );
        }
        if found.non_null != expected.non_null {
            bail!(
                "{} non-null mismatch: expected {}, got {}",
                column,
                expected.non_null,
                found.non_null
            );
        }
        if found.is_primary_key != expected.is_primary_key {
            bail!(
                "{} primary key mismatch: expected {}, got {}",
                column,
                expected.is_primary_key,
                found.is_primary_key
            );
        }
    }
    Ok(())
}

fn validate_foreign_keys(conn: &Connection, table: &Table) -> Result<()> {
    // foreign_key_list columns: id, seq, table, from, to, on_update, on_delete, match
    let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", table.name))?;
    let actual: Vec<(String, String)> = stmt
        .query_map([], |row| {
            let from: String = row.get(3)?;
            let references = render_references(
                &row.get::<_, String>(2)?,
                &row.get::<_, String>(4)?,
                &row.get::<_, String>(6)?,
                &row.get::<_, String>(5)?,
            );
            Ok((from, references))
        })?
        .collect::<Result<_, _>>()?;

    for column in table.columns {
        let Some(foreign_key) = column.foreign_key else {
            continue;
        };
        let expected = foreign_key.references_sql();
        match actual.iter().find(|(from, _)| from.as_str() == column.name) {
            None => bail!(
                "{}.{} is missing foreign key: expected {}",
                table.name,
                column.name,
                expected
            ),
            Some((_, found)) if *found != expected => bail!(
                "{}.{} foreign key mismatch: expected {}, got {}",
                table.name,
                column.name,
                expected,
                found
            ),
            Some(_) => {}
        }
    }
    Ok(())
}

pub const BASE_DB_VERSION: usize = 99999;
