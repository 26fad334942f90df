//! Postgres catalog queries.
//!
//! Targets 7.3 and later (schema-aware catalogs). Only ordinary tables
//! visible on the search path are read, so a bare relation name identifies
//! a table unambiguously. Every output column is cast to `text` or
//! `integer` so the executor sees the same shapes across server versions.

use crate::executor::CatalogQuery;

/// (table, column, type, attlen, attnotnull, atthasdef, atttypmod)
pub const COLUMNS: CatalogQuery = CatalogQuery {
    name: "postgres.columns",
    sql: r#"
        SELECT
            c.relname::text AS table_name,
            a.attname::text AS column_name,
            t.typname::text AS type_name,
            a.attlen::integer AS attlen,
            a.attnotnull AS attnotnull,
            a.atthasdef AS atthasdef,
            a.atttypmod::integer AS atttypmod
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        JOIN pg_attribute a ON a.attrelid = c.oid
        JOIN pg_type t ON t.oid = a.atttypid
        WHERE c.relkind = 'r'
        AND a.attnum > 0
        AND NOT a.attisdropped
        AND n.nspname NOT IN ('pg_catalog', 'information_schema')
        AND pg_table_is_visible(c.oid)
        ORDER BY c.relname, a.attnum
    "#,
};

/// (trigger name, trigger table, packed trigger arguments)
///
/// Finds the insert-check trigger of every legacy referential constraint:
/// a `%ins` trigger on the referencing table whose partner `%upd` and
/// `%del` triggers sit on the referenced table. `encode(..., 'escape')`
/// renders NUL and high-bit bytes as `\nnn` and doubles backslashes; the
/// trigger parser decodes that format.
pub const FOREIGN_KEY_TRIGGERS: CatalogQuery = CatalogQuery {
    name: "postgres.foreign_key_triggers",
    sql: r#"
        SELECT
            pt.tgname::text AS trigger_name,
            pc.relname::text AS trigger_table,
            encode(pt.tgargs, 'escape')::text AS trigger_args
        FROM pg_trigger pt
        JOIN pg_class pc ON pc.oid = pt.tgrelid
        JOIN pg_namespace n ON n.oid = pc.relnamespace
        JOIN pg_proc pp ON pp.oid = pt.tgfoid
        WHERE pp.proname LIKE '%ins'
        AND pt.tgnargs > 0
        AND n.nspname NOT IN ('pg_catalog', 'information_schema')
        AND pg_table_is_visible(pc.oid)
        AND EXISTS (
            SELECT 1
            FROM pg_trigger tu
            JOIN pg_proc pu ON pu.oid = tu.tgfoid
            WHERE tu.tgrelid = pt.tgconstrrelid
            AND tu.tgconstrrelid = pc.oid
            AND pu.proname LIKE '%upd'
        )
        AND EXISTS (
            SELECT 1
            FROM pg_trigger td
            JOIN pg_proc pd ON pd.oid = td.tgfoid
            WHERE td.tgrelid = pt.tgconstrrelid
            AND td.tgconstrrelid = pc.oid
            AND pd.proname LIKE '%del'
        )
        ORDER BY pc.relname, pt.tgname
    "#,
};

/// (owning table, owning column, referenced table, referenced column)
pub const FOREIGN_KEY_CONSTRAINTS: CatalogQuery = CatalogQuery {
    name: "postgres.foreign_key_constraints",
    sql: r#"
        SELECT
            c.relname::text AS table_name,
            a.attname::text AS column_name,
            r.relname::text AS referenced_table,
            ra.attname::text AS referenced_column
        FROM (
            SELECT
                con.conrelid,
                con.confrelid,
                unnest(con.conkey) AS attnum,
                unnest(con.confkey) AS ref_attnum
            FROM pg_constraint con
            WHERE con.contype = 'f'
        ) k
        JOIN pg_class c ON c.oid = k.conrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        JOIN pg_class r ON r.oid = k.confrelid
        JOIN pg_attribute a ON a.attrelid = k.conrelid AND a.attnum = k.attnum
        JOIN pg_attribute ra ON ra.attrelid = k.confrelid AND ra.attnum = k.ref_attnum
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema')
        AND pg_table_is_visible(c.oid)
        ORDER BY c.relname, a.attnum
    "#,
};

/// (table, column, default expression)
pub const DEFAULTS: CatalogQuery = CatalogQuery {
    name: "postgres.defaults",
    sql: r#"
        SELECT
            c.relname::text AS table_name,
            a.attname::text AS column_name,
            pg_get_expr(d.adbin, d.adrelid)::text AS default_expression
        FROM pg_attrdef d
        JOIN pg_class c ON c.oid = d.adrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        JOIN pg_attribute a ON a.attrelid = d.adrelid AND a.attnum = d.adnum
        WHERE c.relkind = 'r'
        AND a.atthasdef
        AND NOT a.attisdropped
        AND n.nspname NOT IN ('pg_catalog', 'information_schema')
        AND pg_table_is_visible(c.oid)
        ORDER BY c.relname, a.attnum
    "#,
};

/// (table, indkey) of every primary key index
pub const PRIMARY_KEYS: CatalogQuery = CatalogQuery {
    name: "postgres.primary_keys",
    sql: r#"
        SELECT
            c.relname::text AS table_name,
            x.indkey::text AS indkey
        FROM pg_index x
        JOIN pg_class c ON c.oid = x.indrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE x.indisprimary
        AND c.relkind = 'r'
        AND n.nspname NOT IN ('pg_catalog', 'information_schema')
        AND pg_table_is_visible(c.oid)
        ORDER BY c.relname
    "#,
};

/// (table, index, indkey, indisunique)
pub const INDEXES: CatalogQuery = CatalogQuery {
    name: "postgres.indexes",
    sql: r#"
        SELECT
            t.relname::text AS table_name,
            i.relname::text AS index_name,
            x.indkey::text AS indkey,
            x.indisunique AS indisunique
        FROM pg_index x
        JOIN pg_class i ON i.oid = x.indexrelid
        JOIN pg_class t ON t.oid = x.indrelid
        JOIN pg_namespace n ON n.oid = t.relnamespace
        WHERE t.relkind = 'r'
        AND n.nspname NOT IN ('pg_catalog', 'information_schema')
        AND pg_table_is_visible(t.oid)
        ORDER BY t.relname, i.relname
    "#,
};

/// (table, attnum, attname) for every live user column
pub const ATTRIBUTE_NAMES: CatalogQuery = CatalogQuery {
    name: "postgres.attribute_names",
    sql: r#"
        SELECT
            c.relname::text AS table_name,
            a.attnum::integer AS attnum,
            a.attname::text AS column_name
        FROM pg_attribute a
        JOIN pg_class c ON c.oid = a.attrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE c.relkind = 'r'
        AND a.attnum > 0
        AND NOT a.attisdropped
        AND n.nspname NOT IN ('pg_catalog', 'information_schema')
        AND pg_table_is_visible(c.oid)
        ORDER BY c.relname, a.attnum
    "#,
};

/// (attnum, attname) of the members of one index; `$1` table, `$2` index.
pub const INDEX_MEMBER_COLUMNS: CatalogQuery = CatalogQuery {
    name: "postgres.index_member_columns",
    sql: r#"
        SELECT
            a.attnum::integer AS attnum,
            a.attname::text AS column_name
        FROM pg_index x
        JOIN pg_class i ON i.oid = x.indexrelid
        JOIN pg_class t ON t.oid = x.indrelid
        JOIN pg_attribute a ON a.attrelid = t.oid
        WHERE t.relname = $1
        AND i.relname = $2
        AND pg_table_is_visible(t.oid)
        AND a.attnum > 0
        AND a.attnum = ANY (x.indkey::int2[])
    "#,
};
