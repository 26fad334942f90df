//! Oracle catalog queries over the `USER_*` dictionary views.
//!
//! Scope is the connected user's own schema. Placeholders use Oracle's
//! positional `:1` syntax.

use crate::executor::CatalogQuery;

/// (table, column, data type, nullable Y/N, has default 1/0, length)
///
/// `DATE` columns report the fixed length `'11'`; `NUMBER` columns report
/// `precision.scale` with a missing precision shown as 38.
pub const COLUMNS: CatalogQuery = CatalogQuery {
    name: "oracle.columns",
    sql: r#"
        SELECT
            c.table_name,
            c.column_name,
            c.data_type,
            c.nullable,
            DECODE(c.default_length, NULL, 0, 1) AS has_default,
            DECODE(c.data_type,
                   'DATE', '11',
                   'NUMBER', NVL(c.data_precision, 38) || '.' || c.data_scale,
                   TO_CHAR(c.data_length)) AS data_length
        FROM user_tab_columns c
        JOIN user_tables t ON t.table_name = c.table_name
        ORDER BY c.table_name, c.column_id
    "#,
};

/// (owning table, owning column, referenced table, referenced constraint)
pub const FOREIGN_KEYS: CatalogQuery = CatalogQuery {
    name: "oracle.foreign_keys",
    sql: r#"
        SELECT
            uc.table_name,
            ucc.column_name,
            fc.table_name AS referenced_table,
            fc.constraint_name AS referenced_constraint
        FROM user_cons_columns ucc
        JOIN user_constraints uc ON uc.constraint_name = ucc.constraint_name
        JOIN user_constraints fc ON fc.constraint_name = uc.r_constraint_name
        WHERE uc.constraint_type = 'R'
        ORDER BY uc.table_name, ucc.position
    "#,
};

/// (table, column, default expression)
pub const DEFAULTS: CatalogQuery = CatalogQuery {
    name: "oracle.defaults",
    sql: r#"
        SELECT
            c.table_name,
            c.column_name,
            c.data_default
        FROM user_tab_columns c
        JOIN user_tables t ON t.table_name = c.table_name
        WHERE c.default_length IS NOT NULL
        ORDER BY c.table_name, c.column_id
    "#,
};

/// (table, column) of every primary key member, in key position order
pub const PRIMARY_KEYS: CatalogQuery = CatalogQuery {
    name: "oracle.primary_keys",
    sql: r#"
        SELECT
            uc.table_name,
            ucc.column_name
        FROM user_constraints uc
        JOIN user_cons_columns ucc ON ucc.constraint_name = uc.constraint_name
        WHERE uc.constraint_type = 'P'
        ORDER BY uc.table_name, ucc.position
    "#,
};

/// (table, index, uniqueness UNIQUE/NONUNIQUE)
pub const INDEXES: CatalogQuery = CatalogQuery {
    name: "oracle.indexes",
    sql: r#"
        SELECT
            ui.table_name,
            ui.index_name,
            ui.uniqueness
        FROM user_indexes ui
        ORDER BY ui.table_name, ui.index_name
    "#,
};

/// (index, column) for every index, in column position order
pub const INDEX_COLUMNS: CatalogQuery = CatalogQuery {
    name: "oracle.index_columns",
    sql: r#"
        SELECT
            uic.index_name,
            uic.column_name
        FROM user_ind_columns uic
        ORDER BY uic.index_name, uic.column_position
    "#,
};

/// (column) members of one index; `:1` index name.
pub const INDEX_MEMBER_COLUMNS: CatalogQuery = CatalogQuery {
    name: "oracle.index_member_columns",
    sql: r#"
        SELECT uic.column_name
        FROM user_ind_columns uic
        WHERE uic.index_name = :1
        ORDER BY uic.column_position
    "#,
};
