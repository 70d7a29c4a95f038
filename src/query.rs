use crate::executor::{Select, Write, WriteOutcome};
use crate::models::FoodRow;
use diesel::prelude::*;

sql_function!(fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text);

no_arg_sql_function!(
    last_insert_id,
    diesel::sql_types::Unsigned<diesel::sql_types::Bigint>
);

// Statement builders shared by the executor and the SQL shape tests below.
macro_rules! by_id {
    ($food_id:expr) => {
        crate::schema::foods::table.filter(crate::schema::foods::id.eq($food_id.get()))
    };
}

macro_rules! name_contains {
    ($term:expr) => {
        crate::schema::foods::table.filter(
            lower(crate::schema::foods::name)
                .like(contains_pattern($term))
                .escape('\\'),
        )
    };
}

macro_rules! insert_food {
    ($row:expr) => {
        diesel::insert_into(crate::schema::foods::table).values($row)
    };
}

macro_rules! update_food {
    ($food_id:expr, $row:expr) => {
        diesel::update(by_id!($food_id)).set($row)
    };
}

macro_rules! delete_food {
    ($food_id:expr) => {
        diesel::delete(by_id!($food_id))
    };
}

pub(crate) fn find_foods(select: &Select, conn: &MysqlConnection) -> QueryResult<Vec<FoodRow>> {
    match select {
        Select::ById(food_id) => by_id!(food_id).load::<FoodRow>(conn),
        Select::NameContains(term) => name_contains!(term).load::<FoodRow>(conn),
        Select::All => crate::schema::foods::table.load::<FoodRow>(conn),
    }
}

pub(crate) fn run_write(write: &Write, conn: &MysqlConnection) -> QueryResult<WriteOutcome> {
    match write {
        Write::Insert(row) => {
            let affected_rows = insert_food!(row).execute(conn)?;
            // LAST_INSERT_ID() is per connection, so it must run on the same one.
            let inserted: u64 = diesel::select(last_insert_id).first(conn)?;
            Ok(WriteOutcome {
                affected_rows,
                last_insert_id: Some(inserted),
            })
        }
        Write::Update(food_id, row) => Ok(WriteOutcome {
            affected_rows: update_food!(food_id, row).execute(conn)?,
            last_insert_id: None,
        }),
        Write::Delete(food_id) => Ok(WriteOutcome {
            affected_rows: delete_food!(food_id).execute(conn)?,
            last_insert_id: None,
        }),
    }
}

/// Builds `%term%` with LIKE wildcards in `term` escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
