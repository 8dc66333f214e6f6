use crate::schema::restaurant_tables;
use diesel::prelude::*;

#[derive(Queryable, Identifiable, Clone, Debug)]
#[diesel(table_name = restaurant_tables)]
pub struct TableData {
    pub id: i32,
    pub number: i32,
    pub seats: i32,
    pub is_booked: bool,
}

#[derive(Insertable)]
#[diesel(table_name = restaurant_tables)]
pub struct NewTable {
    pub number: i32,
    pub seats: i32,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = restaurant_tables)]
pub struct UpdateTable {
    pub number: Option<i32>,
    pub seats: Option<i32>,
    pub is_booked: Option<bool>,
}
