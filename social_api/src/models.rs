use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::{flyers, posts};

/// A published (or publishable) post kept for the archive view.
#[derive(Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i32,
    pub caption: String,
    pub image_url: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPost<'a> {
    pub caption: &'a str,
    pub image_url: &'a str,
}

/// A saved generated artifact, with the provenance of its generation when
/// the caller supplied it.
#[derive(Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = flyers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Flyer {
    pub id: i32,
    pub content: String,
    pub image_url: String,
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = flyers)]
pub struct NewFlyer<'a> {
    pub content: &'a str,
    pub image_url: &'a str,
    pub prompt: Option<&'a str>,
    pub model: Option<&'a str>,
}
