// This file contains the snack database structs and related definitions.
#![forbid(unsafe_code)]

use poem_openapi::Object;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Snack:
// ---------------------------------------------------------------------------
/// One row of the Snack table.  Records are built per query and dropped once
/// the response is serialized.
#[derive(Object, Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Snack {
    pub snacknr: i32,
    pub snacknaam: String,
    pub calorieen: i32,
}

impl Snack {
    pub fn new(snacknr: i32, snacknaam: String, calorieen: i32) -> Self {
        Self { snacknr, snacknaam, calorieen }
    }
}
