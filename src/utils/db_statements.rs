// This file contains all SQL statements issued by the snack server.
#![forbid(unsafe_code)]

// ========================= box table =========================
// The box table is created on every /testdb call, so the second call
// against the same database fails.
pub const CREATE_BOX_TABLE: &str = "CREATE TABLE box (id INT NOT NULL)";

pub const INSERT_BOX_1: &str = "INSERT INTO box VALUES (1)";

pub const INSERT_BOX_2: &str = "INSERT INTO box VALUES (2)";

pub const GET_BOX_MIN_ID: &str = "SELECT MIN(id) FROM box";

// ========================= Snack table =========================
pub const GET_SNACK_NAME_1: &str = "SELECT snacknaam FROM Snack WHERE snacknr = 1";

pub const LIST_SNACKS: &str = concat!(
    "SELECT snacknr, snacknaam, calorieen ",
    "FROM Snack",
);

// Column names read by the row extractor.
pub const COL_SNACKNR: &str = "snacknr";
pub const COL_SNACKNAAM: &str = "snacknaam";
pub const COL_CALORIEEN: &str = "calorieen";
