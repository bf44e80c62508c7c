pub mod snack;
