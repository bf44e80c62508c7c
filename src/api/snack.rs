pub mod snacks_list;
pub mod testdata;
pub mod testdb;
pub mod version;

#[cfg(test)]
pub(crate) mod test_support;
