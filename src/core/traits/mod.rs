pub mod cipher;
pub mod cluster;
pub mod object_store;
