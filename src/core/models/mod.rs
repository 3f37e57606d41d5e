pub mod artifact_names;
pub mod secret_record;
pub mod selector;
