pub mod backup_service;
pub mod identity_service;
pub mod selection_service;
pub mod snapshot_service;

#[cfg(test)]
pub mod fakes;
