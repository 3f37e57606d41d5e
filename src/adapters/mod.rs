pub mod cipher;
pub mod kube;
pub mod storage;
