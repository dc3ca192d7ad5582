pub mod config;
pub mod logging;

pub mod batch;
pub mod control;
pub mod controller;
pub mod discovery;
pub mod kv;
pub mod naming;
pub mod records;
pub mod scan;
pub mod transfer;
