//! Loss and recovery register records and CSV loading

mod data;
pub mod loader;

pub use data::{loss_columns, recovery_columns, LossEvent, RecoveryRecord};
pub use loader::{
    load_loss_register, load_loss_register_from_reader, load_recovery_register,
    load_recovery_register_from_reader,
};
