mod init;
mod superuser;

pub use init::cmd_init;
pub use superuser::cmd_create_superuser;
