pub mod recover_account;
pub mod register;
