mod catalog;
mod helpers;
mod session;
