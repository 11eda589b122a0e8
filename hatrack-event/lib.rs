pub mod debounce;
pub mod rehat;
