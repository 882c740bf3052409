pub mod block;
pub mod decimal;
pub mod history;
pub mod ids;
pub mod nutrition;
pub mod program;
pub mod rights;
pub mod session;
pub mod training;
pub mod user;
