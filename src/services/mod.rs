pub mod clients;
pub mod directory;
pub mod grants;
pub mod signing;
