pub mod atom;
pub mod table;
pub mod topology;
