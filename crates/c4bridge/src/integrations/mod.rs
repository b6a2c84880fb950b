pub mod control4;
