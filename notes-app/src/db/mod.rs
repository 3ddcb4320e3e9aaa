pub mod db;
mod migrations;

pub use db::*;
