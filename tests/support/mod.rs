#![allow(dead_code)]

pub mod architecture;
pub mod db;
pub mod fixtures;
