#![cfg(test)]

pub mod app_tests;
pub mod common;
