#![allow(dead_code)]

pub mod fixtures;
pub mod json_assertions;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
