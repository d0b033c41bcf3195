mod common;
mod cycle_tests;
