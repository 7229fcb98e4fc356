mod common;
mod negotiation_tests;
