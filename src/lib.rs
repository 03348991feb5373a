pub mod classifier;
pub mod config;
pub mod dataset;
pub mod inference;
pub mod prompts;
pub mod reply;
pub mod review;
pub mod web;
