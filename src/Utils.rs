//! different utility modules used throughout the project
/// analyzer settings: defaults and the optional TOML file
pub mod config;
/// tiny module to set up logging and save the sampled curve into a csv file
pub mod logger;
/// tiny module to plot the analyzed function
pub mod plots;
