//! different utility modules used throughout the project
/// logging setup and saving the sampled grid into csv
pub mod logger;
/// 3D surface plot of the sampled integrand
pub mod plots;
/// PDF export of a computed result
pub mod pdf_report;
/// parse task document with structure like "title1 key1: value1 key2: value2 title2 key3: value3" into the form and its options
pub mod task_parser;
