pub mod file;
pub mod parser;

pub use file::{determine_file_type, is_test_file};
pub use parser::{parse_filepath_with_line, parse_filepath_with_position};
